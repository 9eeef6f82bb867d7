use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::account::{AccountProfile, DeactivationSummary},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_account)
            .post(deactivate_account)
            .delete(delete_account),
    )
}

#[utoipa::path(
    get,
    path = "/api/account",
    responses(
        (status = 200, description = "Current account; sellers also get their inactive products", body = ApiResponse<AccountProfile>)
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AccountProfile>>> {
    let resp = account_service::get_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/account",
    responses(
        (status = 200, description = "Seller account and products deactivated", body = ApiResponse<DeactivationSummary>),
        (status = 403, description = "Only sellers can deactivate")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn deactivate_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DeactivationSummary>>> {
    let resp = account_service::deactivate_account(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/account",
    responses(
        (status = 200, description = "Customer account deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Only customers can delete")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = account_service::delete_account(&state, &user).await?;
    Ok(Json(resp))
}
