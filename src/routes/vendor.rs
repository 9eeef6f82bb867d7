use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::VendorDashboard,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/vendor/dashboard",
    responses(
        (status = 200, description = "Sales summary for the seller", body = ApiResponse<VendorDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VendorDashboard>>> {
    let resp = dashboard_service::vendor_dashboard(&state, &user).await?;
    Ok(Json(resp))
}
