use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::account::{AccountProfile, DeactivationSummary},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        favorites::{Column as FavoriteCol, Entity as Favorites},
        products::{Column as ProductCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_seller},
    models::{Product, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_account(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AccountProfile>> {
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let inactive_products = match account.role {
        Role::Seller => Some(
            Products::find()
                .filter(ProductCol::SellerId.eq(account.id))
                .filter(ProductCol::Active.eq(false))
                .order_by_desc(ProductCol::CreatedAt)
                .all(&state.orm)
                .await?
                .into_iter()
                .map(Product::from)
                .collect(),
        ),
        Role::Customer => None,
    };

    let profile = AccountProfile {
        id: account.id,
        name: account.name,
        email: account.email,
        role: account.role,
        active: account.active,
        created_at: account.created_at.with_timezone(&Utc),
        inactive_products,
    };
    Ok(ApiResponse::success("Account", profile, None))
}

/// Marks the seller and every one of their products inactive. Returns the
/// number of products touched.
pub async fn cascade_deactivation<C: ConnectionTrait>(conn: &C, seller_id: Uuid) -> AppResult<u64> {
    let user = Users::update_many()
        .col_expr(UserCol::Active, Expr::value(false))
        .filter(UserCol::Id.eq(seller_id))
        .exec(conn)
        .await?;
    if user.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let products = Products::update_many()
        .col_expr(ProductCol::Active, Expr::value(false))
        .filter(ProductCol::SellerId.eq(seller_id))
        .exec(conn)
        .await?;
    Ok(products.rows_affected)
}

pub async fn deactivate_account(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DeactivationSummary>> {
    ensure_seller(user)?;

    let txn = state.orm.begin().await?;
    let products_deactivated = cascade_deactivation(&txn, user.user_id).await?;
    txn.commit().await?;

    tracing::info!(seller_id = %user.user_id, products_deactivated, "seller account deactivated");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "account_deactivate",
        "users",
        serde_json::json!({ "products_deactivated": products_deactivated }),
    )
    .await;

    Ok(ApiResponse::success(
        "Account deactivated",
        DeactivationSummary {
            active: false,
            products_deactivated,
        },
        Some(Meta::empty()),
    ))
}

/// Removes the customer's favorites, cart and user row. Orders survive with
/// their owner cleared by the foreign key.
pub async fn erase_customer<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    Favorites::delete_many()
        .filter(FavoriteCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(conn)
        .await?;

    let deleted = Users::delete_by_id(user_id).exec(conn).await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete_account(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;

    let txn = state.orm.begin().await?;
    erase_customer(&txn, user.user_id).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, "customer account deleted");
    // The user row is gone, so the entry cannot reference it.
    audit::record(
        &state.pool,
        None,
        "account_delete",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Account deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
