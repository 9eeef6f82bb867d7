use rust_decimal::Decimal;

use crate::{
    dto::dashboard::{TopProduct, VendorDashboard},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_seller},
    response::ApiResponse,
    state::AppState,
};

/// Sales figures over every order line that references one of the seller's
/// products, regardless of the product's current state.
pub async fn vendor_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VendorDashboard>> {
    ensure_seller(user)?;

    let (total_products,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE seller_id = $1")
            .bind(user.user_id)
            .fetch_one(&state.pool)
            .await?;

    let (total_sold, total_revenue): (i64, Decimal) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT,
               COALESCE(SUM(oi.price * oi.quantity), 0)::NUMERIC
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE p.seller_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let top_product = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT p.id, p.name, p.image_url
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE p.seller_id = $1
        GROUP BY p.id, p.name, p.image_url
        ORDER BY SUM(oi.quantity) DESC, p.name
        LIMIT 1
        "#,
    )
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    let data = VendorDashboard {
        total_products,
        total_sold,
        total_revenue,
        top_product,
    };
    Ok(ApiResponse::success("Dashboard", data, None))
}
