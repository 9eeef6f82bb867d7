use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDashboard {
    pub total_products: i64,
    pub total_sold: i64,
    #[schema(value_type = String, example = "1250.00")]
    pub total_revenue: Decimal,
    pub top_product: Option<TopProduct>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
}
