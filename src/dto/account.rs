use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Sellers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_products: Option<Vec<Product>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeactivationSummary {
    pub active: bool,
    pub products_deactivated: u64,
}
