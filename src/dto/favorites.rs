use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleFavoriteRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteToggle {
    pub favorited: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteIds {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteWithProduct {
    pub id: Uuid,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteList {
    #[schema(value_type = Vec<FavoriteWithProduct>)]
    pub items: Vec<FavoriteWithProduct>,
}
