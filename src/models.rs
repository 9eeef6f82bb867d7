use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{cart_items, favorites, order_items, orders, products, users};

pub use crate::entity::sea_orm_active_enums::Role;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "49.90")]
    pub price: Decimal,
    pub image_url: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            seller_id: model.seller_id,
            name: model.name,
            description: model.description,
            price: model.price,
            image_url: model.image_url,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Lifecycle of a catalog entry; stored as the `active` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn from_active(active: bool) -> Self {
        if active {
            ProductStatus::Active
        } else {
            ProductStatus::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        self == ProductStatus::Active
    }
}

/// Owner-initiated lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    SoftDelete,
    Reactivate,
}

impl StatusChange {
    pub fn target(self) -> ProductStatus {
        match self {
            StatusChange::SoftDelete => ProductStatus::Inactive,
            StatusChange::Reactivate => ProductStatus::Active,
        }
    }

    /// Returns the new status, or `None` when the product is already there.
    pub fn apply(self, current: ProductStatus) -> Option<ProductStatus> {
        let target = self.target();
        (current != target).then_some(target)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<favorites::Model> for Favorite {
    fn from(model: favorites::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(value_type = String, example = "25.50")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total: model.total,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    pub product_name: Option<String>,
    pub image_url: Option<String>,
}

impl OrderItem {
    pub fn from_entity(model: order_items::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
            product_name: product.map(|p| p.name.clone()),
            image_url: product.map(|p| p.image_url.clone()),
        }
    }
}
