use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CartItem, Product},
};

/// Upper bound for one cart row's quantity.
pub const MAX_CART_QUANTITY: i32 = 1000;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

impl AddToCartRequest {
    pub fn quantity(&self) -> AppResult<i32> {
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(AppError::validation("quantity must be at least 1"));
        }
        if quantity > MAX_CART_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity must be at most {MAX_CART_QUANTITY}"
            )));
        }
        Ok(quantity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Increment,
    #[default]
    Decrement,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateCartRequest {
    pub action: CartAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItemDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartQuantityUpdate {
    /// True when the decrement removed the row.
    pub removed: bool,
    pub item: Option<CartItem>,
}
