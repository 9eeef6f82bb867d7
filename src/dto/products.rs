use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// JSON number or numeric string.
    #[schema(value_type = Option<String>, example = "49.90")]
    pub price: Option<Value>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
}

/// Product fields that passed validation, shared by create, update and import.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
}

impl ProductRequest {
    pub fn validate(self) -> AppResult<ProductFields> {
        let name = non_empty(self.name);
        let description = non_empty(self.description);
        let image_url = non_empty(self.image_url);
        let (Some(name), Some(description), Some(image_url), Some(price)) =
            (name, description, image_url, self.price)
        else {
            return Err(AppError::validation(
                "name, price, description and image_url are required",
            ));
        };

        let price = price_from_json(&price)
            .ok_or_else(|| AppError::validation("price must be a non-negative number"))?;

        Ok(ProductFields {
            name,
            description,
            price,
            image_url,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn price_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_price(&n.to_string()),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

/// Largest price a `NUMERIC(12,2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Parses a price in `0..=MAX_PRICE` and rounds it to cents.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let price = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;
    if price.is_sign_negative() && !price.is_zero() {
        return None;
    }
    let price = price.round_dp(2);
    (price <= MAX_PRICE).then_some(price)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
}

/// Multipart body of the bulk import endpoint.
#[derive(Debug, ToSchema)]
pub struct ProductUploadForm {
    /// `.csv` or `.xlsx` spreadsheet with a header row.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
