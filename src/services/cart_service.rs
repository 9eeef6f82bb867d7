use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, ExprTrait, OnConflict},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{
        AddToCartRequest, CartAction, CartItemDto, CartList, CartQuantityUpdate,
        MAX_CART_QUANTITY, UpdateCartRequest,
    },
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    ensure_customer(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = CartItems::find().filter(CartCol::UserId.eq(user.user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_desc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|product| CartItemDto {
                id: item.id,
                product: Product::from(product),
                quantity: item.quantity,
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Adds `quantity` (default 1) of a product, merging into an existing row.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_customer(user)?;
    let quantity = payload.quantity()?;

    let product = Products::find_by_id(payload.product_id)
        .filter(ProductCol::Active.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::validation("Product not found"));
    }

    let inserted = CartItems::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(payload.product_id),
        quantity: Set(quantity),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([CartCol::UserId, CartCol::ProductId])
            .value(
                CartCol::Quantity,
                Expr::col((CartItems, CartCol::Quantity)).add(quantity),
            )
            .action_and_where(
                Expr::col((CartItems, CartCol::Quantity))
                    .add(quantity)
                    .lte(MAX_CART_QUANTITY),
            )
            .to_owned(),
    )
    .exec_with_returning(&state.orm)
    .await;

    // The conflict update is skipped when the merged quantity would exceed the cap.
    let item = match inserted {
        Ok(item) => item,
        Err(DbErr::RecordNotInserted | DbErr::RecordNotFound(_)) => {
            return Err(cart_limit_error());
        }
        Err(err) => return Err(err.into()),
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", CartItem::from(item), None))
}

/// Steps a cart row up or down by one. Decrementing a row that holds a
/// single unit removes it.
pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartQuantityUpdate>> {
    ensure_customer(user)?;
    let owned = Condition::all()
        .add(CartCol::Id.eq(id))
        .add(CartCol::UserId.eq(user.user_id));

    let update = match payload.action {
        CartAction::Increment => {
            let incremented = CartItems::update_many()
                .col_expr(CartCol::Quantity, Expr::col(CartCol::Quantity).add(1))
                .filter(owned.clone().add(CartCol::Quantity.lt(MAX_CART_QUANTITY)))
                .exec_with_returning(&state.orm)
                .await?
                .into_iter()
                .next();
            let item = match incremented {
                Some(item) => item,
                None => {
                    let exists = CartItems::find().filter(owned).one(&state.orm).await?;
                    return Err(match exists {
                        Some(_) => cart_limit_error(),
                        None => AppError::NotFound,
                    });
                }
            };
            CartQuantityUpdate {
                removed: false,
                item: Some(CartItem::from(item)),
            }
        }
        CartAction::Decrement => {
            let decremented = CartItems::update_many()
                .col_expr(CartCol::Quantity, Expr::col(CartCol::Quantity).sub(1))
                .filter(owned.clone().add(CartCol::Quantity.gt(1)))
                .exec_with_returning(&state.orm)
                .await?
                .into_iter()
                .next();

            match decremented {
                Some(item) => CartQuantityUpdate {
                    removed: false,
                    item: Some(CartItem::from(item)),
                },
                None => {
                    let result = CartItems::delete_many()
                        .filter(owned.add(CartCol::Quantity.lte(1)))
                        .exec(&state.orm)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(AppError::NotFound);
                    }
                    CartQuantityUpdate {
                        removed: true,
                        item: None,
                    }
                }
            }
        }
    };

    let message = if update.removed {
        "Removed from cart"
    } else {
        "Quantity updated"
    };
    Ok(ApiResponse::success(message, update, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn cart_limit_error() -> AppError {
    AppError::validation(format!("quantity must be at most {MAX_CART_QUANTITY}"))
}
