use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::{OrderList, OrderWithItems},
        products::MAX_PRICE,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// One cart row priced at the product's current price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

/// Sum of `price × quantity`. An empty cart cannot be priced.
pub fn price_cart(lines: &[PricedLine]) -> AppResult<Decimal> {
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }
    let total: Decimal = lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();
    if total > MAX_PRICE {
        return Err(AppError::validation("order total exceeds the supported amount"));
    }
    Ok(total)
}

/// Turns the user's cart into an order on `conn`, which must be a
/// transaction: the cart rows stay locked until it ends, so a concurrent
/// checkout for the same user waits and then finds the cart empty.
pub async fn place_order<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<OrderWithItems> {
    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(conn)
        .await?;
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let product_ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProductCol::Id.is_in(product_ids))
        .lock_shared()
        .all(conn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let lines = cart
        .iter()
        .map(|item| {
            let product = products.get(&item.product_id).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "cart references missing product {}",
                    item.product_id
                ))
            })?;
            Ok(PricedLine {
                product_id: item.product_id,
                quantity: item.quantity,
                price: product.price,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    let total = price_cart(&lines)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        items.push(OrderItem::from_entity(item, products.get(&line.product_id)));
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(conn)
        .await?;

    Ok(OrderWithItems {
        order: Order::from(order),
        items,
    })
}

pub async fn checkout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;

    let txn = state.orm.begin().await?;
    let placed = place_order(&txn, user.user_id).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %placed.order.id,
        user_id = %user.user_id,
        total = %placed.order.total,
        "order placed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": placed.order.id, "total": placed.order.total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        placed,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_customer(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(OrderCol::UserId.eq(user.user_id));
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .order_by_asc(OrderCol::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_items(state, orders).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_customer(user)?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = with_items(state, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Attaches line items, with product name and image, to each order.
async fn with_items(state: &AppState, orders: Vec<OrderModel>) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|order| order.id).collect();
    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for (item, product) in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
    {
        grouped
            .entry(item.order_id)
            .or_default()
            .push(OrderItem::from_entity(item, product.as_ref()));
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: grouped.remove(&order.id).unwrap_or_default(),
            order: Order::from(order),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cart_total_sums_every_line() {
        let lines = [
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 2,
                price: dec!(10.00),
            },
            PricedLine {
                product_id: Uuid::new_v4(),
                quantity: 1,
                price: dec!(5.50),
            },
        ];
        assert_eq!(price_cart(&lines).unwrap(), dec!(25.50));
    }

    #[test]
    fn total_beyond_the_column_range_is_rejected() {
        let lines = [PricedLine {
            product_id: Uuid::new_v4(),
            quantity: 2,
            price: MAX_PRICE,
        }];
        assert!(matches!(price_cart(&lines), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_cart_cannot_be_priced() {
        assert!(matches!(price_cart(&[]), Err(AppError::EmptyCart)));
    }
}
