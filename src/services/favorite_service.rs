use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::favorites::{
        FavoriteIds, FavoriteList, FavoriteToggle, FavoriteWithProduct, ToggleFavoriteRequest,
    },
    entity::{
        favorites::{ActiveModel as FavoriteActive, Column as FavoriteCol, Entity as Favorites},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

#[derive(FromRow)]
struct FavoriteWithProductRow {
    favorite_id: Uuid,
    favorited_at: DateTime<Utc>,
    product_id: Uuid,
    seller_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    active: bool,
    created_at: DateTime<Utc>,
}

/// Flips the favorite flag for one product.
pub async fn toggle_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleFavoriteRequest,
) -> AppResult<ApiResponse<FavoriteToggle>> {
    ensure_customer(user)?;

    let removed = Favorites::delete_many()
        .filter(FavoriteCol::UserId.eq(user.user_id))
        .filter(FavoriteCol::ProductId.eq(payload.product_id))
        .exec(&state.orm)
        .await?;
    if removed.rows_affected > 0 {
        return Ok(ApiResponse::success(
            "Removed from favorites",
            FavoriteToggle { favorited: false },
            None,
        ));
    }

    if Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::validation("Product not found"));
    }

    let inserted = FavoriteActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(payload.product_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    match inserted {
        Ok(_) => {}
        // A concurrent toggle inserted the same row first.
        Err(err) if is_unique_violation(&err) => {}
        Err(err) => return Err(err.into()),
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_add",
        "favorites",
        serde_json::json!({ "product_id": payload.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Added to favorites",
        FavoriteToggle { favorited: true },
        None,
    ))
}

pub async fn list_favorite_ids(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteIds>> {
    ensure_customer(user)?;
    let product_ids: Vec<Uuid> = Favorites::find()
        .select_only()
        .column(FavoriteCol::ProductId)
        .filter(FavoriteCol::UserId.eq(user.user_id))
        .order_by_desc(FavoriteCol::CreatedAt)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success("OK", FavoriteIds { product_ids }, None))
}

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteList>> {
    ensure_customer(user)?;
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, FavoriteWithProductRow>(
        r#"
        SELECT f.id AS favorite_id, f.created_at AS favorited_at,
               p.id AS product_id, p.seller_id, p.name, p.description, p.price,
               p.image_url, p.active, p.created_at
        FROM favorites f
        JOIN products p ON p.id = f.product_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC, f.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| FavoriteWithProduct {
            id: row.favorite_id,
            created_at: row.favorited_at,
            product: Product {
                id: row.product_id,
                seller_id: row.seller_id,
                name: row.name,
                description: row.description,
                price: row.price,
                image_url: row.image_url,
                active: row.active,
                created_at: row.created_at,
            },
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", FavoriteList { items }, Some(meta)))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;
    let result = Favorites::delete_many()
        .filter(FavoriteCol::Id.eq(id))
        .filter(FavoriteCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_remove",
        "favorites",
        serde_json::json!({ "favorite_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
