use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{ImportSummary, ProductFields, ProductPage, ProductRequest},
    entity::products::{
        ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
        Model as ProductModel,
    },
    error::{AppError, AppResult},
    import::{self, SheetFormat},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Product, ProductStatus, Role, StatusChange},
    response::{ApiResponse, Meta, total_pages},
    routes::params::{CatalogQuery, DEFAULT_CATALOG_PAGE_SIZE, ProductSortBy, SortOrder},
    state::AppState,
};

const IMPORT_CHUNK: usize = 1000;

/// Sellers page through their own products, active or not; everyone else
/// sees the active catalog.
pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductPage>> {
    let (page, page_size, offset) = query
        .pagination()
        .normalize_with(DEFAULT_CATALOG_PAGE_SIZE);

    let mut condition = Condition::all();
    condition = match user.role {
        Role::Seller => condition.add(ProductCol::SellerId.eq(user.user_id)),
        Role::Customer => condition.add(ProductCol::Active.eq(true)),
    };

    if let Some(search) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProductCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProductCol::Description).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => ProductCol::CreatedAt,
        ProductSortBy::Price => ProductCol::Price,
        ProductSortBy::Name => ProductCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(ProductCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(page_size as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let data = ProductPage {
        products,
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
    };
    Ok(ApiResponse::success(
        "Products",
        data,
        Some(Meta::new(page, page_size, total)),
    ))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let mut condition = Condition::all().add(ProductCol::Id.eq(id));
    condition = match user.role {
        Role::Seller => condition.add(ProductCol::SellerId.eq(user.user_id)),
        Role::Customer => condition.add(ProductCol::Active.eq(true)),
    };

    let product = Products::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let fields = payload.validate()?;

    let product = new_product(user.user_id, fields)
        .insert(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let fields = payload.validate()?;
    let existing = find_owned(&state.orm, user.user_id, id).await?;

    let mut active: ProductActive = existing.into();
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.price = Set(fields.price);
    active.image_url = Set(fields.image_url);
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Soft delete or reactivate. Repeating a change is a no-op that still
/// returns the product.
pub async fn change_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    change: StatusChange,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = find_owned(&state.orm, user.user_id, id).await?;

    let product = match change.apply(ProductStatus::from_active(existing.active)) {
        Some(next) => {
            let mut active: ProductActive = existing.into();
            active.active = Set(next.is_active());
            active.update(&state.orm).await?
        }
        None => existing,
    };

    let (action, message) = match change {
        StatusChange::SoftDelete => ("product_deactivate", "Product deactivated"),
        StatusChange::Reactivate => ("product_reactivate", "Product reactivated"),
    };
    audit::record(
        &state.pool,
        Some(user.user_id),
        action,
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        message,
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Bulk-creates products from a spreadsheet. Rows missing a field are
/// skipped; the remaining rows are inserted together or not at all.
pub async fn import_products(
    state: &AppState,
    user: &AuthUser,
    file_name: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<ImportSummary>> {
    ensure_seller(user)?;
    let format = SheetFormat::from_file_name(file_name)
        .ok_or_else(|| AppError::validation("Unsupported file type, upload a .csv or .xlsx file"))?;

    let rows = import::read_rows(format, bytes)?;
    let total_rows = rows.len();
    let valid = import::valid_products(rows);
    if valid.is_empty() {
        return Err(AppError::validation("No valid products found in file"));
    }

    let imported = valid.len();
    let models: Vec<ProductActive> = valid
        .into_iter()
        .map(|fields| new_product(user.user_id, fields))
        .collect();

    let txn = state.orm.begin().await?;
    for chunk in models.chunks(IMPORT_CHUNK) {
        Products::insert_many(chunk.to_vec()).exec(&txn).await?;
    }
    txn.commit().await?;

    tracing::info!(
        seller_id = %user.user_id,
        imported,
        skipped = total_rows - imported,
        "products imported"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_import",
        "products",
        serde_json::json!({ "imported": imported, "skipped": total_rows - imported }),
    )
    .await;

    Ok(ApiResponse::success(
        "Products imported",
        ImportSummary { imported },
        Some(Meta::empty()),
    ))
}

pub fn import_template() -> AppResult<Vec<u8>> {
    import::build_template()
}

/// A product that exists but belongs to someone else is reported as missing.
pub async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    seller_id: Uuid,
    id: Uuid,
) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(ProductCol::SellerId.eq(seller_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

fn new_product(seller_id: Uuid, fields: ProductFields) -> ProductActive {
    ProductActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller_id),
        name: Set(fields.name),
        description: Set(fields.description),
        price: Set(fields.price),
        image_url: Set(fields.image_url),
        active: Set(true),
        created_at: NotSet,
    }
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shirt"), "shirt");
    }
}
