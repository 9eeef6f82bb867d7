use axum::http::StatusCode;
use chrono::{Duration, Utc};
use marketplace_api::{
    dto::{
        auth::RegisterRequest,
        cart::{AddToCartRequest, CartAction, MAX_CART_QUANTITY, UpdateCartRequest},
        products::{MAX_PRICE, ProductRequest, parse_price},
    },
    error::AppError,
    import::{SheetFormat, read_rows, valid_products},
    middleware::auth::TokenCodec,
    models::{ProductStatus, Role, StatusChange},
    response::total_pages,
    routes::{
        doc::ApiDoc,
        params::{CatalogQuery, DEFAULT_CATALOG_PAGE_SIZE, Pagination},
    },
};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;
use utoipa::OpenApi;
use uuid::Uuid;

fn register(name: &str, email: &str, password: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: role.to_string(),
    }
}

#[test]
fn registration_normalises_email() {
    let account = register("  Ana  ", " Ana@Example.COM ", "secret1", "SELLER")
        .validate()
        .unwrap();
    assert_eq!(account.name, "Ana");
    assert_eq!(account.email, "ana@example.com");
    assert_eq!(account.role, Role::Seller);
}

#[rstest]
#[case::short_name("A", "a@b.co", "secret1", "CUSTOMER")]
#[case::no_tld("Ana", "a@b", "secret1", "CUSTOMER")]
#[case::no_at("Ana", "ab.co", "secret1", "CUSTOMER")]
#[case::short_password("Ana", "a@b.co", "12345", "CUSTOMER")]
#[case::unknown_role("Ana", "a@b.co", "secret1", "ADMIN")]
#[case::lowercase_role("Ana", "a@b.co", "secret1", "seller")]
fn registration_rejects_bad_input(
    #[case] name: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] role: &str,
) {
    let err = register(name, email, password, role).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

fn product_request(body: serde_json::Value) -> ProductRequest {
    serde_json::from_value(body).unwrap()
}

#[test]
fn product_price_accepts_numbers_and_numeric_strings() {
    let fields = product_request(json!({
        "name": "Mug",
        "description": "Ceramic",
        "price": 12.5,
        "imageUrl": "https://example.com/mug.jpg"
    }))
    .validate()
    .unwrap();
    assert_eq!(fields.price, dec!(12.50));
    assert_eq!(fields.image_url, "https://example.com/mug.jpg");

    let fields = product_request(json!({
        "name": "Mug",
        "description": "Ceramic",
        "price": "0",
        "image_url": "https://example.com/mug.jpg"
    }))
    .validate()
    .unwrap();
    assert_eq!(fields.price, dec!(0));
}

#[rstest]
#[case::negative_price(json!({"name": "Mug", "description": "d", "price": -1, "image_url": "u"}))]
#[case::text_price(json!({"name": "Mug", "description": "d", "price": "cheap", "image_url": "u"}))]
#[case::missing_price(json!({"name": "Mug", "description": "d", "image_url": "u"}))]
#[case::blank_name(json!({"name": "   ", "description": "d", "price": 1, "image_url": "u"}))]
#[case::missing_image(json!({"name": "Mug", "description": "d", "price": 1}))]
#[case::price_too_large(json!({"name": "Mug", "description": "d", "price": 1e15, "image_url": "u"}))]
fn product_validation_rejects(#[case] body: serde_json::Value) {
    let err = product_request(body).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[rstest]
#[case("10", Some(dec!(10)))]
#[case(" 49.90 ", Some(dec!(49.90)))]
#[case("1.005", Some(dec!(1.00)))]
#[case("1e2", Some(dec!(100)))]
#[case("9999999999.99", Some(dec!(9999999999.99)))]
#[case("10000000000", None)]
#[case("1e15", None)]
#[case("-0.01", None)]
#[case("", None)]
#[case("abc", None)]
fn price_parsing(#[case] raw: &str, #[case] expected: Option<rust_decimal::Decimal>) {
    assert_eq!(parse_price(raw), expected);
}

#[test]
fn import_skips_rows_missing_a_field() {
    let csv = "\
Name,Price,Description,Image_URL
Shirt,49.9,Cotton shirt,https://example.com/shirt.jpg
Jeans,,Denim,https://example.com/jeans.jpg
Cap,15,Baseball cap,https://example.com/cap.jpg
Socks,5,,https://example.com/socks.jpg
Belt,30.00,Leather belt,https://example.com/belt.jpg
";
    let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 5);

    let valid = valid_products(rows);
    let names: Vec<&str> = valid.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Shirt", "Cap", "Belt"]);
}

#[test]
fn max_price_fits_the_price_column() {
    assert_eq!(MAX_PRICE, dec!(9999999999.99));
}

#[test]
fn import_drops_prices_the_column_cannot_hold() {
    let csv = "\
name,price,description,image
Yacht,100000000000,Very large,https://example.com/yacht.jpg
Mug,12,Ceramic,https://example.com/mug.jpg
";
    let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).unwrap();
    let valid = valid_products(rows);
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].name, "Mug");
}

#[test]
fn import_rejects_negative_prices() {
    let csv = "name,price,description,image\nShirt,-3,Cotton,https://example.com/s.jpg\n";
    let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).unwrap();
    assert!(valid_products(rows).is_empty());
}

#[rstest]
#[case("products.csv", Some(SheetFormat::Csv))]
#[case("PRODUCTS.XLSX", Some(SheetFormat::Xlsx))]
#[case("products.xls", None)]
#[case("products.txt", None)]
#[case("", None)]
fn sheet_format_from_extension(#[case] name: &str, #[case] expected: Option<SheetFormat>) {
    assert_eq!(SheetFormat::from_file_name(name), expected);
}

#[test]
fn garbage_xlsx_is_a_validation_error() {
    let err = read_rows(SheetFormat::Xlsx, b"definitely not a zip").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[rstest]
#[case(AppError::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(AppError::Forbidden, StatusCode::FORBIDDEN)]
#[case(AppError::NotFound, StatusCode::NOT_FOUND)]
#[case(AppError::validation("bad"), StatusCode::BAD_REQUEST)]
#[case(AppError::Conflict("taken".into()), StatusCode::BAD_REQUEST)]
#[case(AppError::EmptyCart, StatusCode::BAD_REQUEST)]
#[case(AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR)]
fn error_statuses(#[case] err: AppError, #[case] status: StatusCode) {
    assert_eq!(err.status(), status);
}

#[test]
fn internal_errors_do_not_leak_their_cause() {
    let err = AppError::Internal(anyhow::anyhow!("password for db is hunter2"));
    assert_eq!(err.to_string(), "Internal Server Error");
}

#[test]
fn status_changes_are_idempotent() {
    assert_eq!(
        StatusChange::SoftDelete.apply(ProductStatus::Active),
        Some(ProductStatus::Inactive)
    );
    assert_eq!(StatusChange::SoftDelete.apply(ProductStatus::Inactive), None);
    assert_eq!(
        StatusChange::Reactivate.apply(ProductStatus::Inactive),
        Some(ProductStatus::Active)
    );
    assert_eq!(StatusChange::Reactivate.apply(ProductStatus::Active), None);
}

#[test]
fn cart_update_defaults_to_decrement() {
    let update: UpdateCartRequest = serde_json::from_value(json!({})).unwrap();
    assert_eq!(update.action, CartAction::Decrement);

    let update: UpdateCartRequest = serde_json::from_value(json!({"action": "increment"})).unwrap();
    assert_eq!(update.action, CartAction::Increment);
}

#[rstest]
#[case(None, Some(1))]
#[case(Some(1), Some(1))]
#[case(Some(MAX_CART_QUANTITY), Some(MAX_CART_QUANTITY))]
#[case(Some(0), None)]
#[case(Some(-3), None)]
#[case(Some(MAX_CART_QUANTITY + 1), None)]
#[case(Some(i32::MAX), None)]
fn cart_quantity_bounds(#[case] quantity: Option<i32>, #[case] expected: Option<i32>) {
    let request = AddToCartRequest {
        product_id: Uuid::new_v4(),
        quantity,
    };
    match expected {
        Some(expected) => assert_eq!(request.quantity().unwrap(), expected),
        None => assert!(matches!(
            request.quantity().unwrap_err(),
            AppError::Validation(_)
        )),
    }
}

#[rstest]
#[case(None, None, (1, 20, 0))]
#[case(Some(0), Some(0), (1, 1, 0))]
#[case(Some(3), Some(10), (3, 10, 20))]
#[case(Some(2), Some(1000), (2, 100, 100))]
fn pagination_is_clamped(
    #[case] page: Option<i64>,
    #[case] per_page: Option<i64>,
    #[case] expected: (i64, i64, i64),
) {
    assert_eq!(Pagination { page, per_page }.normalize(), expected);
}

#[test]
fn catalog_page_size_defaults_to_six() {
    let (page, page_size, offset) = CatalogQuery::default()
        .pagination()
        .normalize_with(DEFAULT_CATALOG_PAGE_SIZE);
    assert_eq!((page, page_size, offset), (1, 6, 0));
}

#[rstest]
#[case(0, 6, 0)]
#[case(6, 6, 1)]
#[case(7, 6, 2)]
#[case(13, 6, 3)]
fn page_count_rounds_up(#[case] total: i64, #[case] per_page: i64, #[case] expected: i64) {
    assert_eq!(total_pages(total, per_page), expected);
}

#[test]
fn token_round_trip_keeps_identity() {
    let codec = TokenCodec::new("unit-secret", 24);
    let user_id = Uuid::new_v4();
    let issued = codec.issue(user_id, Role::Seller).unwrap();

    assert!(issued.expires_at > Utc::now() + Duration::hours(23));
    let user = codec.verify(&issued.token).unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.role, Role::Seller);
}

#[test]
fn expired_or_tampered_tokens_do_not_verify() {
    let codec = TokenCodec::new("unit-secret", 24);
    let expired = codec
        .issue_until(Uuid::new_v4(), Role::Customer, Utc::now() - Duration::hours(1))
        .unwrap();
    assert!(codec.verify(&expired).is_none());

    let mut tampered = codec.issue(Uuid::new_v4(), Role::Customer).unwrap().token;
    tampered.push('x');
    assert!(codec.verify(&tampered).is_none());
    assert!(codec.verify("").is_none());
}

#[test]
fn freshly_expired_token_gets_no_grace_period() {
    let codec = TokenCodec::new("unit-secret", 24);
    let expired = codec
        .issue_until(Uuid::new_v4(), Role::Customer, Utc::now() - Duration::seconds(5))
        .unwrap();
    assert!(codec.verify(&expired).is_none());
}

#[test]
fn openapi_document_builds() {
    let doc = ApiDoc::openapi();
    assert!(doc.paths.paths.contains_key("/api/orders/checkout"));
    assert!(doc.paths.paths.contains_key("/api/cart/{id}"));

    let schemas = &doc.components.expect("components").schemas;
    assert!(schemas.contains_key("UpdateCartRequest"));
    assert!(schemas.contains_key("CartAction"));
}
