use marketplace_api::{
    db::{create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;

    let pool = create_pool(&database_url, 2).await?;
    run_migrations(&pool).await?;

    let seller_id = ensure_user(
        &pool,
        "Demo Seller",
        "seller@example.com",
        "seller123",
        Role::Seller,
    )
    .await?;
    let customer_id = ensure_user(
        &pool,
        "Demo Customer",
        "customer@example.com",
        "customer123",
        Role::Customer,
    )
    .await?;
    seed_products(&pool, seller_id).await?;

    println!("Seed completed. Seller ID: {seller_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, active = TRUE
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", Decimal::new(5500, 2)),
        ("Ferris Mug", "Coffee tastes better with Ferris", Decimal::new(1200, 2)),
        ("Rust Sticker Pack", "Decorate your laptop", Decimal::new(500, 2)),
        ("E-book: Async Rust", "Learn async Rust patterns", Decimal::new(2500, 2)),
    ];

    for (name, description, price) in products {
        let image_url = format!(
            "https://example.com/images/{}.jpg",
            name.to_lowercase().replace([' ', ':'], "-")
        );
        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, description, price, image_url)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM products WHERE seller_id = $2 AND name = $3
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .execute(pool)
        .await?;
    }

    println!("Seeded products for seller {seller_id}");
    Ok(())
}
