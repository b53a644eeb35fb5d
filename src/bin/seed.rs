use axum_storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::{ADMIN_ROLE, issue_token},
};
use rust_decimal::Decimal;
use uuid::Uuid;

// Fixed ids so re-running the seed prints tokens for the same identities.
const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
const SHOPPER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    run_migrations(&pool).await?;

    seed_products(&pool).await?;

    let ttl = chrono::Duration::days(7);
    let admin_token = issue_token(&config.jwt_secret, ADMIN_ID, ADMIN_ROLE, ttl)?;
    let shopper_token = issue_token(&config.jwt_secret, SHOPPER_ID, "user", ttl)?;

    println!("Seed completed.");
    println!("Admin   {ADMIN_ID}: Bearer {admin_token}");
    println!("Shopper {SHOPPER_ID}: Bearer {shopper_token}");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Ferris Hoodie", "Warm hoodie for Rustaceans", 5500, "apparel", "Ferris Co", 50),
        ("Ferris Mug", "Coffee tastes better with Ferris", 1200, "kitchen", "Ferris Co", 100),
        ("Sticker Pack", "Decorate your laptop", 500, "accessories", "Crab Supply", 200),
        ("Mechanical Keyboard", "Tactile switches, 75% layout", 8950, "electronics", "Crab Supply", 15),
    ];

    for (name, desc, cents, category, brand, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, category, brand, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(Decimal::new(cents, 2))
        .bind(category)
        .bind(brand)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
