mod common;

use axum_storefront_api::{
    config::StockPolicy,
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::AppError,
    services::product_service,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{create_product, setup_state};

fn new_product(price: Decimal) -> CreateProductRequest {
    CreateProductRequest {
        name: format!("Catalog product {}", Uuid::new_v4()),
        description: None,
        price,
        image: None,
        category: "testing".into(),
        brand: "Test Brand".into(),
        stock: 5,
    }
}

#[tokio::test]
async fn prices_the_money_column_cannot_hold_are_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let admin = Uuid::new_v4();

    for price in [Decimal::new(5, 3), Decimal::from(100_000_000_000_i64)] {
        let err = product_service::create_product(&state, admin, new_product(price))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "{price} should be rejected");
    }

    let existing = create_product(&state, Decimal::from(4), 1).await?;
    let err = product_service::update_product(
        &state,
        admin,
        existing,
        UpdateProductRequest {
            price: Some(Decimal::new(12_345, 3)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(
        product_service::get_product(&state, existing).await?.price,
        Decimal::from(4)
    );
    Ok(())
}

#[tokio::test]
async fn stored_prices_match_what_was_sent() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let admin = Uuid::new_v4();

    let created =
        product_service::create_product(&state, admin, new_product(Decimal::new(12_990, 3)))
            .await?;
    assert_eq!(created.price, Decimal::new(1299, 2));

    let fetched = product_service::get_product(&state, created.id).await?;
    assert_eq!(fetched.price, Decimal::new(1299, 2));

    product_service::delete_product(&state, admin, created.id).await?;
    Ok(())
}
