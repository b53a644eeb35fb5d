mod common;

use axum_storefront_api::{
    config::StockPolicy,
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    error::AppError,
    services::cart_service,
};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use common::{add, cart_count, create_product, setup_state};

// add -> get -> update -> get -> remove -> get
#[tokio::test]
async fn cart_round_trip_tracks_quantities_and_total() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let user = Uuid::new_v4();
    let mug = create_product(&state, Decimal::new(1250, 2), 20).await?;
    let pen = create_product(&state, Decimal::from(3), 20).await?;

    add(&state, user, mug, 2).await?;
    add(&state, user, pen, 1).await?;

    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.cart.items.len(), 2);
    assert_eq!(view.total_price, Decimal::from(28));

    let mug_line = view
        .cart
        .items
        .iter()
        .find(|i| i.product_id == mug)
        .expect("mug line")
        .id;
    let updated = cart_service::update_item_quantity(
        &state,
        user,
        UpdateCartItemRequest {
            cart_item_id: mug_line,
            new_quantity: json!(4),
        },
    )
    .await?;
    assert_eq!(updated.quantity, 4);

    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.total_price, Decimal::from(53));

    cart_service::remove_item(&state, user, mug_line).await?;
    let view = cart_service::get_cart(&state, user).await?;
    assert!(view.cart.items.iter().all(|i| i.id != mug_line));
    assert_eq!(view.total_price, Decimal::from(3));

    Ok(())
}

#[tokio::test]
async fn adding_a_product_twice_increments_one_line() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let user = Uuid::new_v4();
    let product = create_product(&state, Decimal::from(7), 5).await?;

    // Missing quantity counts as one.
    let cart = cart_service::add_item(
        &state,
        user,
        AddToCartRequest {
            product_id: product,
            quantity: None,
        },
    )
    .await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);

    let cart = cart_service::add_item(
        &state,
        user,
        AddToCartRequest {
            product_id: product,
            quantity: Some(json!("3")),
        },
    )
    .await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 4);
    assert!(cart.items[0].product.name.starts_with("Test product"));

    // Stock is only enforced at checkout.
    add(&state, user, product, 10).await?;
    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.cart.items[0].quantity, 14);

    assert_eq!(cart_count(&state, user, "pending").await?, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_adds_share_one_cart_and_line() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let user = Uuid::new_v4();
    let product = create_product(&state, Decimal::from(2), 100).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            add(&state, user, product, 1).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(cart_count(&state, user, "pending").await?, 1);
    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.cart.items.len(), 1);
    assert_eq!(view.cart.items[0].quantity, 8);
    Ok(())
}

#[tokio::test]
async fn users_cannot_touch_each_others_lines() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let product = create_product(&state, Decimal::from(9), 10).await?;

    add(&state, alice, product, 2).await?;
    let alice_line = cart_service::get_cart(&state, alice).await?.cart.items[0].id;

    // Bob has no cart at all yet.
    let err = cart_service::update_item_quantity(
        &state,
        bob,
        UpdateCartItemRequest {
            cart_item_id: alice_line,
            new_quantity: json!(50),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Cart")));

    // Owning a cart does not make a guessed id usable.
    add(&state, bob, product, 1).await?;
    let err = cart_service::update_item_quantity(
        &state,
        bob,
        UpdateCartItemRequest {
            cart_item_id: alice_line,
            new_quantity: json!(50),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Cart item")));

    let err = cart_service::remove_item(&state, bob, alice_line)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Cart item")));

    let bob_view = cart_service::get_cart(&state, bob).await?;
    assert!(bob_view.cart.items.iter().all(|i| i.id != alice_line));

    let alice_view = cart_service::get_cart(&state, alice).await?;
    assert_eq!(alice_view.cart.items.len(), 1);
    assert_eq!(alice_view.cart.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn clear_cart_keeps_the_pending_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let user = Uuid::new_v4();

    let err = cart_service::clear_cart(&state, user).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("Cart")));

    let a = create_product(&state, Decimal::from(1), 10).await?;
    let b = create_product(&state, Decimal::from(2), 10).await?;
    add(&state, user, a, 1).await?;
    add(&state, user, b, 1).await?;
    let cart_id = cart_service::get_cart(&state, user).await?.cart.id;

    assert_eq!(cart_service::clear_cart(&state, user).await?, 2);

    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.cart.id, cart_id);
    assert!(view.cart.items.is_empty());
    assert_eq!(view.total_price, Decimal::ZERO);
    assert_eq!(cart_count(&state, user, "pending").await?, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_requests_are_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let user = Uuid::new_v4();

    let err = cart_service::add_item(
        &state,
        user,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: Some(json!(1)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Product")));
    assert_eq!(cart_count(&state, user, "pending").await?, 0);

    let product = create_product(&state, Decimal::from(1), 10).await?;
    add(&state, user, product, 1).await?;
    let line = cart_service::get_cart(&state, user).await?.cart.items[0].id;

    for bad in [json!(0), json!(-2), json!("two")] {
        let err = cart_service::update_item_quantity(
            &state,
            user,
            UpdateCartItemRequest {
                cart_item_id: line,
                new_quantity: bad,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let view = cart_service::get_cart(&state, user).await?;
    assert_eq!(view.cart.items[0].quantity, 1);
    Ok(())
}

#[tokio::test]
async fn missing_cart_reads_as_empty() -> anyhow::Result<()> {
    let Some(state) = setup_state(StockPolicy::Reject).await? else {
        return Ok(());
    };
    let view = cart_service::get_cart(&state, Uuid::new_v4()).await?;
    assert!(view.cart.id.is_none());
    assert!(view.cart.items.is_empty());
    assert_eq!(view.total_price, Decimal::ZERO);
    Ok(())
}
