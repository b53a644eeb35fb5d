use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{FromRow, PgConnection, PgExecutor};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    entity::carts::CartStatus,
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartLine, CartProductSummary},
    state::AppState,
};

#[derive(FromRow)]
struct CartItemRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    name: String,
    price: Decimal,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            product: CartProductSummary {
                id: row.product_id,
                name: row.name,
                price: row.price,
            },
        }
    }
}

/// Quantity for add-to-cart: positive numbers (or numeric strings) are truncated to
/// whole units, anything else becomes 1.
pub fn coerce_add_quantity(raw: Option<&Value>) -> i32 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(q) if q.is_finite() && q >= 1.0 => q.min(i32::MAX as f64) as i32,
        _ => 1,
    }
}

/// Quantity for an explicit update: must be a JSON integer greater than zero.
pub fn parse_new_quantity(raw: &Value) -> AppResult<i32> {
    let invalid = || AppError::BadRequest("Invalid quantity. Must be greater than 0.".into());
    let n = match raw {
        Value::Number(n) => n,
        _ => return Err(invalid()),
    };
    let q = if let Some(i) = n.as_i64() {
        i
    } else {
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 => f as i64,
            _ => return Err(invalid()),
        }
    };
    if q <= 0 {
        return Err(invalid());
    }
    i32::try_from(q).map_err(|_| invalid())
}

async fn pending_cart_id<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM carts WHERE user_id = $1 AND status = 'pending'")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Return the user's pending cart, creating it when absent. The partial unique index
/// on `carts(user_id) WHERE status = 'pending'` makes this race-free, and the
/// conflicting row stays locked until the surrounding transaction ends.
async fn ensure_pending_cart(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, sqlx::Error> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO carts (user_id, status)
        VALUES ($1, 'pending')
        ON CONFLICT (user_id) WHERE status = 'pending'
        DO UPDATE SET updated_at = now()
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

async fn load_cart<'e>(executor: impl PgExecutor<'e>, cart_id: Uuid) -> Result<Cart, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        r#"
        SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, p.name, p.price
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at, ci.id
        "#,
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    Ok(Cart {
        id: Some(cart_id),
        status: CartStatus::Pending,
        items: rows.into_iter().map(CartItem::from).collect(),
    })
}

pub async fn add_item(
    state: &AppState,
    user_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<Cart> {
    let quantity = coerce_add_quantity(payload.quantity.as_ref());
    let mut tx = state.pool.begin().await?;

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound("Product"));
    }

    let cart_id = ensure_pending_cart(&mut tx, user_id).await?;

    let line = sqlx::query_as::<_, CartLine>(
        r#"
        INSERT INTO cart_items (cart_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET quantity = LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, 2147483647)
        RETURNING id, cart_id, product_id, quantity, created_at
        "#,
    )
    .bind(cart_id)
    .bind(payload.product_id)
    .bind(quantity)
    .fetch_one(&mut *tx)
    .await?;

    let cart = load_cart(&mut *tx, cart_id).await?;
    tx.commit().await?;

    tracing::debug!(
        %user_id,
        %cart_id,
        product_id = %payload.product_id,
        quantity = line.quantity,
        "cart line upserted"
    );
    audit::record(
        &state.pool,
        user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": quantity }),
    )
    .await;

    Ok(cart)
}

pub async fn get_cart(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
    let cart = match pending_cart_id(&state.pool, user_id).await? {
        Some(cart_id) => load_cart(&state.pool, cart_id).await?,
        None => Cart::empty(),
    };
    Ok(CartView::from(cart))
}

pub async fn update_item_quantity(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<CartLine> {
    let quantity = parse_new_quantity(&payload.new_quantity)?;

    let cart_id = pending_cart_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    let line = sqlx::query_as::<_, CartLine>(
        r#"
        UPDATE cart_items
        SET quantity = $3
        WHERE id = $1 AND cart_id = $2
        RETURNING id, cart_id, product_id, quantity, created_at
        "#,
    )
    .bind(payload.cart_item_id)
    .bind(cart_id)
    .bind(quantity)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Cart item"))?;

    audit::record(
        &state.pool,
        user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "cart_item_id": line.id, "quantity": quantity }),
    )
    .await;

    Ok(line)
}

pub async fn remove_item(state: &AppState, user_id: Uuid, cart_item_id: Uuid) -> AppResult<()> {
    // The join ties the line to a pending cart owned by the caller.
    let result = sqlx::query(
        r#"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.id = $1
          AND ci.cart_id = c.id
          AND c.user_id = $2
          AND c.status = 'pending'
        "#,
    )
    .bind(cart_item_id)
    .bind(user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Cart item"));
    }

    audit::record(
        &state.pool,
        user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_item_id": cart_item_id }),
    )
    .await;

    Ok(())
}

/// Empty the pending cart; the cart row itself stays pending.
pub async fn clear_cart(state: &AppState, user_id: Uuid) -> AppResult<u64> {
    let cart_id = pending_cart_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::NotFound("Cart"))?;

    let removed = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    audit::record(
        &state.pool,
        user_id,
        "cart_clear",
        "carts",
        serde_json::json!({ "cart_id": cart_id, "removed": removed }),
    )
    .await;

    Ok(removed)
}
