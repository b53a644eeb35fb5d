use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{carts::CartStatus, orders::OrderStatus};

/// Money columns are `NUMERIC(12, 2)`: two decimal places, at most this much.
pub const MONEY_SCALE: u32 = 2;

pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: String,
    pub brand: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Live product fields shown next to a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: CartProductSummary,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// A raw cart line as stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    /// `None` when the user has no pending cart yet.
    pub id: Option<Uuid>,
    pub status: CartStatus,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty() -> Self {
        Self {
            id: None,
            status: CartStatus::Pending,
            items: Vec::new(),
        }
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Product fields joined onto an order line for display. Prices here are live
/// catalog prices, the line's `price_at_purchase` is what was charged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub brand: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub product: Option<OrderProductSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}
