use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Cart, CartLine};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    /// Anything that is not a positive number counts as 1.
    #[schema(value_type = Option<i32>)]
    #[serde(default)]
    pub quantity: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub cart_item_id: Uuid,
    #[schema(value_type = i32)]
    #[serde(default)]
    pub new_quantity: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartEnvelope {
    pub cart: Cart,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart: Cart,
    pub total_price: Decimal,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total_price = cart.total_price();
        Self { cart, total_price }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedItem {
    pub updated_item: CartLine,
}
