use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::AppResult,
    models::{Order, OrderItem, OrderProductSnapshot},
    state::AppState,
};

/// Orders placed by one user, oldest first.
pub async fn list_orders_for_user(state: &AppState, user_id: Uuid) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .order_by_asc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    with_items(&state.orm, orders).await
}

/// Every order in the system, newest first. Callers are expected to have checked
/// the admin role already.
pub async fn list_all_orders(state: &AppState) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    with_items(&state.orm, orders).await
}

async fn with_items<C: ConnectionTrait>(db: &C, orders: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(db)
        .await?;

    let product_ids: HashSet<Uuid> = items.iter().filter_map(|i| i.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .filter(ProdCol::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        let product = item.product_id.and_then(|id| products.get(&id));
        grouped
            .entry(item.order_id)
            .or_default()
            .push(order_item_from_entity(item, product));
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            order_from_entity(order, items)
        })
        .collect())
}

fn order_from_entity(model: OrderModel, items: Vec<OrderItem>) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_price: model.total_price,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        items,
    }
}

fn order_item_from_entity(model: OrderItemModel, product: Option<&ProductModel>) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        price_at_purchase: model.price_at_purchase,
        product: product.map(|p| OrderProductSnapshot {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            image: p.image.clone(),
            brand: p.brand.clone(),
        }),
    }
}
