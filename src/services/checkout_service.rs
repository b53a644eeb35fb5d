use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::StockPolicy,
    entity::{
        cart_items::{self, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, CartStatus, Column as CartCol, Entity as Carts},
        order_items::{ActiveModel as OrderItemActive, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, OrderStatus},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::max_money,
    state::AppState,
};

/// A cart line joined with the live product row it points at.
#[derive(Debug, Clone, FromQueryResult)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub new_stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub total_price: Decimal,
    pub lines: Vec<PlannedLine>,
}

/// Freeze prices and work out post-checkout stock for every line.
pub fn plan_checkout(lines: &[CheckoutLine], policy: StockPolicy) -> AppResult<CheckoutPlan> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart empty".into()));
    }

    let mut total_price = Decimal::ZERO;
    let mut planned = Vec::with_capacity(lines.len());
    for line in lines {
        let remaining = line.stock - line.quantity;
        let new_stock = match policy {
            StockPolicy::Reject if remaining < 0 => {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock for product {} (requested {}, available {})",
                    line.name, line.quantity, line.stock
                )));
            }
            StockPolicy::Reject => remaining,
            StockPolicy::Clamp => remaining.max(0),
        };
        total_price += line.price * Decimal::from(line.quantity);
        planned.push(PlannedLine {
            product_id: line.product_id,
            product_name: line.name.clone(),
            quantity: line.quantity,
            price_at_purchase: line.price,
            new_stock,
        });
    }

    if total_price > max_money() {
        return Err(AppError::BadRequest(format!(
            "Order total {total_price} exceeds the maximum of {}",
            max_money()
        )));
    }

    Ok(CheckoutPlan {
        total_price,
        lines: planned,
    })
}

/// Turn the caller's pending cart into a paid order. Everything from reading the
/// cart to completing it runs in one transaction; nothing is written on failure.
pub async fn checkout(state: &AppState, user_id: Uuid) -> AppResult<Uuid> {
    let txn = state.orm.begin().await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::Status.eq(CartStatus::Pending))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Cart empty".into()))?;

    // Product rows are locked in id order so concurrent checkouts cannot deadlock.
    let lines = CartItems::find()
        .select_only()
        .column(CartItemCol::ProductId)
        .column(CartItemCol::Quantity)
        .column_as(ProdCol::Name, "name")
        .column_as(ProdCol::Price, "price")
        .column_as(ProdCol::Stock, "stock")
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .into_model::<CheckoutLine>()
        .all(&txn)
        .await?;

    let plan = plan_checkout(&lines, state.config.stock_policy)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_price: Set(plan.total_price),
        status: Set(OrderStatus::Paid),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let order_items = plan.lines.iter().map(|line| OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        product_id: Set(Some(line.product_id)),
        product_name: Set(line.product_name.clone()),
        quantity: Set(line.quantity),
        price_at_purchase: Set(line.price_at_purchase),
        created_at: NotSet,
    });
    OrderItems::insert_many(order_items).exec(&txn).await?;

    for line in &plan.lines {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::value(line.new_stock))
            .col_expr(ProdCol::UpdatedAt, Expr::cust("now()"))
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(&txn)
            .await?;
    }

    let cart_id = cart.id;
    let mut active: CartActive = cart.into();
    active.status = Set(CartStatus::Completed);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        %user_id,
        %cart_id,
        order_id = %order.id,
        total = %plan.total_price,
        lines = plan.lines.len(),
        "checkout completed"
    );
    audit::record(
        &state.pool,
        user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "cart_id": cart_id }),
    )
    .await;

    Ok(order.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, price: i64, quantity: i32, stock: i32) -> CheckoutLine {
        CheckoutLine {
            product_id: Uuid::new_v4(),
            quantity,
            name: name.into(),
            price: Decimal::from(price),
            stock,
        }
    }

    #[test]
    fn totals_and_snapshots_follow_live_prices() {
        let lines = [line("A", 10, 2, 50), line("B", 5, 1, 50)];
        let plan = plan_checkout(&lines, StockPolicy::Reject).unwrap();
        assert_eq!(plan.total_price, Decimal::from(25));
        assert_eq!(plan.lines[0].price_at_purchase, Decimal::from(10));
        assert_eq!(plan.lines[1].price_at_purchase, Decimal::from(5));
        assert_eq!(plan.lines[0].new_stock, 48);
        assert_eq!(plan.lines[1].new_stock, 49);
    }

    #[test]
    fn empty_cart_cannot_be_planned() {
        let err = plan_checkout(&[], StockPolicy::Clamp).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Cart empty"));
    }

    #[test]
    fn reject_policy_refuses_over_demand() {
        let lines = [line("A", 10, 1, 10), line("Widget", 3, 5, 3)];
        let err = plan_checkout(&lines, StockPolicy::Reject).unwrap_err();
        match err {
            AppError::BadRequest(message) => assert!(message.contains("Widget")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn clamp_policy_floors_stock_at_zero() {
        let plan = plan_checkout(&[line("Widget", 3, 5, 3)], StockPolicy::Clamp).unwrap();
        assert_eq!(plan.lines[0].new_stock, 0);
        assert_eq!(plan.total_price, Decimal::from(15));
    }

    #[test]
    fn totals_beyond_the_money_column_are_refused() {
        let lines = [line("Bulk", 100, 500_000_000, 1_000_000_000)];
        let err = plan_checkout(&lines, StockPolicy::Reject).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("exceeds the maximum")));

        let at_limit = CheckoutLine {
            price: max_money(),
            ..line("Exact", 0, 1, 1)
        };
        let plan = plan_checkout(&[at_limit], StockPolicy::Reject).unwrap();
        assert_eq!(plan.total_price, max_money());
    }

    #[test]
    fn exact_stock_is_allowed_under_reject() {
        let plan = plan_checkout(&[line("A", 1, 3, 3)], StockPolicy::Reject).unwrap();
        assert_eq!(plan.lines[0].new_stock, 0);
    }
}
