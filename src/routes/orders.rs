use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, middleware::auth::AuthUser, models::Order, services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_orders))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Orders placed by the caller, with line items", body = Vec<Order>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders_for_user(&state, user.user_id).await?;
    Ok(Json(orders))
}
