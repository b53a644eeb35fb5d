use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/orders", get(list_all_orders))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    responses(
        (status = 200, description = "All orders, newest first (admin only)", body = Vec<Order>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    ensure_admin(&user)?;
    let orders = order_service::list_all_orders(&state).await?;
    Ok(Json(orders))
}
