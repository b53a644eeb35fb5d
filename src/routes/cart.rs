use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::{AddToCartRequest, CartEnvelope, CartView, UpdateCartItemRequest, UpdatedItem},
        orders::CheckoutResult,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppPath},
    },
    response::{ApiResponse, NoData},
    services::{cart_service, checkout_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update", put(update_quantity))
        .route("/item/{id}", delete(remove_item))
        .route("/removeall", delete(clear_cart))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product to the pending cart", body = ApiResponse<CartEnvelope>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartEnvelope>>> {
    let cart = cart_service::add_item(&state, user.user_id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Added to cart",
        CartEnvelope { cart },
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Pending cart with live prices and total", body = CartView),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<CartView>> {
    let view = cart_service::get_cart(&state, user.user_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/api/cart/update",
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Overwrite a line's quantity", body = ApiResponse<UpdatedItem>),
        (status = 400, description = "Invalid quantity"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart or cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<UpdatedItem>>> {
    let updated_item = cart_service::update_item_quantity(&state, user.user_id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Quantity updated successfully",
        UpdatedItem { updated_item },
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart/item/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<NoData>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart item not found or not in your cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<NoData>>> {
    cart_service::remove_item(&state, user.user_id, id).await?;
    Ok(Json(ApiResponse::message(format!("CartItem id {id} removed"))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/removeall",
    responses(
        (status = 200, description = "All lines removed", body = ApiResponse<NoData>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No pending cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NoData>>> {
    cart_service::clear_cart(&state, user.user_id).await?;
    Ok(Json(ApiResponse::message("All items removed from cart")))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    responses(
        (status = 200, description = "Order created from the pending cart", body = ApiResponse<CheckoutResult>),
        (status = 400, description = "Cart empty or insufficient stock"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CheckoutResult>>> {
    let order_id = checkout_service::checkout(&state, user.user_id).await?;
    Ok(Json(ApiResponse::success(
        "Checkout success",
        CheckoutResult { order_id },
        None,
    )))
}
