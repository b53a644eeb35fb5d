use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductEnvelope, ProductList, UpdateProductRequest},
    error::AppResult,
    middleware::{
        auth::{AuthUser, ensure_admin},
        extract::{AppJson, AppPath, AppQuery},
    },
    response::{ApiResponse, NoData},
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("q" = Option<String>, Query, description = "Search name and description"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("brand" = Option<String>, Query, description = "Filter by brand"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let (list, meta) = product_service::list_products(&state, query).await?;
    Ok(Json(ApiResponse::success("Products", list, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductEnvelope>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<ProductEnvelope>>> {
    let product = product_service::get_product(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Product",
        ProductEnvelope { product },
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductEnvelope>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductEnvelope>>)> {
    ensure_admin(&user)?;
    let product = product_service::create_product(&state, user.user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Product created successfully",
            ProductEnvelope { product },
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductEnvelope>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductEnvelope>>> {
    ensure_admin(&user)?;
    let product = product_service::update_product(&state, user.user_id, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Product updated successfully",
        ProductEnvelope { product },
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<NoData>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<NoData>>> {
    ensure_admin(&user)?;
    product_service::delete_product(&state, user.user_id, id).await?;
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}
