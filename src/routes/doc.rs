use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartEnvelope, CartView, UpdateCartItemRequest, UpdatedItem},
        orders::CheckoutResult,
        products::{CreateProductRequest, ProductEnvelope, ProductList, UpdateProductRequest},
    },
    entity::{carts::CartStatus, orders::OrderStatus},
    models::{
        Cart, CartItem, CartLine, CartProductSummary, Order, OrderItem, OrderProductSnapshot,
        Product,
    },
    response::{ApiResponse, Meta, NoData},
    routes::{admin, cart, health, orders, params, products as product_routes},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::add_to_cart,
        cart::get_cart,
        cart::update_quantity,
        cart::remove_item,
        cart::clear_cart,
        cart::checkout,
        orders::list_orders,
        admin::list_all_orders,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
    ),
    components(
        schemas(
            Product,
            Cart,
            CartItem,
            CartLine,
            CartProductSummary,
            CartStatus,
            Order,
            OrderItem,
            OrderProductSnapshot,
            OrderStatus,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartEnvelope,
            CartView,
            UpdatedItem,
            CheckoutResult,
            CreateProductRequest,
            UpdateProductRequest,
            ProductEnvelope,
            ProductList,
            params::Pagination,
            params::ProductQuery,
            Meta,
            NoData,
            health::HealthData,
            ApiResponse<CartEnvelope>,
            ApiResponse<UpdatedItem>,
            ApiResponse<CheckoutResult>,
            ApiResponse<ProductEnvelope>,
            ApiResponse<ProductList>,
            ApiResponse<NoData>,
            ApiResponse<health::HealthData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints, writes are admin only"),
        (name = "Cart", description = "Pending cart and checkout"),
        (name = "Orders", description = "Order history for the caller"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_cart_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/cart",
            "/api/cart/add",
            "/api/cart/update",
            "/api/cart/item/{id}",
            "/api/cart/removeall",
            "/api/cart/checkout",
            "/api/orders",
            "/api/admin/orders",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
