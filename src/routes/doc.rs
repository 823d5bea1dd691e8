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
        admin::{BrandList, CreateBrandRequest, DispatchOrderRequest, GrantCourierRequest, UserList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
        catalog::{CategoryList, ProductDetail, ProductList, SubcategoryList},
        courier::UpdateOrderStatusRequest,
        geocode::{AddressList, GeocodedAddress},
        orders::{CheckoutRequest, OrderItemRemoval, OrderList, OrderWithItems},
        wishlist::WishlistProductList,
    },
    models::{
        Brand, CartItem, Category, Order, OrderItem, PaymentProvider, Product, ProductSize, Role,
        Subcategory, User,
    },
    order_status::{OrderAction, OrderStatus},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, courier, geocode, health, orders, params, wishlist},
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
        auth::register,
        auth::login,
        catalog::list_products,
        catalog::get_product,
        catalog::list_categories,
        catalog::list_subcategories,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::delete_order,
        orders::remove_order_item,
        courier::available_orders,
        courier::my_orders,
        courier::accept_order,
        courier::update_status,
        courier::cancel_order,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::dispatch_order,
        admin::list_couriers,
        admin::grant_courier,
        admin::revoke_courier,
        admin::list_brands,
        admin::create_brand,
        admin::delete_brand,
        geocode::reverse_geocode,
        geocode::search_address
    ),
    components(
        schemas(
            User,
            Role,
            Category,
            Subcategory,
            Brand,
            Product,
            ProductSize,
            CartItem,
            Order,
            OrderItem,
            OrderStatus,
            OrderAction,
            PaymentProvider,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateCartItemRequest,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            DispatchOrderRequest,
            GrantCourierRequest,
            CreateBrandRequest,
            CartView,
            ProductList,
            ProductDetail,
            CategoryList,
            SubcategoryList,
            OrderList,
            OrderWithItems,
            OrderItemRemoval,
            WishlistProductList,
            UserList,
            BrandList,
            GeocodedAddress,
            AddressList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Catalog", description = "Products, categories and subcategories"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and customer order endpoints"),
        (name = "Courier", description = "Delivery workflow for couriers"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Geocoding", description = "Address lookup for checkout"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
