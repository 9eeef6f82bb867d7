use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiDocument,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        account::{AccountProfile, DeactivationSummary},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{
            AddToCartRequest, CartAction, CartItemDto, CartList, CartQuantityUpdate,
            UpdateCartRequest,
        },
        dashboard::{TopProduct, VendorDashboard},
        favorites::{FavoriteIds, FavoriteList, FavoriteToggle, FavoriteWithProduct, ToggleFavoriteRequest},
        orders::{OrderList, OrderWithItems},
        products::{ImportSummary, ProductPage, ProductRequest, ProductUploadForm},
    },
    models::{CartItem, Favorite, Order, OrderItem, Product, ProductStatus, Role, User},
    response::{ApiResponse, Meta},
    routes::{account, auth, cart, favorites, health, orders, params, products, vendor},
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
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::reactivate_product,
        products::upload_products,
        products::download_template,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        favorites::toggle_favorite,
        favorites::list_favorite_ids,
        favorites::list_favorites,
        favorites::remove_favorite,
        account::get_account,
        account::deactivate_account,
        account::delete_account,
        vendor::dashboard
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            ProductStatus,
            Favorite,
            CartItem,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ProductRequest,
            ProductPage,
            ProductUploadForm,
            ImportSummary,
            AddToCartRequest,
            UpdateCartRequest,
            CartAction,
            CartList,
            CartItemDto,
            CartQuantityUpdate,
            OrderList,
            OrderWithItems,
            ToggleFavoriteRequest,
            FavoriteToggle,
            FavoriteIds,
            FavoriteList,
            FavoriteWithProduct,
            AccountProfile,
            DeactivationSummary,
            VendorDashboard,
            TopProduct,
            params::Pagination,
            params::CatalogQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductPage>,
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
        (name = "Auth", description = "Registration and login"),
        (name = "Products", description = "Catalog and seller product management"),
        (name = "Cart", description = "Customer cart"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Favorites", description = "Customer favorites"),
        (name = "Account", description = "Account profile, deactivation and deletion"),
        (name = "Vendor", description = "Seller dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiDocument> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
