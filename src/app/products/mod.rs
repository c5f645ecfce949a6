//! 产品 CRUD：模型、校验、存储端口、服务与处理器

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::core::auth::{require_api_key, ApiKey};
use handler::AppState;

/// 产品路由，写操作需要 API Key
pub fn router(api_key: ApiKey) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(api_key, require_api_key);

    Router::new()
        .route(
            "/products",
            get(handler::list_products)
                .merge(post(handler::create_product).route_layer(auth.clone())),
        )
        .route("/products/search", get(handler::search_products))
        .route("/products/stats", get(handler::product_stats))
        .route(
            "/products/:id",
            get(handler::get_product).merge(
                put(handler::update_product)
                    .merge(delete(handler::delete_product))
                    .route_layer(auth),
            ),
        )
}
