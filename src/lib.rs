//! # Product API
//!
//! 基于 Axum 的产品目录服务，提供内存存储上的 CRUD、搜索与统计：
//! - 请求日志中间件
//! - 写操作的 API Key 认证
//! - 请求体字段校验
//! - 集中错误处理与统一错误信封

pub mod app;
pub mod core;
pub mod infrastructure;

use axum::{extract::OriginalUri, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    app::products::{self, handler::AppState},
    core::{
        auth::ApiKey,
        capture::failure_capture_layer,
        error::AppError,
        middleware::{error_handling_middleware, request_logging_middleware, ErrorPolicy},
    },
};

async fn route_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::route_not_found(&uri)
}

/// 组装完整路由与中间件
///
/// 中间件由内到外：失败捕获 → 错误处理 → 请求日志 → trace。
pub fn app(state: AppState, api_key: ApiKey, policy: ErrorPolicy) -> Router {
    Router::new()
        .route("/", get(app::products::handler::welcome))
        .nest("/api", products::router(api_key))
        .fallback(route_not_found)
        .layer(failure_capture_layer())
        .layer(middleware::from_fn_with_state(policy, error_handling_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
