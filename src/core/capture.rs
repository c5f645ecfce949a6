//! 处理器失败捕获
//!
//! 处理器统一返回 `Result<_, AppError>`，错误经 `?` 进入错误处理中间件；
//! 处理器 panic 时由这里转换为 `AppError::Internal`，不会直接断开连接。

use axum::response::{IntoResponse, Response};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

use super::error::AppError;

pub type PanicResponder = fn(Box<dyn Any + Send + 'static>) -> Response;

fn panic_to_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(format!("handler panicked: {}", detail)).into_response()
}

/// 必须位于错误处理中间件内侧
pub fn failure_capture_layer() -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(panic_to_error as PanicResponder)
}
