//! 核心中间件模块

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::{net::SocketAddr, time::Instant};
use tracing::{error, info};

use super::error::{AppError, ErrorReport};

/// 错误处理策略
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    /// 是否在错误信封中返回 stack（仅开发环境）
    pub expose_stack: bool,
}

/// 请求日志中间件
///
/// 进入时记录请求行，响应返回后记录状态码与耗时。
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let timestamp = chrono::Utc::now().to_rfc3339();
    let method = req.method().clone();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!(
        "[{}] {} {} - IP: {} - User-Agent: {}",
        timestamp, method, path, ip, user_agent
    );

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    info!(
        "[{}] {} {} - {} - {}ms",
        timestamp,
        method,
        path,
        status.as_u16(),
        duration.as_millis()
    );

    response
}

/// 集中错误处理中间件
///
/// 取出 `AppError` 附带的 `ErrorReport`，记录完整诊断信息后统一渲染错误信封。
/// 路由层产生的 405 没有报告，按未匹配路由处理；其他无报告的错误响应按状态码生成信封。
pub async fn error_handling_middleware(
    State(policy): State<ErrorPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut response = next.run(req).await;

    let report = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => report,
        None if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            AppError::route_not_found(&uri).report()
        }
        None if response.status().is_client_error() || response.status().is_server_error() => {
            ErrorReport::from_status(response.status())
        }
        None => return response,
    };

    error!(
        message = %report.message,
        stack = %report.stack,
        url = %uri,
        method = %method,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        "Error occurred"
    );

    (report.status, Json(report.envelope(policy.expose_stack))).into_response()
}
