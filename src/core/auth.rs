//! API Key 认证中间件
//!
//! 从 `x-api-key` 或 `Authorization` header 读取共享密钥，
//! 支持裸密钥和 `Bearer <key>` 两种格式。

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{fmt, sync::Arc};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::error::AppError;

pub const MISSING_KEY_MESSAGE: &str =
    "API key is required. Please provide it in the x-api-key header or Authorization header.";
pub const INVALID_KEY_MESSAGE: &str = "Invalid API key provided.";

/// 共享密钥，`Debug` 输出时脱敏
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::from(key.into()))
    }

    /// 常量时间比较
    pub fn matches(&self, provided: &str) -> bool {
        let expected = self.0.as_bytes();
        let provided = provided.as_bytes();
        if expected.len() != provided.len() {
            return false;
        }
        expected.ct_eq(provided).into()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// 认证通过后写入请求 extensions 的标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated;

/// 提取请求携带的密钥；空的 `x-api-key` 视为未提供，继续读取 `Authorization`
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    fn non_empty(value: &HeaderValue) -> Option<&str> {
        value.to_str().ok().filter(|v| !v.is_empty())
    }
    let raw = headers
        .get("x-api-key")
        .and_then(non_empty)
        .or_else(|| headers.get("authorization").and_then(non_empty))?;

    Some(raw.strip_prefix("Bearer ").unwrap_or(raw))
}

/// 校验请求头中的密钥
pub fn authenticate(headers: &HeaderMap, api_key: &ApiKey) -> Result<Authenticated, AppError> {
    let key = presented_key(headers).ok_or_else(|| AppError::authentication(MISSING_KEY_MESSAGE))?;

    if !api_key.matches(key) {
        return Err(AppError::authentication(INVALID_KEY_MESSAGE));
    }

    Ok(Authenticated)
}

/// 认证中间件，只挂在写操作路由上
pub async fn require_api_key(
    State(api_key): State<ApiKey>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate(req.headers(), &api_key) {
        Ok(marker) => {
            debug!(method = %req.method(), uri = %req.uri(), "request authenticated");
            req.extensions_mut().insert(marker);
            Ok(next.run(req).await)
        }
        Err(err) => {
            warn!(method = %req.method(), uri = %req.uri(), "authentication failed: {}", err);
            Err(err)
        }
    }
}
