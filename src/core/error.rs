//! 核心错误处理模块

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::app::products::repository::StoreError;

/// 500 错误对客户端展示的固定信息
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// 应用错误类型
///
/// 所有请求级失败都通过它传递到错误处理中间件。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    /// 请求体无法解析为 JSON 对象
    #[error("{0}")]
    MalformedBody(String),

    /// 信息只写入日志，不返回给客户端
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 未匹配路由
    pub fn route_not_found(uri: &Uri) -> Self {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        Self::NotFound(format!("Route {} not found", path))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFoundError",
            Self::Validation(_) => "ValidationError",
            Self::Authentication(_) => "AuthenticationError",
            Self::MalformedBody(_) => "MalformedBodyError",
            Self::Internal(_) => "InternalError",
        }
    }

    /// 客户端可见的错误信息
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// 生成交给错误处理中间件的诊断报告
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            status: self.status_code(),
            message: self.to_string(),
            client_message: self.client_message(),
            stack: format!("{}: {}\n    {:?}", self.kind(), self, self),
        }
    }
}

/// 错误诊断报告
///
/// 由 `AppError::into_response` 放入响应 extensions，
/// `error_handling_middleware` 取出后记录日志并重新渲染错误信封。
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    /// 完整的原始信息（仅用于日志）
    pub message: String,
    pub client_message: String,
    pub stack: String,
}

impl ErrorReport {
    /// 没有携带 `AppError` 的错误响应（框架层拒绝）
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Request failed").to_string();
        Self {
            status,
            message: reason.clone(),
            client_message: if status.is_server_error() {
                INTERNAL_MESSAGE.to_string()
            } else {
                reason.clone()
            },
            stack: format!("HttpError: {}", reason),
        }
    }

    pub fn envelope(&self, include_stack: bool) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                message: self.client_message.clone(),
                stack: include_stack.then(|| self.stack.clone()),
            },
        }
    }
}

/// 错误响应信封 `{ success: false, error: { message, stack? } }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = self.report();
        let mut response = (report.status, Json(report.envelope(false))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Self::MalformedBody(
                "Request body must be JSON (Content-Type: application/json)".to_string(),
            ),
            _ => Self::MalformedBody("Invalid JSON format in request body".to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
