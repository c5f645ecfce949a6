//! 请求体校验提取器

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

use super::error::AppError;

/// 从原始 JSON 对象校验并构造类型化的请求体
pub trait Validate: Sized {
    fn validate(body: &Map<String, Value>) -> Result<Self, AppError>;
}

/// 通过校验的请求体
///
/// 作为处理器的最后一个参数，在认证中间件之后执行。
#[derive(Debug)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;

        match body {
            Value::Object(map) => T::validate(&map).map(Validated),
            _ => Err(AppError::MalformedBody(
                "Invalid JSON format in request body".to_string(),
            )),
        }
    }
}
