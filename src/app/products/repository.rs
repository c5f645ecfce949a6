//! 产品存储端口
//!
//! 处理器只依赖这个 trait，具体实现在 infrastructure 层。

use async_trait::async_trait;
use thiserror::Error;

use super::model::{Product, ProductPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按插入顺序返回全部产品
    async fn all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<Product>, StoreError>;

    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    /// 原子地合并更新；不存在时返回 `None`
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, StoreError>;

    async fn remove(&self, id: &str) -> Result<Option<Product>, StoreError>;
}
