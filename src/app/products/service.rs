//! 产品业务服务

use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    model::{
        DeletedProduct, NewProduct, Pagination, Product, ProductPage, ProductPatch, ProductQuery,
        ProductStats, SearchResults,
    },
    repository::ProductRepository,
};
use crate::core::error::AppError;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// 解析分页参数，缺失、非数字或小于 1 时使用默认值
fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// 依次应用关键字、分类、库存过滤，最后分页
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, AppError> {
        let mut filtered = self.repository.all().await?;

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            filtered.retain(|p| p.matches_text(&needle));
        }

        if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
            let category = category.to_lowercase();
            filtered.retain(|p| p.category.to_lowercase() == category);
        }

        if let Some(in_stock) = query.in_stock.as_deref() {
            let wanted = in_stock == "true";
            filtered.retain(|p| p.in_stock == wanted);
        }

        let page = positive_or(query.page.as_deref(), DEFAULT_PAGE);
        let limit = positive_or(query.limit.as_deref(), DEFAULT_LIMIT);
        let total = filtered.len();
        let start = page.saturating_sub(1).saturating_mul(limit);
        let end = start.saturating_add(limit);

        let products = filtered
            .into_iter()
            .skip(start)
            .take(limit)
            .collect::<Vec<_>>();

        debug!(page, limit, total, returned = products.len(), "listed products");

        Ok(ProductPage {
            products,
            pagination: Pagination {
                current_page: page,
                total_pages: total.div_ceil(limit),
                total_products: total,
                has_next: end < total,
                has_prev: page > 1,
            },
        })
    }

    pub async fn search(&self, q: Option<&str>) -> Result<SearchResults, AppError> {
        let query = q
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::validation("Search query parameter \"q\" is required"))?;

        let needle = query.to_lowercase();
        let results = self
            .repository
            .all()
            .await?
            .into_iter()
            .filter(|p| p.matches_text(&needle))
            .collect::<Vec<_>>();

        Ok(SearchResults {
            query: query.to_string(),
            count: results.len(),
            results,
        })
    }

    pub async fn stats(&self) -> Result<ProductStats, AppError> {
        let products = self.repository.all().await?;

        let in_stock_count = products.iter().filter(|p| p.in_stock).count();
        let mut categories = BTreeMap::new();
        for product in &products {
            *categories.entry(product.category.clone()).or_insert(0) += 1;
        }

        let average_price = if products.is_empty() {
            0.0
        } else {
            let total: f64 = products.iter().map(|p| p.price).sum();
            round_cents(total / products.len() as f64)
        };

        Ok(ProductStats {
            total_products: products.len(),
            in_stock_count,
            out_of_stock_count: products.len() - in_stock_count,
            categories,
            average_price,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Product, AppError> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))
    }

    pub async fn create(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let product = new_product.into_product(Uuid::new_v4().to_string());
        let product = self.repository.insert(product).await?;
        info!(id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Product, AppError> {
        let product = self
            .repository
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))?;
        info!(id = %product.id, "product updated");
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<DeletedProduct, AppError> {
        let product = self
            .repository
            .remove(id)
            .await?
            .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))?;
        info!(id = %product.id, "product deleted");
        Ok(DeletedProduct {
            message: "Product deleted successfully".to_string(),
            product,
        })
    }
}
