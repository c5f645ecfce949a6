//! 内存产品存储
//!
//! 单把互斥锁保护整个序列，每次读-改-写都在一次加锁内完成。

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::app::products::{
    model::{Product, ProductPatch},
    repository::{ProductRepository, StoreError},
};

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    /// 预置的三条示例产品
    pub fn with_seed_data() -> Self {
        Self::with_products(seed_products())
    }

    pub fn len(&self) -> usize {
        self.products.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.lock().is_empty()
    }
}

pub fn seed_products() -> Vec<Product> {
    let product = |id: &str, name: &str, description: &str, price: f64, category: &str, in_stock: bool| {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            category: category.to_string(),
            in_stock,
        }
    };

    vec![
        product(
            "1",
            "Laptop",
            "High-performance laptop with 16GB RAM",
            1200.0,
            "electronics",
            true,
        ),
        product(
            "2",
            "Smartphone",
            "Latest model with 128GB storage",
            800.0,
            "electronics",
            true,
        ),
        product(
            "3",
            "Coffee Maker",
            "Programmable coffee maker with timer",
            50.0,
            "kitchen",
            false,
        ),
    ]
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.lock().clone())
    }

    async fn find(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        self.products.lock().push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.lock();
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply(patch);
            product.clone()
        }))
    }

    async fn remove(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.lock();
        let index = products.iter().position(|p| p.id == id);
        Ok(index.map(|index| products.remove(index)))
    }
}
