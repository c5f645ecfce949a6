//! 产品处理器

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::{
    model::{
        DeletedProduct, NewProduct, Product, ProductPage, ProductPatch, ProductQuery, ProductStats,
        SearchQuery, SearchResults,
    },
    service::ProductService,
};
use crate::core::{error::AppError, extract::Validated};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

pub async fn welcome() -> &'static str {
    "Welcome to the Product API! Go to /api/products to see all products."
}

pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ProductPage>, AppError> {
    let Query(query) = query?;
    let page = state.product_service.list(&query).await?;
    Ok(Json(page))
}

pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>, AppError> {
    let Query(query) = query?;
    let results = state.product_service.search(query.q.as_deref()).await?;
    Ok(Json(results))
}

pub async fn product_stats(
    State(state): State<AppState>,
) -> Result<Json<ProductStats>, AppError> {
    let stats = state.product_service.stats().await?;
    Ok(Json(stats))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = state.product_service.get(&id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Validated(payload): Validated<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.product_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(patch): Validated<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    let product = state.product_service.update(&id, patch).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedProduct>, AppError> {
    let deleted = state.product_service.delete(&id).await?;
    Ok(Json(deleted))
}
