use product_api::{
    app::products::{handler::AppState, service::ProductService},
    core::{auth::ApiKey, middleware::ErrorPolicy},
    infrastructure::{
        config::{load_config, RunMode},
        logger::Logger,
        memory_store::InMemoryProductStore,
    },
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 可选参数：配置文件路径
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    Logger::init(&config.logging);

    info!("启动 Product API 服务器...");
    if config.uses_default_api_key() {
        warn!("⚠️ 正在使用开发用默认 API Key，生产环境请通过 API_KEY 环境变量设置");
    }

    let store = InMemoryProductStore::with_seed_data();
    info!("✅ 已初始化 {} 个示例产品", store.len());

    let state = AppState {
        product_service: ProductService::new(Arc::new(store)),
    };
    let policy = ErrorPolicy {
        expose_stack: config.environment == RunMode::Development,
    };
    let app = product_api::app(state, ApiKey::new(config.auth.api_key.clone()), policy);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 Product API 服务器运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    /                      - 欢迎信息");
    info!("   GET    /api/products          - 产品列表 (search, category, inStock, page, limit)");
    info!("   GET    /api/products/search   - 按关键字搜索 (q)");
    info!("   GET    /api/products/stats    - 产品统计");
    info!("   GET    /api/products/:id      - 获取特定产品");
    info!("   POST   /api/products          - 创建产品 (需要 API Key)");
    info!("   PUT    /api/products/:id      - 更新产品 (需要 API Key)");
    info!("   DELETE /api/products/:id      - 删除产品 (需要 API Key)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl-C 信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止服务器...");
}
