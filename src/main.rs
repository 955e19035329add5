use std::sync::Arc;
use thrift_vendor_console::{create_client, router, AppConfig, AppState, HttpStoreBackend};
use tracing::info;
use std::time::Duration;
use tracing_subscriber::fmt::time::ChronoLocal;

const DRAFT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置 (日志级别来自配置，先于日志初始化)
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_max_level(config.log.level_filter())
        .with_target(true)
        .with_level(true)
        .init();

    info!("Starting server with config: {:?}", config);

    // 创建上游客户端
    let client = create_client(config.backend.timeout())?;
    let backend = Arc::new(HttpStoreBackend::new(client, &config.backend.base_url)?);
    info!("Store backend: {}", config.backend.base_url);

    let state = AppState::with_inventory(backend, &config.inventory);

    // 定期清理过期草稿
    let stock = state.stock.clone();
    let ttl = config.inventory.draft_ttl();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DRAFT_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            stock.drafts().evict_older_than(ttl);
        }
    });

    let app = router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/vendors/:vendor_id/categories/tree  - 分类树");
    info!("  POST /api/allocations/preview                  - 费用分摊预览");
    info!("  POST /api/batches                              - 新建入库/出库草稿");
    info!("  POST /api/batches/:batch_number/submit         - 提交批次");
    info!("  GET  /api/vendors/:vendor_id/stock-levels      - 库存水位");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
