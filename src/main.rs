//! Adminsite - 管理站点服务
//!
//! 按配置内省 SQLite 表结构，为每个实体提供列表、新建、编辑和删除页面

use std::sync::Arc;

use adminsite::config::{load_config, print_config};
use adminsite::infrastructure::http::{AppState, HttpServer, ServerConfig};
use adminsite::infrastructure::persistence::sqlite::{create_pool, load_site, DatabaseConfig};
use adminsite::infrastructure::templates::TeraTemplateRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},adminsite={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Adminsite v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;

    // 按配置注册分区和实体
    let site = Arc::new(load_site(&pool, &config.admin).await?);
    if site.section_list().is_empty() {
        tracing::warn!("No admin sections configured");
    }

    let renderer = Arc::new(TeraTemplateRenderer::new(config.admin.templates_dir.as_deref())?);

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(site, renderer);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
