//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ADMINSITE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `ADMINSITE_SERVER__PORT=8080`
/// - `ADMINSITE_DATABASE__PATH=/data/app.db`
/// - `ADMINSITE_ADMIN__RESULTS_PER_PAGE=50`
///
/// 分区与实体只能通过配置文件声明
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.path", "data/admin.db")?
        .set_default("database.max_connections", 5)?
        .set_default("admin.site_title", "Administration")?
        .set_default("admin.results_per_page", 25)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    builder = builder.add_source(
        Environment::with_prefix("ADMINSITE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 分区名和实体名会出现在 URL 中
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.admin.results_per_page == 0 {
        return Err(ConfigError::ValidationError(
            "Results per page must be greater than 0".to_string(),
        ));
    }

    let mut section_names = HashSet::new();
    for section in &config.admin.sections {
        if !is_valid_name(&section.name) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid section name: {:?}",
                section.name
            )));
        }
        if !section_names.insert(section.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Duplicate section: {}",
                section.name
            )));
        }
        if section.results_per_page == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "Section {}: results per page must be greater than 0",
                section.name
            )));
        }

        let mut entity_names = HashSet::new();
        for entity in &section.entities {
            if !is_valid_name(&entity.name) || entity.table.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Section {}: invalid entity {:?} (table {:?})",
                    section.name, entity.name, entity.table
                )));
            }
            if !entity_names.insert(entity.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Section {}: duplicate entity {}",
                    section.name, entity.name
                )));
            }
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Site Title: {}", config.admin.site_title);
    tracing::info!("Results Per Page: {}", config.admin.results_per_page);
    if let Some(dir) = &config.admin.templates_dir {
        tracing::info!("Templates Directory: {:?}", dir);
    }
    for section in &config.admin.sections {
        let entities: Vec<&str> = section.entities.iter().map(|e| e.name.as_str()).collect();
        tracing::info!("Section {}: {}", section.name, entities.join(", "));
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
