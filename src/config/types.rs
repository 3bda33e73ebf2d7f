//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::RESULTS_PER_PAGE;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 管理站点配置
    #[serde(default)]
    pub admin: AdminConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/admin.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 管理站点配置
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// 页面标题
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// 列表页默认每页条数
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,

    /// 自定义模板目录，同名模板覆盖内置模板
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// 分区列表（按顺序展示）
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

fn default_site_title() -> String {
    "Administration".to_string()
}

fn default_results_per_page() -> u32 {
    RESULTS_PER_PAGE
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            site_title: default_site_title(),
            results_per_page: default_results_per_page(),
            templates_dir: None,
            sections: Vec::new(),
        }
    }
}

/// 分区配置
#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    pub name: String,

    /// 覆盖站点默认的每页条数
    #[serde(default)]
    pub results_per_page: Option<u32>,

    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

/// 实体配置：实体名 -> 数据表
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub table: String,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
