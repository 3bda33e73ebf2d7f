//! Adminsite - 基于数据库表结构的管理站点
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 实体元数据、表单值清洗、分页、URL 构造
//!
//! 应用层 (application/):
//! - Site: 分区 / 实体注册表
//! - Ports: 端口定义（EntityRepository, TemplateRenderer）
//! - Commands: CQRS 命令处理器（新建、更新、删除）
//! - Queries: CQRS 查询处理器（首页、列表、表单）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 管理页面路由
//! - Persistence: SQLite 实体仓储与表结构内省
//! - Memory: 内存实体仓储
//! - Templates: Tera 模板渲染

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
