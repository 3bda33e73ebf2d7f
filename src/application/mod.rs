//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（EntityRepository、TemplateRenderer）
//! - site: 站点 / 分区注册表与模型解析
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - views: 模板上下文
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod site;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use commands::{
    handlers::{CreateEntityHandler, DeleteEntityHandler, UpdateEntityHandler},
    CreateEntity, DeleteEntity, UpdateEntity,
};

pub use error::ApplicationError;

pub use ports::{EntityRepositoryPort, RenderError, RepositoryError, TemplateRendererPort};

pub use queries::{
    handlers::{AddFormHandler, ChangeFormHandler, ChangeListHandler, IndexHandler},
    GetAddForm, GetChangeForm, GetChangeList, ListSections,
};

pub use site::{AdminEntity, AdminModels, AdminSection, AdminSite, SiteError};
