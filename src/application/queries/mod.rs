//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：渲染首页、列表页、新建表单和编辑表单

mod admin_queries;

pub mod handlers;

pub use admin_queries::*;
