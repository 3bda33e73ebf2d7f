//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：新建、更新、删除实体

mod entity_commands;

pub mod handlers;

pub use entity_commands::*;
