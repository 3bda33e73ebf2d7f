//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod entity_repo;
mod introspect;
mod site_loader;

pub use database::*;
pub use entity_repo::*;
pub use introspect::*;
pub use site_loader::*;
