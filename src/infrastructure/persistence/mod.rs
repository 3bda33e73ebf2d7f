//! Persistence Layer - 数据持久化
//!
//! SQLite 实体仓储实现

pub mod sqlite;

pub use self::sqlite::SqliteEntityRepository;
