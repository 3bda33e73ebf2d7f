//! Memory Layer - In-Memory Repositories
//!
//! 基于内存的实体仓储，不加载关联
//!
//! 用作应用层测试的替身，也可在不接数据库时嵌入站点

mod entity_repo;

pub use entity_repo::InMemoryEntityRepository;
