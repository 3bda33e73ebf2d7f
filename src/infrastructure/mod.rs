//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod http;
pub mod memory;
pub mod persistence;
pub mod templates;

pub use memory::InMemoryEntityRepository;
pub use persistence::SqliteEntityRepository;
pub use templates::TeraTemplateRenderer;
