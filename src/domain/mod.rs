//! Domain Layer - 领域层
//!
//! - metadata: 实体元数据（列、主键、关联）
//! - cleaning: 表单值清洗
//! - pagination: 列表分页
//! - urls: 管理后台 URL

pub mod cleaning;
pub mod errors;
pub mod metadata;
pub mod pagination;
pub mod urls;

pub use cleaning::clean_values;
pub use errors::{CleanError, FieldError, PaginationError};
pub use metadata::{
    humanize, primary_key_string, ColumnMetadata, ColumnType, EntityMetadata, EntityRecord,
    RelationMetadata,
};
pub use pagination::{Pagination, RESULTS_PER_PAGE};
