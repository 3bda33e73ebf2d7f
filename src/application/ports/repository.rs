//! Repository Port - 出站端口
//!
//! 定义实体持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{EntityMetadata, EntityRecord};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Entity Repository Port
///
/// 每个可管理的实体对应一个仓储实例
#[async_trait]
pub trait EntityRepositoryPort: Send + Sync {
    /// 实体元数据
    fn metadata(&self) -> &EntityMetadata;

    /// 分页查询，同时返回总数
    async fn find_and_count(
        &self,
        skip: u64,
        take: u64,
    ) -> Result<(Vec<EntityRecord>, u64), RepositoryError>;

    /// 根据主键查找，加载所有关联
    async fn find_one_with_relations(
        &self,
        primary_key: &Value,
    ) -> Result<Option<EntityRecord>, RepositoryError>;

    /// 保存实体
    ///
    /// 主键缺省或不存在时插入，否则更新；返回保存后的记录
    async fn save(&self, record: EntityRecord) -> Result<EntityRecord, RepositoryError>;

    /// 删除实体
    async fn remove(&self, primary_key: &Value) -> Result<(), RepositoryError>;
}
