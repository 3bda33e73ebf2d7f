//! In-Memory Entity Repository Implementation

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::application::ports::{EntityRepositoryPort, RepositoryError};
use crate::domain::{primary_key_string, EntityMetadata, EntityRecord};

/// 内存实体仓储
///
/// 记录按主键排序返回；自增主键由内部序列生成
pub struct InMemoryEntityRepository {
    metadata: EntityMetadata,
    records: DashMap<String, EntityRecord>,
    sequence: AtomicI64,
}

impl InMemoryEntityRepository {
    pub fn new(metadata: EntityMetadata) -> Self {
        Self {
            metadata,
            records: DashMap::new(),
            sequence: AtomicI64::new(0),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_key(&self, record: &EntityRecord) -> Result<Value, RepositoryError> {
        if let Some(key) = self.metadata.primary_key_of(record) {
            if let Some(id) = key.as_i64() {
                self.sequence.fetch_max(id, AtomicOrdering::SeqCst);
            }
            return Ok(key.clone());
        }

        match self.metadata.primary_column() {
            Some(column) if column.generated => {
                let id = self.sequence.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                Ok(Value::from(id))
            }
            Some(column) => Err(RepositoryError::Constraint(format!(
                "{}.{} is required",
                self.metadata.table_name, column.name
            ))),
            None => Err(RepositoryError::InvalidSchema(format!(
                "{} has no primary key",
                self.metadata.table_name
            ))),
        }
    }
}

fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => primary_key_string(a).cmp(&primary_key_string(b)),
    }
}

#[async_trait]
impl EntityRepositoryPort for InMemoryEntityRepository {
    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    async fn find_and_count(
        &self,
        skip: u64,
        take: u64,
    ) -> Result<(Vec<EntityRecord>, u64), RepositoryError> {
        let mut records: Vec<EntityRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        let count = records.len() as u64;

        records.sort_by(|a, b| {
            match (self.metadata.primary_key_of(a), self.metadata.primary_key_of(b)) {
                (Some(x), Some(y)) => compare_keys(x, y),
                _ => Ordering::Equal,
            }
        });

        let page = records
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .collect();

        Ok((page, count))
    }

    async fn find_one_with_relations(
        &self,
        primary_key: &Value,
    ) -> Result<Option<EntityRecord>, RepositoryError> {
        Ok(self
            .records
            .get(&primary_key_string(primary_key))
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, mut record: EntityRecord) -> Result<EntityRecord, RepositoryError> {
        let key = self.next_key(&record)?;
        let id = primary_key_string(&key);

        if let Some(column) = self.metadata.primary_column() {
            record.insert(column.name.clone(), key);
        }

        // 只保留列，丢弃关联对象
        record.retain(|name, _| self.metadata.column(name).is_some());

        let saved = match self.records.entry(id.clone()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().extend(record);
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                record
            }
        };

        tracing::debug!(entity = %self.metadata.name, id = %id, "Entity saved");
        Ok(saved)
    }

    async fn remove(&self, primary_key: &Value) -> Result<(), RepositoryError> {
        let id = primary_key_string(primary_key);
        self.records.remove(&id);
        tracing::debug!(entity = %self.metadata.name, id = %id, "Entity removed");
        Ok(())
    }
}
