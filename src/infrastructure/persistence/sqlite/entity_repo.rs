//! SQLite Entity Repository
//!
//! 基于实体元数据动态生成 SQL；标识符经过校验并加引号，值全部以参数绑定

use async_trait::async_trait;
use serde_json::Value;
use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use super::introspect::{introspect_entity, quote_identifier};
use super::DbPool;
use crate::application::ports::{EntityRepositoryPort, RepositoryError};
use crate::domain::{ColumnType, EntityMetadata, EntityRecord};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// SQLite Entity Repository
pub struct SqliteEntityRepository {
    pool: DbPool,
    metadata: EntityMetadata,
    table: String,
    primary_column: String,
    select_list: String,
}

impl SqliteEntityRepository {
    /// 使用已有元数据创建仓储
    pub fn new(pool: DbPool, metadata: EntityMetadata) -> Result<Self, RepositoryError> {
        let table = quote_identifier(&metadata.table_name)?;
        let primary_column = metadata
            .primary_column()
            .map(|c| quote_identifier(&c.name))
            .transpose()?
            .ok_or_else(|| {
                RepositoryError::InvalidSchema(format!(
                    "{} has no primary key",
                    metadata.table_name
                ))
            })?;
        let select_list = metadata
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        Ok(Self {
            pool,
            metadata,
            table,
            primary_column,
            select_list,
        })
    }

    /// 从表结构推导元数据并创建仓储
    pub async fn introspect(
        pool: DbPool,
        entity_name: &str,
        table: &str,
    ) -> Result<Self, RepositoryError> {
        let metadata = introspect_entity(&pool, entity_name, table).await?;
        Self::new(pool, metadata)
    }

    async fn exists(&self, primary_key: &Value) -> Result<bool, RepositoryError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            self.table, self.primary_column
        );
        let count: i64 = bind_value(sqlx::query(&sql), primary_key)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
            .try_get(0)
            .map_err(map_db_error)?;
        Ok(count > 0)
    }

    async fn insert(&self, record: &EntityRecord) -> Result<Value, RepositoryError> {
        let assigned: Vec<(&str, &Value)> = self
            .metadata
            .columns
            .iter()
            .filter(|c| c.primary || c.is_editable())
            .filter_map(|c| record.get(&c.name).map(|v| (c.name.as_str(), v)))
            .collect();

        let sql = if assigned.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.table)
        } else {
            let columns = assigned
                .iter()
                .map(|(name, _)| quote_identifier(name))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            let placeholders = vec!["?"; assigned.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table, columns, placeholders
            )
        };

        let mut query = sqlx::query(&sql);
        for (_, value) in &assigned {
            query = bind_value(query, value);
        }
        let result = query.execute(&self.pool).await.map_err(map_db_error)?;

        Ok(match self.metadata.primary_key_of(record) {
            Some(key) => key.clone(),
            None => Value::from(result.last_insert_rowid()),
        })
    }

    async fn update(&self, primary_key: &Value, record: &EntityRecord) -> Result<(), RepositoryError> {
        let assigned: Vec<(&str, &Value)> = self
            .metadata
            .columns
            .iter()
            // 二进制列读出时是展示文本，不能写回
            .filter(|c| !c.primary && c.is_editable())
            .filter_map(|c| record.get(&c.name).map(|v| (c.name.as_str(), v)))
            .collect();

        if assigned.is_empty() {
            return Ok(());
        }

        let assignments = assigned
            .iter()
            .map(|(name, _)| quote_identifier(name).map(|q| format!("{} = ?", q)))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table, assignments, self.primary_column
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in &assigned {
            query = bind_value(query, value);
        }
        query = bind_value(query, primary_key);
        query.execute(&self.pool).await.map_err(map_db_error)?;

        Ok(())
    }

    /// 解码本实体的行，布尔列按元数据转换
    fn decode_record(&self, row: &SqliteRow) -> Result<EntityRecord, RepositoryError> {
        let mut record = decode_row(row)?;
        for column in &self.metadata.columns {
            if column.column_type != ColumnType::Boolean {
                continue;
            }
            if let Some(value) = record.get_mut(&column.name) {
                if let Some(n) = value.as_i64() {
                    *value = Value::Bool(n != 0);
                }
            }
        }
        Ok(record)
    }

    async fn load_relations(&self, record: &mut EntityRecord) -> Result<(), RepositoryError> {
        for relation in &self.metadata.relations {
            let join_value = record
                .get(&relation.join_column)
                .cloned()
                .unwrap_or(Value::Null);

            let related = if join_value.is_null() {
                Value::Null
            } else {
                let sql = format!(
                    "SELECT * FROM {} WHERE {} = ? LIMIT 1",
                    quote_identifier(&relation.target_table)?,
                    quote_identifier(&relation.target_column)?
                );
                let row = bind_value(sqlx::query(&sql), &join_value)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_db_error)?;
                match row {
                    Some(row) => Value::Object(decode_row(&row)?),
                    None => Value::Null,
                }
            };

            record.insert(relation.property_name.clone(), related);
        }
        Ok(())
    }
}

#[async_trait]
impl EntityRepositoryPort for SqliteEntityRepository {
    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    async fn find_and_count(
        &self,
        skip: u64,
        take: u64,
    ) -> Result<(Vec<EntityRecord>, u64), RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            self.select_list, self.table, self.primary_column
        );
        let rows = sqlx::query(&sql)
            .bind(take as i64)
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let records = rows
            .iter()
            .map(|row| self.decode_record(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((records, count.max(0) as u64))
    }

    async fn find_one_with_relations(
        &self,
        primary_key: &Value,
    ) -> Result<Option<EntityRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.select_list, self.table, self.primary_column
        );
        let row = bind_value(sqlx::query(&sql), primary_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut record = self.decode_record(&row)?;
        self.load_relations(&mut record).await?;
        Ok(Some(record))
    }

    async fn save(&self, record: EntityRecord) -> Result<EntityRecord, RepositoryError> {
        let existing_key = match self.metadata.primary_key_of(&record) {
            Some(key) if self.exists(key).await? => Some(key.clone()),
            Some(_) => None,
            None => {
                let generated = self
                    .metadata
                    .primary_column()
                    .map(|c| c.generated)
                    .unwrap_or(false);
                if !generated {
                    return Err(RepositoryError::Constraint(format!(
                        "{}: primary key is required",
                        self.metadata.table_name
                    )));
                }
                None
            }
        };

        let key = match existing_key {
            Some(key) => {
                self.update(&key, &record).await?;
                tracing::debug!(table = %self.metadata.table_name, key = %key, "Row updated");
                key
            }
            None => {
                let key = self.insert(&record).await?;
                tracing::debug!(table = %self.metadata.table_name, key = %key, "Row inserted");
                key
            }
        };

        self.find_one_with_relations(&key)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))
    }

    async fn remove(&self, primary_key: &Value) -> Result<(), RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            self.table, self.primary_column
        );
        bind_value(sqlx::query(&sql), primary_key)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        tracing::debug!(table = %self.metadata.table_name, key = %primary_key, "Row deleted");
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// 按存储的实际类型解码整行
fn decode_row(row: &SqliteRow) -> Result<EntityRecord, RepositoryError> {
    let mut record = EntityRecord::new();
    for column in row.columns() {
        let value = decode_value(row, column.ordinal()).map_err(map_db_error)?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => serde_json::Number::from_f64(row.try_get::<f64, _>(index)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Value::String(format!("<{} bytes>", bytes.len()))
        }
        _ => Value::String(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

fn map_db_error(err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        let message = db_err.message().to_string();
        match db_err.kind() {
            ErrorKind::UniqueViolation => return RepositoryError::Duplicate(message),
            ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => return RepositoryError::Constraint(message),
            _ => {}
        }
    }
    RepositoryError::DatabaseError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, DatabaseConfig};
    use serde_json::json;

    async fn pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        for sql in [
            "CREATE TABLE authors (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
            r#"CREATE TABLE posts (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                published BOOLEAN NOT NULL DEFAULT 0,
                rating REAL,
                created_at DATETIME,
                author_id INTEGER REFERENCES authors(id)
            )"#,
            "CREATE TABLE tags (code TEXT PRIMARY KEY, label TEXT)",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        pool
    }

    fn record(value: Value) -> EntityRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_find_and_relations() {
        let pool = pool().await;
        let authors = SqliteEntityRepository::introspect(pool.clone(), "author", "authors")
            .await
            .unwrap();
        let posts = SqliteEntityRepository::introspect(pool.clone(), "post", "posts")
            .await
            .unwrap();

        let ada = authors.save(record(json!({"name": "Ada"}))).await.unwrap();
        assert_eq!(ada["id"], json!(1));

        let post = posts
            .save(record(json!({
                "title": "Engines",
                "published": true,
                "rating": 4.5,
                "created_at": "2024-01-02 03:04:05",
                "author_id": 1
            })))
            .await
            .unwrap();

        assert_eq!(post["id"], json!(1));
        assert_eq!(post["published"], json!(true));
        assert_eq!(post["rating"], json!(4.5));
        assert_eq!(post["created_at"], json!("2024-01-02 03:04:05"));
        assert_eq!(post["author"]["name"], json!("Ada"));

        let missing = posts.find_one_with_relations(&json!(99)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_and_count_pages() {
        let pool = pool().await;
        let posts = SqliteEntityRepository::introspect(pool, "post", "posts")
            .await
            .unwrap();

        for i in 1..=30 {
            posts
                .save(record(json!({"title": format!("Post {}", i)})))
                .await
                .unwrap();
        }

        let (page, count) = posts.find_and_count(25, 25).await.unwrap();
        assert_eq!(count, 30);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0]["id"], json!(26));
        assert_eq!(page[0]["published"], json!(false));
        assert!(!page[0].contains_key("author"));
    }

    #[tokio::test]
    async fn test_save_updates_existing_row() {
        let pool = pool().await;
        let posts = SqliteEntityRepository::introspect(pool, "post", "posts")
            .await
            .unwrap();

        let created = posts
            .save(record(json!({"title": "Draft", "rating": 1.0})))
            .await
            .unwrap();

        let mut changed = created.clone();
        changed.insert("title".to_string(), json!("Final"));
        changed.insert("rating".to_string(), Value::Null);
        let updated = posts.save(changed).await.unwrap();

        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["title"], json!("Final"));
        assert_eq!(updated["rating"], Value::Null);

        let (_, count) = posts.find_and_count(0, 25).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_text_primary_key() {
        let pool = pool().await;
        let tags = SqliteEntityRepository::introspect(pool, "tag", "tags")
            .await
            .unwrap();

        assert!(matches!(
            tags.save(record(json!({"label": "no key"}))).await,
            Err(RepositoryError::Constraint(_))
        ));

        tags.save(record(json!({"code": "rust", "label": "Rust"})))
            .await
            .unwrap();
        let updated = tags
            .save(record(json!({"code": "rust", "label": "Rust lang"})))
            .await
            .unwrap();
        assert_eq!(updated["label"], json!("Rust lang"));

        tags.remove(&json!("rust")).await.unwrap();
        assert!(tags.find_one_with_relations(&json!("rust")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_keeps_blob_columns() {
        let pool = pool().await;
        sqlx::query("CREATE TABLE files (id INTEGER PRIMARY KEY, name TEXT, data BLOB)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO files (name, data) VALUES ('a.bin', x'DEADBEEF')")
            .execute(&pool)
            .await
            .unwrap();
        let files = SqliteEntityRepository::introspect(pool.clone(), "file", "files")
            .await
            .unwrap();

        let mut stored = files.find_one_with_relations(&json!(1)).await.unwrap().unwrap();
        assert_eq!(stored["data"], json!("<4 bytes>"));

        stored.insert("name".to_string(), json!("renamed.bin"));
        let updated = files.save(stored).await.unwrap();
        assert_eq!(updated["name"], json!("renamed.bin"));

        let (kind, hex): (String, String) =
            sqlx::query_as("SELECT typeof(data), hex(data) FROM files WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(kind, "blob");
        assert_eq!(hex, "DEADBEEF");
    }

    #[tokio::test]
    async fn test_constraint_errors() {
        let pool = pool().await;
        let authors = SqliteEntityRepository::introspect(pool.clone(), "author", "authors")
            .await
            .unwrap();
        let posts = SqliteEntityRepository::introspect(pool, "post", "posts")
            .await
            .unwrap();

        authors.save(record(json!({"name": "Ada"}))).await.unwrap();
        assert!(matches!(
            authors.save(record(json!({"name": "Ada"}))).await,
            Err(RepositoryError::Duplicate(_))
        ));

        posts
            .save(record(json!({"title": "T", "author_id": 1})))
            .await
            .unwrap();
        assert!(matches!(
            authors.remove(&json!(1)).await,
            Err(RepositoryError::Constraint(_))
        ));
        assert!(matches!(
            posts.save(record(json!({"title": null}))).await,
            Err(RepositoryError::Constraint(_))
        ));
    }
}
