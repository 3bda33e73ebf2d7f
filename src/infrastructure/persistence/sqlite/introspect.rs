//! SQLite Schema Introspection - 从表结构推导实体元数据

use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::RepositoryError;
use crate::domain::{ColumnMetadata, ColumnType, EntityMetadata, RelationMetadata};

#[derive(FromRow)]
struct ColumnInfoRow {
    name: String,
    declared_type: String,
    notnull: i64,
    dflt_value: Option<String>,
    pk: i64,
}

#[derive(FromRow)]
struct ForeignKeyRow {
    from_column: String,
    target_table: String,
    target_column: Option<String>,
}

/// 标识符只允许字母、数字和下划线，且不能以数字开头
pub fn validate_identifier(name: &str) -> Result<(), RepositoryError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidSchema(format!(
            "Invalid identifier: {:?}",
            name
        )))
    }
}

/// 校验并加引号
pub fn quote_identifier(name: &str) -> Result<String, RepositoryError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name))
}

async fn table_columns(pool: &DbPool, table: &str) -> Result<Vec<ColumnInfoRow>, RepositoryError> {
    sqlx::query_as(
        r#"
        SELECT name, type AS declared_type, "notnull", dflt_value, pk
        FROM pragma_table_info(?)
        ORDER BY cid
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

/// 读取表结构，生成实体元数据
///
/// 要求表存在且只有一个主键列；外键被视为多对一关联
pub async fn introspect_entity(
    pool: &DbPool,
    entity_name: &str,
    table: &str,
) -> Result<EntityMetadata, RepositoryError> {
    validate_identifier(table)?;

    let rows = table_columns(pool, table).await?;
    if rows.is_empty() {
        return Err(RepositoryError::InvalidSchema(format!(
            "Table {} does not exist",
            table
        )));
    }

    let primary_count = rows.iter().filter(|r| r.pk > 0).count();
    if primary_count != 1 {
        return Err(RepositoryError::InvalidSchema(format!(
            "Table {} must have exactly one primary key column, found {}",
            table, primary_count
        )));
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        validate_identifier(&row.name)?;

        let column_type = ColumnType::from_declared(&row.declared_type);
        let mut column = ColumnMetadata::new(row.name, column_type);
        if row.pk > 0 {
            // INTEGER PRIMARY KEY 是 rowid 的别名，由数据库生成
            let generated = row.declared_type.trim().eq_ignore_ascii_case("INTEGER");
            column = column.primary(generated);
        } else if row.notnull == 0 {
            column = column.nullable();
        }
        if row.dflt_value.is_some() {
            column = column.with_default();
        }
        columns.push(column);
    }

    let foreign_keys: Vec<ForeignKeyRow> = sqlx::query_as(
        r#"
        SELECT "from" AS from_column, "table" AS target_table, "to" AS target_column
        FROM pragma_foreign_key_list(?)
        ORDER BY id, seq
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    let mut relations = Vec::with_capacity(foreign_keys.len());
    for fk in foreign_keys {
        validate_identifier(&fk.target_table)?;
        let target_column = match fk.target_column {
            Some(column) => column,
            None => target_primary_key(pool, &fk.target_table).await?,
        };
        validate_identifier(&target_column)?;
        relations.push(RelationMetadata::new(fk.from_column, fk.target_table, target_column));
    }

    let metadata = EntityMetadata::new(entity_name, table, columns, relations);

    tracing::debug!(
        entity = %entity_name,
        table = %table,
        columns = metadata.columns.len(),
        relations = metadata.relations.len(),
        "Entity metadata introspected"
    );

    Ok(metadata)
}

/// 外键未指定目标列时指向目标表的主键
async fn target_primary_key(pool: &DbPool, table: &str) -> Result<String, RepositoryError> {
    table_columns(pool, table)
        .await?
        .into_iter()
        .find(|r| r.pk == 1)
        .map(|r| r.name)
        .ok_or_else(|| {
            RepositoryError::InvalidSchema(format!("Table {} has no primary key", table))
        })
}
