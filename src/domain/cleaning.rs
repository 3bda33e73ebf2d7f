//! Value Cleaning - 表单值清洗
//!
//! 将提交的表单字符串转换为与列类型一致的值，再交给仓储持久化

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;

use super::errors::{CleanError, FieldError};
use super::metadata::{ColumnMetadata, ColumnType, EntityMetadata, EntityRecord};

/// 日期时间统一存储格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const TRUTHY: &[&str] = &["on", "true", "1", "yes"];

/// 清洗表单值
///
/// - 只处理元数据中的列，未知字段被丢弃
/// - 自增主键与二进制列不从表单写入
/// - 复选框缺省即为 false
/// - 其余缺省字段，以及留空的有默认值非空列，不出现在结果中
pub fn clean_values(
    values: &HashMap<String, String>,
    metadata: &EntityMetadata,
) -> Result<EntityRecord, CleanError> {
    let mut cleaned = EntityRecord::new();
    let mut errors = Vec::new();

    for column in metadata.columns.iter().filter(|c| c.is_editable()) {
        let raw = values.get(&column.name).map(String::as_str);

        if column.column_type == ColumnType::Boolean {
            cleaned.insert(column.name.clone(), Value::Bool(is_truthy(raw)));
            continue;
        }

        let Some(raw) = raw else {
            continue;
        };

        // 有默认值的非空列留空时不写入：新建用数据库默认值，更新保持原值
        if raw.trim().is_empty() && column.has_default && !column.nullable {
            continue;
        }

        match clean_value(raw, column) {
            Ok(value) => {
                cleaned.insert(column.name.clone(), value);
            }
            Err(message) => errors.push(FieldError {
                field: column.name.clone(),
                message,
            }),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(CleanError { errors })
    }
}

fn is_truthy(raw: Option<&str>) -> bool {
    raw.map(|v| TRUTHY.contains(&v.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn clean_value(raw: &str, column: &ColumnMetadata) -> Result<Value, String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return if column.nullable {
            Ok(Value::Null)
        } else if column.column_type == ColumnType::Text {
            Ok(Value::String(raw.to_string()))
        } else {
            Err("This field is required".to_string())
        };
    }

    match column.column_type {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{}' is not a whole number", trimmed)),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{}' is not a number", trimmed)),
        ColumnType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .map_err(|_| format!("'{}' is not a valid date (YYYY-MM-DD)", trimmed)),
        ColumnType::DateTime => parse_datetime(trimmed)
            .map(|dt| Value::String(dt.format(DATETIME_FORMAT).to_string()))
            .ok_or_else(|| format!("'{}' is not a valid date and time", trimmed)),
        ColumnType::Text => Ok(Value::String(raw.to_string())),
        ColumnType::Boolean | ColumnType::Blob => Ok(Value::Null),
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}
