//! Entity Metadata - 实体元数据
//!
//! 描述一个可管理实体的列、主键和多对一关联

use serde::Serialize;
use serde_json::{Map, Value};

/// 实体记录：列名 -> 值
///
/// 已加载的关联以嵌套对象的形式挂在关联属性名下
pub type EntityRecord = Map<String, Value>;

/// 列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
    Date,
    DateTime,
    Blob,
}

impl ColumnType {
    /// 根据 SQLite 声明类型推断列类型（参照 SQLite 类型亲和性规则）
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();

        if upper.starts_with("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("DATETIME") || upper.contains("TIMESTAMP") {
            ColumnType::DateTime
        } else if upper.contains("DATE") {
            ColumnType::Date
        } else if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            ColumnType::Text
        } else if upper.contains("BLOB") {
            ColumnType::Blob
        } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
            .iter()
            .any(|t| upper.contains(t))
        {
            ColumnType::Float
        } else {
            ColumnType::Text
        }
    }

    /// 表单中对应的 input 类型
    pub fn input_type(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Float => "number",
            ColumnType::Boolean => "checkbox",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime-local",
            ColumnType::Text | ColumnType::Blob => "text",
        }
    }
}

/// 列元数据
#[derive(Debug, Clone, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub label: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary: bool,
    /// 由数据库生成的主键（SQLite rowid 别名）
    pub generated: bool,
    pub has_default: bool,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            label: humanize(&name),
            name,
            column_type,
            nullable: false,
            primary: false,
            generated: false,
            has_default: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary(mut self, generated: bool) -> Self {
        self.primary = true;
        self.generated = generated;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// 是否可以从表单写入
    pub fn is_editable(&self) -> bool {
        !self.generated && self.column_type != ColumnType::Blob
    }
}

/// 多对一关联
#[derive(Debug, Clone, Serialize)]
pub struct RelationMetadata {
    pub property_name: String,
    pub join_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl RelationMetadata {
    pub fn new(
        join_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        let join_column = join_column.into();
        let property_name = match join_column.strip_suffix("_id") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => format!("{}_ref", join_column),
        };
        Self {
            property_name,
            join_column,
            target_table: target_table.into(),
            target_column: target_column.into(),
        }
    }
}

/// 实体元数据
#[derive(Debug, Clone, Serialize)]
pub struct EntityMetadata {
    pub name: String,
    pub display_name: String,
    pub table_name: String,
    pub columns: Vec<ColumnMetadata>,
    pub relations: Vec<RelationMetadata>,
}

impl EntityMetadata {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<ColumnMetadata>,
        relations: Vec<RelationMetadata>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: humanize(&name),
            name,
            table_name: table_name.into(),
            columns,
            relations,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// 主键列（构造时由调用方保证恰好存在一个）
    pub fn primary_column(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.primary)
    }

    /// 从记录中取出主键值，空值视为不存在
    pub fn primary_key_of<'a>(&self, record: &'a EntityRecord) -> Option<&'a Value> {
        let column = self.primary_column()?;
        record.get(&column.name).filter(|v| !v.is_null())
    }

    /// 将路径中的主键转换为主键列的类型
    ///
    /// 无法转换时返回 None：不可能有匹配的行
    pub fn parse_primary_key(&self, raw: &str) -> Option<Value> {
        let column = self.primary_column()?;
        match column.column_type {
            ColumnType::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            ColumnType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            _ => Some(Value::String(raw.to_string())),
        }
    }
}

/// 主键值的字符串表示（用于 URL）
pub fn primary_key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `blog_post` -> `Blog post`
pub fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
