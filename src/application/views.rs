//! View Models - 模板上下文
//!
//! 将站点、元数据和实体记录转换为模板可直接使用的结构

use serde::Serialize;
use serde_json::{json, Value};

use crate::application::error::ApplicationError;
use crate::application::ports::TemplateRendererPort;
use crate::application::site::{AdminSection, AdminSite};
use crate::domain::{
    primary_key_string, urls, ColumnMetadata, ColumnType, EntityMetadata, EntityRecord,
    Pagination,
};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const CHANGELIST_TEMPLATE: &str = "changelist.html";
pub const ADD_TEMPLATE: &str = "add.html";
pub const CHANGE_TEMPLATE: &str = "change.html";

/// 关联对象展示时优先使用的字段
const LABEL_FIELDS: &[&str] = &["name", "title", "label", "username", "email"];

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EntityLinkView {
    pub name: String,
    pub display_name: String,
    pub changelist_url: String,
    pub add_url: String,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub name: String,
    pub display_name: String,
    pub entities: Vec<EntityLinkView>,
}

impl From<&AdminSection> for SectionView {
    fn from(section: &AdminSection) -> Self {
        Self {
            name: section.name().to_string(),
            display_name: section.display_name().to_string(),
            entities: section
                .entities()
                .map(|metadata| EntityLinkView {
                    name: metadata.name.clone(),
                    display_name: metadata.display_name.clone(),
                    changelist_url: urls::changelist_url(section.name(), &metadata.name),
                    add_url: urls::add_url(section.name(), &metadata.name),
                })
                .collect(),
        }
    }
}

/// 列表中的一行
#[derive(Debug, Serialize)]
pub struct RowView {
    pub primary_key: String,
    pub change_url: String,
    pub cells: Vec<String>,
}

impl RowView {
    pub fn new(section: &str, metadata: &EntityMetadata, record: &EntityRecord) -> Self {
        let primary_key = metadata
            .primary_key_of(record)
            .map(primary_key_string)
            .unwrap_or_default();

        Self {
            change_url: urls::change_url(section, &metadata.name, &primary_key),
            cells: metadata
                .columns
                .iter()
                .map(|c| display_value(record.get(&c.name).unwrap_or(&Value::Null)))
                .collect(),
            primary_key,
        }
    }
}

/// 表单字段
#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub readonly: bool,
    /// 已加载关联的展示文本
    pub relation: Option<String>,
}

impl FieldView {
    pub fn new(column: &ColumnMetadata, value: Option<&Value>, relation: Option<String>) -> Self {
        let value = value.unwrap_or(&Value::Null);
        Self {
            name: column.name.clone(),
            label: column.label.clone(),
            input_type: column.column_type.input_type(),
            value: input_value(column.column_type, value),
            checked: is_checked(value),
            required: !column.nullable
                && !column.has_default
                && column.column_type != ColumnType::Boolean,
            readonly: !column.is_editable(),
            relation,
        }
    }
}

/// 为实体构建表单字段；新建表单中不包含自增主键
pub fn form_fields(metadata: &EntityMetadata, record: Option<&EntityRecord>) -> Vec<FieldView> {
    metadata
        .columns
        .iter()
        .filter(|c| record.is_some() || c.is_editable())
        .map(|column| {
            let relation = record.and_then(|r| {
                metadata
                    .relations
                    .iter()
                    .find(|rel| rel.join_column == column.name)
                    .and_then(|rel| r.get(&rel.property_name))
                    .filter(|v| !v.is_null())
                    .map(display_value)
            });
            FieldView::new(column, record.and_then(|r| r.get(&column.name)), relation)
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub results_per_page: u32,
    pub count: u64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl PaginationView {
    pub fn new(section: &str, entity: &str, pagination: &Pagination, count: u64) -> Self {
        let page = pagination.page();
        Self {
            page,
            total_pages: pagination.total_pages(count),
            results_per_page: pagination.results_per_page(),
            count,
            previous_url: pagination
                .has_previous()
                .then(|| urls::changelist_page_url(section, entity, page - 1)),
            next_url: pagination
                .has_next(count)
                .then(|| urls::changelist_page_url(section, entity, page + 1)),
        }
    }
}

/// 实体相关页面共用的链接
#[derive(Debug, Serialize)]
pub struct EntityUrls {
    pub index_url: String,
    pub changelist_url: String,
    pub add_url: String,
    pub change_url: Option<String>,
    pub delete_url: Option<String>,
}

impl EntityUrls {
    pub fn new(section: &str, entity: &str, primary_key: Option<&str>) -> Self {
        Self {
            index_url: urls::index_url(),
            changelist_url: urls::changelist_url(section, entity),
            add_url: urls::add_url(section, entity),
            change_url: primary_key.map(|pk| urls::change_url(section, entity, pk)),
            delete_url: primary_key.map(|pk| urls::delete_url(section, entity, pk)),
        }
    }
}

// ============================================================================
// Rendering helpers
// ============================================================================

/// 渲染页面，自动加入站点标题和首页链接
pub fn render_page(
    renderer: &dyn TemplateRendererPort,
    site: &AdminSite,
    name: &str,
    mut context: Value,
) -> Result<String, ApplicationError> {
    if let Some(object) = context.as_object_mut() {
        object.insert("site_title".to_string(), json!(site.title()));
        object.insert("index_url".to_string(), json!(urls::index_url()));
    }
    Ok(renderer.render(name, &context)?)
}

/// 列表单元格 / 关联的展示文本
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(object) => LABEL_FIELDS
            .iter()
            .find_map(|field| object.get(*field).filter(|v| v.is_string()))
            .or_else(|| object.get("id"))
            .map(display_value)
            .unwrap_or_else(|| value.to_string()),
    }
}

fn input_value(column_type: ColumnType, value: &Value) -> String {
    match (column_type, value) {
        (_, Value::Null) | (ColumnType::Boolean, _) => String::new(),
        // datetime-local 需要 `T` 分隔符
        (ColumnType::DateTime, Value::String(s)) => s.replacen(' ', "T", 1),
        (_, other) => display_value(other),
    }
}

fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|i| i != 0).unwrap_or(false),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}
