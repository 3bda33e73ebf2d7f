//! Domain Errors

use thiserror::Error;

/// 单个字段的清洗错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 表单值清洗错误（收集所有字段错误）
#[derive(Debug, Clone, Error)]
#[error("Invalid form values: {}", format_field_errors(.errors))]
pub struct CleanError {
    pub errors: Vec<FieldError>,
}

impl CleanError {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 分页参数错误
#[derive(Debug, Clone, Error)]
pub enum PaginationError {
    #[error("Invalid page number: {0}")]
    InvalidPage(String),
}
