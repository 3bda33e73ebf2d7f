//! Template Renderer Port

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to render template {name}: {message}")]
    RenderFailed { name: String, message: String },
}

/// 模板渲染端口
///
/// context 必须是 JSON 对象
pub trait TemplateRendererPort: Send + Sync {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError>;
}
