//! 测试辅助：记录上下文的渲染器和示例站点

use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::ports::{EntityRepositoryPort, RenderError, TemplateRendererPort};
use crate::application::site::AdminSite;
use crate::domain::{ColumnMetadata, ColumnType, EntityMetadata, EntityRecord};
use crate::infrastructure::memory::InMemoryEntityRepository;

/// 将模板名和上下文序列化为 JSON 输出
pub struct ContextRenderer;

impl TemplateRendererPort for ContextRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        Ok(json!({ "template": name, "context": context }).to_string())
    }
}

/// 解析 ContextRenderer 的输出
pub fn rendered(output: &str) -> (String, Value) {
    let value: Value = serde_json::from_str(output).unwrap();
    (
        value["template"].as_str().unwrap().to_string(),
        value["context"].clone(),
    )
}

pub fn post_metadata() -> EntityMetadata {
    EntityMetadata::new(
        "post",
        "posts",
        vec![
            ColumnMetadata::new("id", ColumnType::Integer).primary(true),
            ColumnMetadata::new("title", ColumnType::Text),
            ColumnMetadata::new("views", ColumnType::Integer).with_default(),
            ColumnMetadata::new("published", ColumnType::Boolean),
        ],
        vec![],
    )
}

pub fn record(value: Value) -> EntityRecord {
    value.as_object().cloned().unwrap()
}

/// 包含 blog/post 的站点，预置 `posts` 条记录
pub async fn blog_site(posts: usize) -> (Arc<AdminSite>, Arc<InMemoryEntityRepository>) {
    let repository = InMemoryEntityRepository::new(post_metadata()).arc();
    for i in 1..=posts {
        repository
            .save(record(json!({
                "title": format!("Post {}", i),
                "views": i,
                "published": false,
            })))
            .await
            .unwrap();
    }

    let mut site = AdminSite::new("Test Admin");
    site.register("blog", repository.clone()).unwrap();
    (Arc::new(site), repository)
}
