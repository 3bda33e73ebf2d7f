//! Entity Command Handlers

use std::sync::Arc;

use crate::application::commands::{CreateEntity, DeleteEntity, UpdateEntity};
use crate::application::error::ApplicationError;
use crate::application::ports::TemplateRendererPort;
use crate::application::queries::handlers::render_change_page;
use crate::application::site::{get_entity_with_relations, AdminSite};
use crate::domain::{primary_key_string, urls};

// ============================================================================
// CreateEntity
// ============================================================================

/// CreateEntity Handler
///
/// 返回新实体编辑页的 URL，由 HTTP 层重定向
pub struct CreateEntityHandler {
    site: Arc<AdminSite>,
}

impl CreateEntityHandler {
    pub fn new(site: Arc<AdminSite>) -> Self {
        Self { site }
    }

    pub async fn handle(&self, command: CreateEntity) -> Result<String, ApplicationError> {
        let models = self
            .site
            .resolve(&command.section_name, &command.entity_name)?;
        let metadata = models.metadata();

        let cleaned = self.site.clean_values(&command.values, metadata)?;
        let created = models.repository.save(cleaned).await?;

        let primary_key = metadata
            .primary_key_of(&created)
            .map(primary_key_string)
            .ok_or_else(|| {
                ApplicationError::internal(format!("Saved {} has no primary key", metadata.name))
            })?;

        tracing::info!(
            section = %command.section_name,
            entity = %command.entity_name,
            primary_key = %primary_key,
            "Entity created"
        );

        Ok(urls::change_url(
            models.section.name(),
            &metadata.name,
            &primary_key,
        ))
    }
}

// ============================================================================
// UpdateEntity
// ============================================================================

/// UpdateEntity Handler
///
/// 保存清洗后的值（未提交的列不变），返回重新加载后的编辑页
pub struct UpdateEntityHandler {
    site: Arc<AdminSite>,
    renderer: Arc<dyn TemplateRendererPort>,
}

impl UpdateEntityHandler {
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self { site, renderer }
    }

    pub async fn handle(&self, command: UpdateEntity) -> Result<String, ApplicationError> {
        let resolved = self
            .site
            .resolve_with_entity(
                &command.section_name,
                &command.entity_name,
                &command.primary_key,
            )
            .await?;
        let repository = resolved.models.repository.as_ref();
        let metadata = repository.metadata();

        // 只保存主键和表单中清洗出的列，其余列保持数据库中的值
        let mut changes = self.site.clean_values(&command.values, metadata)?;
        if let Some(column) = metadata.primary_column() {
            changes.insert(column.name.clone(), resolved.primary_key.clone());
        }
        repository.save(changes).await?;

        tracing::info!(
            section = %command.section_name,
            entity = %command.entity_name,
            primary_key = %command.primary_key,
            "Entity updated"
        );

        let (_, updated) = get_entity_with_relations(repository, &command.primary_key).await?;

        render_change_page(
            self.renderer.as_ref(),
            &self.site,
            resolved.models.section.name(),
            metadata,
            &updated,
        )
    }
}

// ============================================================================
// DeleteEntity
// ============================================================================

/// DeleteEntity Handler
///
/// 返回列表页 URL，由 HTTP 层重定向
pub struct DeleteEntityHandler {
    site: Arc<AdminSite>,
}

impl DeleteEntityHandler {
    pub fn new(site: Arc<AdminSite>) -> Self {
        Self { site }
    }

    pub async fn handle(&self, command: DeleteEntity) -> Result<String, ApplicationError> {
        let resolved = self
            .site
            .resolve_with_entity(
                &command.section_name,
                &command.entity_name,
                &command.primary_key,
            )
            .await?;

        resolved
            .models
            .repository
            .remove(&resolved.primary_key)
            .await?;

        tracing::info!(
            section = %command.section_name,
            entity = %command.entity_name,
            primary_key = %command.primary_key,
            "Entity deleted"
        );

        Ok(urls::changelist_url(
            resolved.models.section.name(),
            &resolved.models.metadata().name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::EntityRepositoryPort;
    use crate::application::testing::{blog_site, rendered, ContextRenderer};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, DatabaseConfig, SqliteEntityRepository,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_redirects_to_change_page() {
        let (site, repository) = blog_site(2).await;
        let handler = CreateEntityHandler::new(site);

        let command = CreateEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            values: form(&[("title", "New"), ("views", "7"), ("published", "on")]),
        };
        let url = handler.handle(command).await.unwrap();
        assert_eq!(url, "/admin/blog/post/3/change");

        let created = repository
            .find_one_with_relations(&json!(3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created["title"], json!("New"));
        assert_eq!(created["views"], json!(7));
        assert_eq!(created["published"], json!(true));
    }

    #[tokio::test]
    async fn test_create_with_invalid_values() {
        let (site, repository) = blog_site(0).await;
        let handler = CreateEntityHandler::new(site);

        let command = CreateEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            values: form(&[("title", "New"), ("views", "lots")]),
        };
        assert!(matches!(
            handler.handle(command).await,
            Err(ApplicationError::InvalidValues(_))
        ));
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_rerenders() {
        let (site, repository) = blog_site(1).await;
        let handler = UpdateEntityHandler::new(site, Arc::new(ContextRenderer));

        let command = UpdateEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "1".to_string(),
            values: form(&[("title", "Renamed"), ("published", "on")]),
        };
        let (template, context) = rendered(&handler.handle(command).await.unwrap());
        assert_eq!(template, "change.html");
        assert_eq!(context["entity"]["title"], json!("Renamed"));
        assert_eq!(context["entity"]["views"], json!(1));

        let stored = repository
            .find_one_with_relations(&json!(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["published"], json!(true));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_binary_data() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
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

        let mut site = AdminSite::new("Test Admin");
        site.register("storage", Arc::new(files)).unwrap();
        let handler = UpdateEntityHandler::new(Arc::new(site), Arc::new(ContextRenderer));

        let command = UpdateEntity {
            section_name: "storage".to_string(),
            entity_name: "file".to_string(),
            primary_key: "1".to_string(),
            values: form(&[("name", "renamed"), ("data", "overwritten")]),
        };
        let (_, context) = rendered(&handler.handle(command).await.unwrap());
        assert_eq!(context["entity"]["name"], json!("renamed"));

        let (kind, hex): (String, String) =
            sqlx::query_as("SELECT typeof(data), hex(data) FROM files WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(kind, "blob");
        assert_eq!(hex, "DEADBEEF");
    }

    #[tokio::test]
    async fn test_update_missing_entity() {
        let (site, _) = blog_site(1).await;
        let handler = UpdateEntityHandler::new(site, Arc::new(ContextRenderer));

        let command = UpdateEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "9".to_string(),
            values: form(&[("title", "x")]),
        };
        assert!(matches!(
            handler.handle(command).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_redirects_to_list() {
        let (site, repository) = blog_site(2).await;
        let handler = DeleteEntityHandler::new(site);

        let command = DeleteEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "1".to_string(),
        };
        assert_eq!(handler.handle(command).await.unwrap(), "/admin/blog/post");
        assert_eq!(repository.len(), 1);

        let command = DeleteEntity {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "1".to_string(),
        };
        assert!(matches!(
            handler.handle(command).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }
}
