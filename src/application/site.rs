//! Admin Site - 站点与分区注册表
//!
//! 站点由有序的分区组成，每个分区包含若干实体仓储。
//! 处理器通过站点把 section/entity/primary key 解析为具体的仓储和记录。

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::application::error::ApplicationError;
use crate::application::ports::EntityRepositoryPort;
use crate::domain::{
    clean_values, humanize, CleanError, EntityMetadata, EntityRecord, RESULTS_PER_PAGE,
};

/// 站点注册错误
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Section already registered: {0}")]
    DuplicateSection(String),

    #[error("Entity {entity} already registered in section {section}")]
    DuplicateEntity { section: String, entity: String },

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown entity {entity} in section {section}")]
    UnknownEntity { section: String, entity: String },
}

impl From<SiteError> for ApplicationError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::UnknownSection(name) => ApplicationError::not_found("Section", name),
            SiteError::UnknownEntity { section, entity } => {
                ApplicationError::not_found("Entity", format!("{}/{}", section, entity))
            }
            other => ApplicationError::internal(other.to_string()),
        }
    }
}

// ============================================================================
// AdminSection
// ============================================================================

/// 管理分区
pub struct AdminSection {
    name: String,
    display_name: String,
    results_per_page: Option<u32>,
    repositories: Vec<Arc<dyn EntityRepositoryPort>>,
}

impl AdminSection {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: humanize(&name),
            name,
            results_per_page: None,
            repositories: Vec::new(),
        }
    }

    /// 覆盖站点默认的每页条数
    pub fn with_results_per_page(mut self, results_per_page: Option<u32>) -> Self {
        self.results_per_page = results_per_page.filter(|n| *n > 0);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// 注册实体仓储，实体名取自仓储元数据
    pub fn register(&mut self, repository: Arc<dyn EntityRepositoryPort>) -> Result<(), SiteError> {
        let entity = repository.metadata().name.clone();
        if self.repositories.iter().any(|r| r.metadata().name == entity) {
            return Err(SiteError::DuplicateEntity {
                section: self.name.clone(),
                entity,
            });
        }
        self.repositories.push(repository);
        Ok(())
    }

    pub fn get_repository(
        &self,
        entity_name: &str,
    ) -> Result<Arc<dyn EntityRepositoryPort>, SiteError> {
        self.repositories
            .iter()
            .find(|r| r.metadata().name == entity_name)
            .cloned()
            .ok_or_else(|| SiteError::UnknownEntity {
                section: self.name.clone(),
                entity: entity_name.to_string(),
            })
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.repositories.iter().map(|r| r.metadata())
    }

    pub fn results_per_page(&self, site_default: u32) -> u32 {
        self.results_per_page.unwrap_or(site_default)
    }
}

// ============================================================================
// AdminSite
// ============================================================================

/// 解析出的分区与仓储
pub struct AdminModels<'a> {
    pub section: &'a AdminSection,
    pub repository: Arc<dyn EntityRepositoryPort>,
}

impl AdminModels<'_> {
    pub fn metadata(&self) -> &EntityMetadata {
        self.repository.metadata()
    }
}

/// 解析出的分区、仓储与实体记录（含关联）
pub struct AdminEntity<'a> {
    pub models: AdminModels<'a>,
    pub primary_key: Value,
    pub entity: EntityRecord,
}

/// 管理站点
pub struct AdminSite {
    title: String,
    results_per_page: u32,
    sections: Vec<AdminSection>,
}

impl AdminSite {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            results_per_page: RESULTS_PER_PAGE,
            sections: Vec::new(),
        }
    }

    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn default_results_per_page(&self) -> u32 {
        self.results_per_page
    }

    /// 添加完整分区
    pub fn add_section(&mut self, section: AdminSection) -> Result<(), SiteError> {
        if self.sections.iter().any(|s| s.name == section.name) {
            return Err(SiteError::DuplicateSection(section.name));
        }
        self.sections.push(section);
        Ok(())
    }

    /// 将实体注册到分区，分区不存在时自动创建
    pub fn register(
        &mut self,
        section_name: &str,
        repository: Arc<dyn EntityRepositoryPort>,
    ) -> Result<(), SiteError> {
        let position = match self.sections.iter().position(|s| s.name == section_name) {
            Some(position) => position,
            None => {
                self.sections.push(AdminSection::new(section_name));
                self.sections.len() - 1
            }
        };

        let entity = repository.metadata().name.clone();
        self.sections[position].register(repository)?;

        tracing::debug!(section = %section_name, entity = %entity, "Entity registered");
        Ok(())
    }

    pub fn get_section(&self, name: &str) -> Result<&AdminSection, SiteError> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SiteError::UnknownSection(name.to_string()))
    }

    /// 按注册顺序列出分区
    pub fn section_list(&self) -> &[AdminSection] {
        &self.sections
    }

    /// 清洗表单值
    pub fn clean_values(
        &self,
        values: &HashMap<String, String>,
        metadata: &EntityMetadata,
    ) -> Result<EntityRecord, CleanError> {
        clean_values(values, metadata)
    }

    /// 解析分区与实体仓储
    pub fn resolve(
        &self,
        section_name: &str,
        entity_name: &str,
    ) -> Result<AdminModels<'_>, ApplicationError> {
        let section = self.get_section(section_name)?;
        let repository = section.get_repository(entity_name)?;
        Ok(AdminModels {
            section,
            repository,
        })
    }

    /// 解析分区、实体仓储，并加载带关联的实体记录
    pub async fn resolve_with_entity(
        &self,
        section_name: &str,
        entity_name: &str,
        primary_key: &str,
    ) -> Result<AdminEntity<'_>, ApplicationError> {
        let models = self.resolve(section_name, entity_name)?;
        let (primary_key, entity) =
            get_entity_with_relations(models.repository.as_ref(), primary_key).await?;
        Ok(AdminEntity {
            models,
            primary_key,
            entity,
        })
    }
}

/// 加载实体及其全部关联，不存在时返回 NotFound
pub async fn get_entity_with_relations(
    repository: &dyn EntityRepositoryPort,
    raw_primary_key: &str,
) -> Result<(Value, EntityRecord), ApplicationError> {
    let metadata = repository.metadata();
    let not_found = || {
        ApplicationError::not_found("Entity", format!("{}/{}", metadata.name, raw_primary_key))
    };

    let primary_key = metadata
        .parse_primary_key(raw_primary_key)
        .ok_or_else(not_found)?;

    let entity = repository
        .find_one_with_relations(&primary_key)
        .await?
        .ok_or_else(not_found)?;

    Ok((primary_key, entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnMetadata, ColumnType};
    use crate::infrastructure::memory::InMemoryEntityRepository;
    use serde_json::json;

    fn repository(name: &str) -> Arc<InMemoryEntityRepository> {
        let metadata = EntityMetadata::new(
            name,
            format!("{}s", name),
            vec![
                ColumnMetadata::new("id", ColumnType::Integer).primary(true),
                ColumnMetadata::new("name", ColumnType::Text),
            ],
            vec![],
        );
        Arc::new(InMemoryEntityRepository::new(metadata))
    }

    #[test]
    fn test_register_keeps_section_order() {
        let mut site = AdminSite::new("Admin");
        site.register("shop", repository("product")).unwrap();
        site.register("blog", repository("post")).unwrap();
        site.register("shop", repository("order")).unwrap();

        let names: Vec<&str> = site.section_list().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["shop", "blog"]);

        let shop = site.get_section("shop").unwrap();
        let entities: Vec<&str> = shop.entities().map(|m| m.name.as_str()).collect();
        assert_eq!(entities, vec!["product", "order"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut site = AdminSite::new("Admin");
        site.register("blog", repository("post")).unwrap();
        assert!(matches!(
            site.register("blog", repository("post")),
            Err(SiteError::DuplicateEntity { .. })
        ));
        assert!(matches!(
            site.add_section(AdminSection::new("blog")),
            Err(SiteError::DuplicateSection(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_is_not_found() {
        let mut site = AdminSite::new("Admin");
        site.register("blog", repository("post")).unwrap();

        assert!(site.resolve("blog", "post").is_ok());
        assert!(matches!(
            site.resolve("nope", "post"),
            Err(ApplicationError::NotFound { resource_type: "Section", .. })
        ));
        assert!(matches!(
            site.resolve("blog", "nope"),
            Err(ApplicationError::NotFound { resource_type: "Entity", .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_with_entity() {
        let repo = repository("post");
        let saved = repo
            .save(json!({"name": "first"}).as_object().unwrap().clone())
            .await
            .unwrap();
        let id = saved["id"].to_string();

        let mut site = AdminSite::new("Admin");
        site.register("blog", repo).unwrap();

        let resolved = site.resolve_with_entity("blog", "post", &id).await.unwrap();
        assert_eq!(resolved.entity["name"], json!("first"));
        assert_eq!(resolved.models.metadata().name, "post");

        assert!(matches!(
            site.resolve_with_entity("blog", "post", "999").await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            site.resolve_with_entity("blog", "post", "not-a-number").await,
            Err(ApplicationError::NotFound { .. })
        ));
    }

    #[test]
    fn test_section_results_per_page() {
        let section = AdminSection::new("blog").with_results_per_page(Some(10));
        assert_eq!(section.results_per_page(25), 10);

        let section = AdminSection::new("blog").with_results_per_page(Some(0));
        assert_eq!(section.results_per_page(25), 25);
    }
}
