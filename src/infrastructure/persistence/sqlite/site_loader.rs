//! Site Loader - 根据配置构建管理站点

use std::sync::Arc;
use thiserror::Error;

use super::{DbPool, SqliteEntityRepository};
use crate::application::ports::RepositoryError;
use crate::application::site::{AdminSection, AdminSite, SiteError};
use crate::config::AdminConfig;

#[derive(Debug, Error)]
pub enum SiteLoadError {
    #[error("Failed to load entity {section}/{entity}: {source}")]
    Repository {
        section: String,
        entity: String,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    Site(#[from] SiteError),
}

/// 按配置顺序注册分区和实体，每个实体的元数据来自表结构
pub async fn load_site(pool: &DbPool, config: &AdminConfig) -> Result<AdminSite, SiteLoadError> {
    let mut site =
        AdminSite::new(config.site_title.clone()).with_results_per_page(config.results_per_page);

    for section_config in &config.sections {
        let mut section = AdminSection::new(section_config.name.clone())
            .with_results_per_page(section_config.results_per_page);

        for entity in &section_config.entities {
            let repository =
                SqliteEntityRepository::introspect(pool.clone(), &entity.name, &entity.table)
                    .await
                    .map_err(|source| SiteLoadError::Repository {
                        section: section_config.name.clone(),
                        entity: entity.name.clone(),
                        source,
                    })?;
            section.register(Arc::new(repository))?;
        }

        tracing::info!(
            section = %section_config.name,
            entities = section_config.entities.len(),
            "Admin section registered"
        );
        site.add_section(section)?;
    }

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntityConfig, SectionConfig};
    use crate::infrastructure::persistence::sqlite::{create_pool, DatabaseConfig};

    async fn pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn admin_config(table: &str) -> AdminConfig {
        AdminConfig {
            sections: vec![SectionConfig {
                name: "blog".to_string(),
                results_per_page: Some(10),
                entities: vec![EntityConfig {
                    name: "post".to_string(),
                    table: table.to_string(),
                }],
            }],
            ..AdminConfig::default()
        }
    }

    #[tokio::test]
    async fn test_load_site_from_config() {
        let pool = pool().await;
        let site = load_site(&pool, &admin_config("posts")).await.unwrap();

        let section = site.get_section("blog").unwrap();
        assert_eq!(section.results_per_page(25), 10);
        assert!(section.get_repository("post").is_ok());
    }

    #[tokio::test]
    async fn test_load_site_with_missing_table() {
        let pool = pool().await;
        let result = load_site(&pool, &admin_config("missing")).await;
        assert!(matches!(result, Err(SiteLoadError::Repository { .. })));
    }
}
