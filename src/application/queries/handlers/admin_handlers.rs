//! Admin Query Handlers

use serde_json::json;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::TemplateRendererPort;
use crate::application::queries::{GetAddForm, GetChangeForm, GetChangeList, ListSections};
use crate::application::site::AdminSite;
use crate::application::views::{
    form_fields, render_page, EntityUrls, PaginationView, RowView, SectionView, ADD_TEMPLATE,
    CHANGELIST_TEMPLATE, CHANGE_TEMPLATE, INDEX_TEMPLATE,
};
use crate::domain::{primary_key_string, EntityMetadata, EntityRecord, Pagination};

// ============================================================================
// ListSections
// ============================================================================

/// 首页：列出所有分区
pub struct IndexHandler {
    site: Arc<AdminSite>,
    renderer: Arc<dyn TemplateRendererPort>,
}

impl IndexHandler {
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self { site, renderer }
    }

    pub async fn handle(&self, _query: ListSections) -> Result<String, ApplicationError> {
        let sections: Vec<SectionView> = self
            .site
            .section_list()
            .iter()
            .map(SectionView::from)
            .collect();

        render_page(
            self.renderer.as_ref(),
            &self.site,
            INDEX_TEMPLATE,
            json!({ "sections": sections }),
        )
    }
}

// ============================================================================
// GetChangeList
// ============================================================================

/// 实体列表页（分页）
pub struct ChangeListHandler {
    site: Arc<AdminSite>,
    renderer: Arc<dyn TemplateRendererPort>,
}

impl ChangeListHandler {
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self { site, renderer }
    }

    pub async fn handle(&self, query: GetChangeList) -> Result<String, ApplicationError> {
        let models = self.site.resolve(&query.section_name, &query.entity_name)?;
        let metadata = models.metadata();

        let results_per_page = models
            .section
            .results_per_page(self.site.default_results_per_page());
        let pagination = Pagination::parse(query.page.as_deref(), results_per_page)?;

        let (entities, count) = models
            .repository
            .find_and_count(pagination.skip(), pagination.take())
            .await?;

        tracing::debug!(
            section = %query.section_name,
            entity = %query.entity_name,
            page = pagination.page(),
            count = count,
            "Change list loaded"
        );

        let rows: Vec<RowView> = entities
            .iter()
            .map(|record| RowView::new(models.section.name(), metadata, record))
            .collect();

        render_page(
            self.renderer.as_ref(),
            &self.site,
            CHANGELIST_TEMPLATE,
            json!({
                "section": SectionView::from(models.section),
                "metadata": metadata,
                "entities": entities,
                "rows": rows,
                "count": count,
                "page": pagination.page(),
                "results_per_page": pagination.results_per_page(),
                "pagination": PaginationView::new(
                    models.section.name(),
                    &metadata.name,
                    &pagination,
                    count,
                ),
                "urls": EntityUrls::new(models.section.name(), &metadata.name, None),
            }),
        )
    }
}

// ============================================================================
// GetAddForm
// ============================================================================

/// 新建表单
pub struct AddFormHandler {
    site: Arc<AdminSite>,
    renderer: Arc<dyn TemplateRendererPort>,
}

impl AddFormHandler {
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self { site, renderer }
    }

    pub async fn handle(&self, query: GetAddForm) -> Result<String, ApplicationError> {
        let models = self.site.resolve(&query.section_name, &query.entity_name)?;
        let metadata = models.metadata();

        render_page(
            self.renderer.as_ref(),
            &self.site,
            ADD_TEMPLATE,
            json!({
                "section": SectionView::from(models.section),
                "metadata": metadata,
                "fields": form_fields(metadata, None),
                "urls": EntityUrls::new(models.section.name(), &metadata.name, None),
            }),
        )
    }
}

// ============================================================================
// GetChangeForm
// ============================================================================

/// 编辑表单
pub struct ChangeFormHandler {
    site: Arc<AdminSite>,
    renderer: Arc<dyn TemplateRendererPort>,
}

impl ChangeFormHandler {
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self { site, renderer }
    }

    pub async fn handle(&self, query: GetChangeForm) -> Result<String, ApplicationError> {
        let resolved = self
            .site
            .resolve_with_entity(&query.section_name, &query.entity_name, &query.primary_key)
            .await?;

        render_change_page(
            self.renderer.as_ref(),
            &self.site,
            resolved.models.section.name(),
            resolved.models.metadata(),
            &resolved.entity,
        )
    }
}

/// 渲染编辑页（编辑表单和更新后的页面共用）
pub(crate) fn render_change_page(
    renderer: &dyn TemplateRendererPort,
    site: &AdminSite,
    section_name: &str,
    metadata: &EntityMetadata,
    entity: &EntityRecord,
) -> Result<String, ApplicationError> {
    let section = site.get_section(section_name)?;
    let primary_key = metadata
        .primary_key_of(entity)
        .map(primary_key_string)
        .unwrap_or_default();

    render_page(
        renderer,
        site,
        CHANGE_TEMPLATE,
        json!({
            "section": SectionView::from(section),
            "metadata": metadata,
            "entity": entity,
            "primary_key": primary_key,
            "fields": form_fields(metadata, Some(entity)),
            "urls": EntityUrls::new(section_name, &metadata.name, Some(&primary_key)),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{blog_site, rendered, ContextRenderer};
    use serde_json::json;

    fn renderer() -> Arc<dyn TemplateRendererPort> {
        Arc::new(ContextRenderer)
    }

    #[tokio::test]
    async fn test_index_lists_sections() {
        let (site, _) = blog_site(0).await;
        let handler = IndexHandler::new(site, renderer());

        let (template, context) = rendered(&handler.handle(ListSections).await.unwrap());
        assert_eq!(template, "index.html");
        assert_eq!(context["site_title"], json!("Test Admin"));
        assert_eq!(context["sections"][0]["name"], json!("blog"));
        assert_eq!(
            context["sections"][0]["entities"][0]["changelist_url"],
            json!("/admin/blog/post")
        );
    }

    #[tokio::test]
    async fn test_change_list_paginates_by_25() {
        let (site, _) = blog_site(30).await;
        let handler = ChangeListHandler::new(site, renderer());

        let query = GetChangeList {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            page: Some("2".to_string()),
        };
        let (template, context) = rendered(&handler.handle(query).await.unwrap());

        assert_eq!(template, "changelist.html");
        assert_eq!(context["count"], json!(30));
        assert_eq!(context["page"], json!(2));
        assert_eq!(context["results_per_page"], json!(25));
        assert_eq!(context["entities"].as_array().unwrap().len(), 5);
        assert_eq!(context["entities"][0]["id"], json!(26));
        assert_eq!(context["pagination"]["total_pages"], json!(2));
        assert_eq!(context["rows"][0]["change_url"], json!("/admin/blog/post/26/change"));
    }

    #[tokio::test]
    async fn test_change_list_defaults_to_first_page() {
        let (site, _) = blog_site(3).await;
        let handler = ChangeListHandler::new(site, renderer());

        let query = GetChangeList {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            page: None,
        };
        let (_, context) = rendered(&handler.handle(query).await.unwrap());
        assert_eq!(context["page"], json!(1));
        assert_eq!(context["entities"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_change_list_rejects_bad_page() {
        let (site, _) = blog_site(3).await;
        let handler = ChangeListHandler::new(site, renderer());

        let query = GetChangeList {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            page: Some("abc".to_string()),
        };
        assert!(matches!(
            handler.handle(query).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_add_form() {
        let (site, _) = blog_site(0).await;
        let handler = AddFormHandler::new(site, renderer());

        let query = GetAddForm {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
        };
        let (template, context) = rendered(&handler.handle(query).await.unwrap());
        assert_eq!(template, "add.html");
        assert_eq!(context["metadata"]["name"], json!("post"));
        assert_eq!(context["fields"].as_array().unwrap().len(), 3);
        assert_eq!(context["urls"]["add_url"], json!("/admin/blog/post/add"));
    }

    #[tokio::test]
    async fn test_change_form_and_missing_entity() {
        let (site, _) = blog_site(2).await;
        let handler = ChangeFormHandler::new(site, renderer());

        let query = GetChangeForm {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "2".to_string(),
        };
        let (template, context) = rendered(&handler.handle(query).await.unwrap());
        assert_eq!(template, "change.html");
        assert_eq!(context["entity"]["title"], json!("Post 2"));
        assert_eq!(context["urls"]["delete_url"], json!("/admin/blog/post/2/delete"));

        let query = GetChangeForm {
            section_name: "blog".to_string(),
            entity_name: "post".to_string(),
            primary_key: "42".to_string(),
        };
        assert!(matches!(
            handler.handle(query).await,
            Err(ApplicationError::NotFound { .. })
        ));
    }
}
