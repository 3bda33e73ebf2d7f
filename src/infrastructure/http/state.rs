//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateEntityHandler, DeleteEntityHandler, UpdateEntityHandler,
    // Query handlers
    AddFormHandler, ChangeFormHandler, ChangeListHandler, IndexHandler,
    // Site & ports
    AdminSite, TemplateRendererPort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub create_entity_handler: CreateEntityHandler,
    pub update_entity_handler: UpdateEntityHandler,
    pub delete_entity_handler: DeleteEntityHandler,

    // ========== Query Handlers ==========
    pub index_handler: IndexHandler,
    pub change_list_handler: ChangeListHandler,
    pub add_form_handler: AddFormHandler,
    pub change_form_handler: ChangeFormHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(site: Arc<AdminSite>, renderer: Arc<dyn TemplateRendererPort>) -> Self {
        Self {
            // Command handlers
            create_entity_handler: CreateEntityHandler::new(site.clone()),
            update_entity_handler: UpdateEntityHandler::new(site.clone(), renderer.clone()),
            delete_entity_handler: DeleteEntityHandler::new(site.clone()),

            // Query handlers
            index_handler: IndexHandler::new(site.clone(), renderer.clone()),
            change_list_handler: ChangeListHandler::new(site.clone(), renderer.clone()),
            add_form_handler: AddFormHandler::new(site.clone(), renderer.clone()),
            change_form_handler: ChangeFormHandler::new(site, renderer),
        }
    }
}
