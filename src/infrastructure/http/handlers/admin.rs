//! Admin HTTP Handlers
//!
//! 页面以 HTML 返回；新建和删除成功后 303 重定向

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::{
    CreateEntity, DeleteEntity, GetAddForm, GetChangeForm, GetChangeList, ListSections,
    UpdateEntity,
};
use crate::infrastructure::http::dto::{EntityPath, PageQuery, RecordPath};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// GET /admin
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let page = state.index_handler.handle(ListSections).await?;
    Ok(Html(page))
}

/// GET /admin/:section/:entity?page=N
pub async fn change_list(
    State(state): State<Arc<AppState>>,
    Path(path): Path<EntityPath>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .change_list_handler
        .handle(GetChangeList {
            section_name: path.section,
            entity_name: path.entity,
            page: query.page,
        })
        .await?;
    Ok(Html(page))
}

/// GET /admin/:section/:entity/add
pub async fn add_form(
    State(state): State<Arc<AppState>>,
    Path(path): Path<EntityPath>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .add_form_handler
        .handle(GetAddForm {
            section_name: path.section,
            entity_name: path.entity,
        })
        .await?;
    Ok(Html(page))
}

/// POST /admin/:section/:entity/add
pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    Path(path): Path<EntityPath>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    let location = state
        .create_entity_handler
        .handle(CreateEntity {
            section_name: path.section,
            entity_name: path.entity,
            values,
        })
        .await?;
    Ok(Redirect::to(&location))
}

/// GET /admin/:section/:entity/:pk/change
pub async fn change_form(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RecordPath>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .change_form_handler
        .handle(GetChangeForm {
            section_name: path.section,
            entity_name: path.entity,
            primary_key: path.pk,
        })
        .await?;
    Ok(Html(page))
}

/// POST /admin/:section/:entity/:pk/change
pub async fn update_entity(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RecordPath>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .update_entity_handler
        .handle(UpdateEntity {
            section_name: path.section,
            entity_name: path.entity,
            primary_key: path.pk,
            values,
        })
        .await?;
    Ok(Html(page))
}

/// POST /admin/:section/:entity/:pk/delete
pub async fn delete_entity(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RecordPath>,
) -> Result<Redirect, ApiError> {
    let location = state
        .delete_entity_handler
        .handle(DeleteEntity {
            section_name: path.section,
            entity_name: path.entity,
            primary_key: path.pk,
        })
        .await?;
    Ok(Redirect::to(&location))
}
