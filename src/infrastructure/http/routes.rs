//! HTTP Routes
//!
//! Endpoints:
//! - /ping                                   GET        健康检查
//! - /admin                                  GET        分区首页
//! - /admin/:section/:entity?page=N          GET        实体列表（分页）
//! - /admin/:section/:entity/add             GET/POST   新建表单 / 新建
//! - /admin/:section/:entity/:pk/change      GET/POST   编辑表单 / 更新
//! - /admin/:section/:entity/:pk/delete      POST       删除后重定向到列表

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/admin", admin_routes())
}

/// Admin 路由
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/:section/:entity", get(handlers::change_list))
        .route(
            "/:section/:entity/add",
            get(handlers::add_form).post(handlers::create_entity),
        )
        .route(
            "/:section/:entity/:pk/change",
            get(handlers::change_form).post(handlers::update_entity),
        )
        .route("/:section/:entity/:pk/delete", post(handlers::delete_entity))
}
