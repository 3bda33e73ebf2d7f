//! Entity Commands

use std::collections::HashMap;

/// 新建实体
#[derive(Debug, Clone)]
pub struct CreateEntity {
    pub section_name: String,
    pub entity_name: String,
    /// 原始表单字段
    pub values: HashMap<String, String>,
}

/// 更新实体
#[derive(Debug, Clone)]
pub struct UpdateEntity {
    pub section_name: String,
    pub entity_name: String,
    pub primary_key: String,
    pub values: HashMap<String, String>,
}

/// 删除实体
#[derive(Debug, Clone)]
pub struct DeleteEntity {
    pub section_name: String,
    pub entity_name: String,
    pub primary_key: String,
}
