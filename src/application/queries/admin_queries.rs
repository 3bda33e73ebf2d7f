//! Admin Queries

/// 列出所有分区
#[derive(Debug, Clone)]
pub struct ListSections;

/// 获取实体列表页
#[derive(Debug, Clone)]
pub struct GetChangeList {
    pub section_name: String,
    pub entity_name: String,
    /// 原始 `?page=` 参数
    pub page: Option<String>,
}

/// 获取新建表单
#[derive(Debug, Clone)]
pub struct GetAddForm {
    pub section_name: String,
    pub entity_name: String,
}

/// 获取编辑表单
#[derive(Debug, Clone)]
pub struct GetChangeForm {
    pub section_name: String,
    pub entity_name: String,
    pub primary_key: String,
}
