//! Data Transfer Objects - 路径与查询参数

use serde::Deserialize;

/// `/admin/:section/:entity`
#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub section: String,
    pub entity: String,
}

/// `/admin/:section/:entity/:pk/...`
#[derive(Debug, Deserialize)]
pub struct RecordPath {
    pub section: String,
    pub entity: String,
    pub pk: String,
}

/// 列表页查询参数
///
/// page 保留原始字符串，由分页逻辑校验
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}
