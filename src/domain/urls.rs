//! Admin URLs

use urlencoding::encode;

/// 管理后台挂载路径
pub const ADMIN_ROOT: &str = "/admin";

pub fn index_url() -> String {
    ADMIN_ROOT.to_string()
}

pub fn changelist_url(section: &str, entity: &str) -> String {
    format!("{}/{}/{}", ADMIN_ROOT, encode(section), encode(entity))
}

pub fn changelist_page_url(section: &str, entity: &str, page: u32) -> String {
    format!("{}?page={}", changelist_url(section, entity), page)
}

pub fn add_url(section: &str, entity: &str) -> String {
    format!("{}/add", changelist_url(section, entity))
}

pub fn change_url(section: &str, entity: &str, primary_key: &str) -> String {
    format!(
        "{}/{}/change",
        changelist_url(section, entity),
        encode(primary_key)
    )
}

pub fn delete_url(section: &str, entity: &str, primary_key: &str) -> String {
    format!(
        "{}/{}/delete",
        changelist_url(section, entity),
        encode(primary_key)
    )
}
