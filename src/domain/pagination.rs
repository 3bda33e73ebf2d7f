//! Pagination - 列表分页

use serde::Serialize;

use super::errors::PaginationError;

/// 每页默认条数
pub const RESULTS_PER_PAGE: u32 = 25;

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    results_per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, results_per_page: u32) -> Self {
        Self {
            page: page.max(1),
            results_per_page: results_per_page.max(1),
        }
    }

    /// 解析 `?page=` 查询参数
    ///
    /// 缺省或为空时为第 1 页，小于 1 的页码按第 1 页处理
    pub fn parse(param: Option<&str>, results_per_page: u32) -> Result<Self, PaginationError> {
        let page = match param.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| PaginationError::InvalidPage(raw.to_string()))?;
                value.clamp(1, u32::MAX as i64) as u32
            }
        };
        Ok(Self::new(page, results_per_page))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn results_per_page(&self) -> u32 {
        self.results_per_page
    }

    /// 跳过的记录数: results_per_page × (page − 1)
    pub fn skip(&self) -> u64 {
        self.results_per_page as u64 * (self.page as u64 - 1)
    }

    pub fn take(&self) -> u64 {
        self.results_per_page as u64
    }

    /// 总页数（至少为 1）
    pub fn total_pages(&self, count: u64) -> u32 {
        let pages = count.div_ceil(self.results_per_page as u64).max(1);
        pages.min(u32::MAX as u64) as u32
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, count: u64) -> bool {
        self.skip() + self.take() < count
    }
}
