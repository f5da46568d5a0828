//! Page settings

use serde::Deserialize;
use serde::Serialize;

/// Paging configuration.
///
/// # Example
///
/// ```
/// use datagrid_lib::settings::PageSettings;
///
/// let page = PageSettings::default().with_page_size(0).resolve();
/// assert_eq!(page.page_size, PageSettings::DEFAULT_PAGE_SIZE);
/// assert_eq!(page.total_pages(30), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettings {
    /// Default: true
    pub enabled: bool,
    /// Records per page. Default: 12
    pub page_size: usize,
    /// Number of page links a pager shows. Default: 8
    pub page_count: usize,
    /// 1-based current page. Default: 1
    pub current_page: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: Self::DEFAULT_PAGE_SIZE,
            page_count: Self::DEFAULT_PAGE_COUNT,
            current_page: 1,
        }
    }
}

impl PageSettings {
    pub const DEFAULT_PAGE_SIZE: usize = 12;
    pub const DEFAULT_PAGE_COUNT: usize = 8;

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_current_page(mut self, current_page: usize) -> Self {
        self.current_page = current_page;
        self
    }

    /// Number of pages for `total` records; at least 1.
    pub fn total_pages(&self, total: usize) -> usize {
        let size = if self.page_size < 1 {
            Self::DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        };
        total.div_ceil(size).max(1)
    }

    /// Copy with sizes clamped to their defaults and the page to at least 1.
    pub fn resolve(&self) -> Self {
        let mut resolved = self.clone();
        if resolved.page_size < 1 {
            resolved.page_size = Self::DEFAULT_PAGE_SIZE;
        }
        if resolved.page_count < 1 {
            resolved.page_count = Self::DEFAULT_PAGE_COUNT;
        }
        resolved.current_page = resolved.current_page.max(1);
        resolved
    }
}
