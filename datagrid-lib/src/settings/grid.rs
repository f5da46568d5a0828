//! Combined grid settings

use gridnav::FocusOptions;
use gridnav::Platform;
use serde::Deserialize;
use serde::Serialize;

use super::AggregateSettings;
use super::EditSettings;
use super::FilterSettings;
use super::PageSettings;
use super::SearchSettings;
use super::SortSettings;
use crate::error::ConfigError;

/// Every feature setting of a grid.
///
/// # Example
///
/// ```
/// use datagrid_lib::settings::GridSettings;
///
/// let settings = GridSettings::from_json(
///     r#"{ "pageSettings": { "pageSize": 10 }, "sortSettings": { "mode": "Single" } }"#,
/// )
/// .unwrap();
/// assert_eq!(settings.page_settings.page_size, 10);
/// assert_eq!(settings.page_settings.page_count, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSettings {
    pub sort_settings: SortSettings,
    pub filter_settings: FilterSettings,
    pub search_settings: SearchSettings,
    pub page_settings: PageSettings,
    pub edit_settings: EditSettings,
    pub aggregate_settings: AggregateSettings,
    /// Right-to-left layout; mirrors horizontal arrow keys.
    pub enable_rtl: bool,
    /// Host platform for modifier aliases. Not part of the serialized form.
    #[serde(skip)]
    pub platform: Platform,
}

impl GridSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses camelCase JSON; missing keys take their defaults. The result
    /// is resolved.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.resolve())
    }

    pub fn with_sort_settings(mut self, settings: SortSettings) -> Self {
        self.sort_settings = settings;
        self
    }

    pub fn with_filter_settings(mut self, settings: FilterSettings) -> Self {
        self.filter_settings = settings;
        self
    }

    pub fn with_search_settings(mut self, settings: SearchSettings) -> Self {
        self.search_settings = settings;
        self
    }

    pub fn with_page_settings(mut self, settings: PageSettings) -> Self {
        self.page_settings = settings;
        self
    }

    pub fn with_edit_settings(mut self, settings: EditSettings) -> Self {
        self.edit_settings = settings;
        self
    }

    pub fn with_aggregate_settings(mut self, settings: AggregateSettings) -> Self {
        self.aggregate_settings = settings;
        self
    }

    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.enable_rtl = rtl;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Focus options derived from these settings.
    pub fn focus_options(&self) -> FocusOptions {
        FocusOptions {
            rtl: self.enable_rtl,
            platform: self.platform,
        }
    }

    /// Resolves every feature setting.
    pub fn resolve(&self) -> Self {
        Self {
            sort_settings: self.sort_settings.resolve(),
            filter_settings: self.filter_settings.resolve(),
            search_settings: self.search_settings.resolve(),
            page_settings: self.page_settings.resolve(),
            edit_settings: self.edit_settings,
            aggregate_settings: self.aggregate_settings.resolve(),
            enable_rtl: self.enable_rtl,
            platform: self.platform,
        }
    }
}
