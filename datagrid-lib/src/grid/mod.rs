//! The grid facade.
//!
//! [`Grid`] owns the columns, the settings snapshot, the data operations and
//! the focus strategy. Every settings change goes through a begin event (which
//! may cancel it), a refresh of the current view and a completion event.

mod columns;
mod edit;
pub mod events;
mod filter;
mod focus;
mod page;
mod search;
mod sort;

pub use columns::RowInfo;
pub use events::*;

use gridnav::CellFocusArgs;
use gridnav::FocusEvent;
use gridnav::FocusStrategy;

use crate::data::DataBinding;
use crate::data::DataChangeRequestArgs;
use crate::data::DataOperations;
use crate::data::DataRequestArgs;
use crate::error::Error;
use crate::model::Column;
use crate::model::assign_uids;
use crate::query::DataResult;
use crate::query::Query;
use crate::query::QueryBuilder;
use crate::settings::GridSettings;

/// Header rows in the navigation matrices.
const HEADER_ROWS: usize = 1;

/// A headless data grid.
///
/// # Example
///
/// ```
/// use datagrid_lib::data::DataBinding;
/// use datagrid_lib::model::{Column, Record};
/// use datagrid_lib::query::Direction;
/// use datagrid_lib::source::InMemorySource;
/// use datagrid_lib::{Grid, GridSettings};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = InMemorySource::new(vec![
///     Record::new().set("OrderID", 10248).set("Freight", 32.38),
///     Record::new().set("OrderID", 10249).set("Freight", 11.61),
/// ]);
/// let columns = vec![Column::new("OrderID").primary_key(), Column::new("Freight")];
/// let mut grid = Grid::new(columns, GridSettings::default(), DataBinding::source(source));
/// grid.refresh().await.unwrap();
///
/// grid.sort_by_column("Freight", Direction::Ascending, false).await.unwrap();
/// assert_eq!(grid.current_view().result[0].get_i64("OrderID"), Some(10249));
/// # });
/// ```
pub struct Grid {
    columns: Vec<Column>,
    settings: GridSettings,
    data: DataOperations,
    focus: FocusStrategy,
    view: DataResult,
    events: GridEvents,
    focus_events: Vec<FocusEvent>,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("columns", &self.columns.len())
            .field("settings", &self.settings)
            .field("data", &self.data)
            .field("focus", &self.focus)
            .field("rows", &self.view.len())
            .finish()
    }
}

impl Grid {
    /// Creates a grid. Columns without a uid get `grid-column{n}`; settings
    /// are resolved. Call [`refresh`](Self::refresh) to load the first view.
    pub fn new(mut columns: Vec<Column>, settings: GridSettings, binding: impl Into<DataBinding>) -> Self {
        assign_uids(&mut columns);
        let settings = settings.resolve();
        let focus = FocusStrategy::new(settings.focus_options());
        let mut grid = Self {
            columns,
            settings,
            data: DataOperations::new(binding),
            focus,
            view: DataResult::default(),
            events: GridEvents::default(),
            focus_events: Vec::new(),
        };
        grid.rebuild_matrices();
        grid
    }

    /// Table reference for queries and writes.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.data = self.data.with_table(table);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Replaces all settings and reloads the view.
    pub async fn set_settings(&mut self, settings: GridSettings) -> Result<(), Error> {
        self.apply_settings(settings).await?;
        self.focus.set_options(self.settings.focus_options());
        Ok(())
    }

    /// The records currently shown.
    pub fn current_view(&self) -> &DataResult {
        &self.view
    }

    pub fn data(&self) -> &DataOperations {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataOperations {
        &mut self.data
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Composes the query for the current settings.
    pub fn build_query(&self, skip_page: bool, requires_count: bool) -> Query {
        QueryBuilder::new(&self.columns, &self.settings)
            .protocol(self.data.protocol())
            .maybe_table(self.data.table())
            .skip_page(skip_page)
            .requires_count(requires_count)
            .build()
    }

    /// Runs the query for the current settings without touching the view.
    pub async fn get_data(&mut self, skip_page: bool, requires_count: bool) -> Result<DataResult, Error> {
        let query = self.build_query(skip_page, requires_count);
        self.data.get_data(&query).await
    }

    /// Reloads the current view and rebuilds the navigation matrices.
    ///
    /// On failure the last view is kept.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let query = self.build_query(false, true);
        self.view = self.data.get_data(&query).await?;
        log::debug!("[grid] view refreshed: {} of {} records", self.view.len(), self.view.count);
        self.rebuild_matrices();
        Ok(())
    }

    /// Swaps in `settings` and refreshes; restores the previous settings if
    /// the refresh fails.
    async fn apply_settings(&mut self, settings: GridSettings) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.settings, settings.resolve());
        if let Err(e) = self.refresh().await {
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    // =========================================================================
    // Event registration
    // =========================================================================

    pub fn on_search_start(&mut self, handler: impl FnMut(&mut SearchArgs) + Send + 'static) {
        self.events.search_start = Some(Box::new(handler));
    }

    pub fn on_search(&mut self, handler: impl FnMut(&mut SearchArgs) + Send + 'static) {
        self.events.search = Some(Box::new(handler));
    }

    pub fn on_sort_start(&mut self, handler: impl FnMut(&mut SortArgs) + Send + 'static) {
        self.events.sort_start = Some(Box::new(handler));
    }

    pub fn on_sort(&mut self, handler: impl FnMut(&mut SortArgs) + Send + 'static) {
        self.events.sort = Some(Box::new(handler));
    }

    pub fn on_filter_start(&mut self, handler: impl FnMut(&mut FilterArgs) + Send + 'static) {
        self.events.filter_start = Some(Box::new(handler));
    }

    pub fn on_filter(&mut self, handler: impl FnMut(&mut FilterArgs) + Send + 'static) {
        self.events.filter = Some(Box::new(handler));
    }

    pub fn on_page_change_start(&mut self, handler: impl FnMut(&mut PageChangeArgs) + Send + 'static) {
        self.events.page_change_start = Some(Box::new(handler));
    }

    pub fn on_page_change(&mut self, handler: impl FnMut(&mut PageChangeArgs) + Send + 'static) {
        self.events.page_change = Some(Box::new(handler));
    }

    /// Cancelable hook run before any focus move.
    pub fn on_cell_focus_start(&mut self, handler: impl FnMut(&mut CellFocusArgs) + Send + 'static) {
        self.focus.on_before_focus(handler);
    }

    pub fn on_cell_focus(&mut self, handler: impl FnMut(&mut CellFocusedArgs) + Send + 'static) {
        self.events.cell_focus = Some(Box::new(handler));
    }

    pub fn on_cell_click(&mut self, handler: impl FnMut(&mut CellClickArgs) + Send + 'static) {
        self.events.cell_click = Some(Box::new(handler));
    }

    pub fn on_data_request(&mut self, handler: impl FnMut(DataRequestArgs) + Send + 'static) {
        self.data.on_data_request(handler);
    }

    pub fn on_data_change_request(&mut self, handler: impl FnMut(DataChangeRequestArgs) + Send + 'static) {
        self.data.on_data_change_request(handler);
    }

    pub fn on_error(&mut self, handler: impl FnMut(&Error) + Send + 'static) {
        self.data.on_error(handler);
    }
}
