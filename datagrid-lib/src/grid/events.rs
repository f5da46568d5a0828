//! Grid event payloads

use gridnav::FocusedCellInfo;
use gridnav::Region;

use crate::model::Value;
use crate::query::Direction;
use crate::query::FilterOperator;

/// A registered event handler. Begin-event handlers cancel by setting
/// `cancel` on the payload.
pub type Handler<A> = Box<dyn FnMut(&mut A) + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub value: String,
    pub previous_value: String,
    pub cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArgs {
    /// `None` when all sorting is cleared.
    pub field: Option<String>,
    pub direction: Option<Direction>,
    pub multi: bool,
    pub cancel: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterArgs {
    /// `None` when all filters are cleared.
    pub field: Option<String>,
    pub operator: Option<FilterOperator>,
    pub value: Value,
    pub cancel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChangeArgs {
    pub previous_page: usize,
    pub current_page: usize,
    pub cancel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFocusedArgs {
    pub cell: FocusedCellInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellClickArgs {
    pub region: Region,
    pub row_index: usize,
    pub col_index: usize,
    /// Whether the click moved focus to the cell.
    pub focused: bool,
}

/// Handlers registered on a grid.
#[derive(Default)]
pub(crate) struct GridEvents {
    pub search_start: Option<Handler<SearchArgs>>,
    pub search: Option<Handler<SearchArgs>>,
    pub sort_start: Option<Handler<SortArgs>>,
    pub sort: Option<Handler<SortArgs>>,
    pub filter_start: Option<Handler<FilterArgs>>,
    pub filter: Option<Handler<FilterArgs>>,
    pub page_change_start: Option<Handler<PageChangeArgs>>,
    pub page_change: Option<Handler<PageChangeArgs>>,
    pub cell_focus: Option<Handler<CellFocusedArgs>>,
    pub cell_click: Option<Handler<CellClickArgs>>,
}

/// Calls `handler` if present.
pub(crate) fn fire<A>(handler: &mut Option<Handler<A>>, args: &mut A) {
    if let Some(handler) = handler.as_mut() {
        handler(args);
    }
}
