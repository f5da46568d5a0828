use crate::action::{NavAction, Platform};
use crate::event::KeyInput;
use crate::matrix::{Cell, MatrixCache, NavigationMatrix, Region, Step};
use crate::scroll::{ColumnLayout, ScrollRequest, ScrollSync};

/// Behaviour switches for a focus strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Right-to-left layout: Left/Right arrows move in mirrored column order.
    pub rtl: bool,
    pub platform: Platform,
}

/// Named states of the focus state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusState {
    Unfocused,
    HeaderActive,
    ContentActive,
    AggregateActive,
}

/// The logical cell that currently carries focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusedCellInfo {
    pub row_index: usize,
    pub col_index: usize,
    pub region: Region,
    /// Set when the content region has no rows and the empty-record row is focused.
    pub is_placeholder: bool,
}

impl FocusedCellInfo {
    pub fn is_header(&self) -> bool {
        self.region == Region::Header
    }

    pub fn is_aggregate(&self) -> bool {
        self.region == Region::Aggregate
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.row_index, self.col_index)
    }
}

/// Arguments of the cancelable before-focus hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFocusArgs {
    pub previous: Option<FocusedCellInfo>,
    pub target: FocusedCellInfo,
    /// The key action that triggered the move; `None` for pointer or programmatic focus.
    pub action: Option<NavAction>,
    pub cancel: bool,
}

/// Focus changes for the rendering layer, drained with [`FocusStrategy::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    Focused(FocusedCellInfo),
    Blurred(FocusedCellInfo),
    /// Visual focus styling removed; the tracked position may remain.
    IndicatorCleared,
    /// Focus left the grid; the host's natural tab order continues.
    Released,
    /// The grid root took focus without a cell.
    GridFocused,
}

/// Result of one navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(FocusedCellInfo),
    /// A navigation key with nowhere to go (matrix edge).
    Stayed,
    /// The before-focus hook cancelled the move.
    Cancelled,
    /// Boundary escape: focus was relinquished.
    Released,
    GridFocused,
    /// Not a navigation input; no state change.
    Ignored,
}

impl NavOutcome {
    /// Whether the host should suppress the key's default behaviour.
    pub fn is_handled(&self) -> bool {
        !matches!(self, NavOutcome::Ignored | NavOutcome::Released)
    }
}

/// Direction for programmatic single-step navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextCellDirection {
    Up,
    Down,
    Left,
    Right,
    Next,
    Previous,
}

impl From<NextCellDirection> for NavAction {
    fn from(direction: NextCellDirection) -> Self {
        match direction {
            NextCellDirection::Up => NavAction::Up,
            NextCellDirection::Down => NavAction::Down,
            NextCellDirection::Left => NavAction::Left,
            NextCellDirection::Right => NavAction::Right,
            NextCellDirection::Next => NavAction::Tab,
            NextCellDirection::Previous => NavAction::ShiftTab,
        }
    }
}

pub type BeforeFocusHook = Box<dyn FnMut(&mut CellFocusArgs) + Send>;

/// Keyboard and pointer focus over the header, content and aggregate regions.
///
/// Owns one navigation matrix per region. The active region plus
/// `is_grid_focused` form the state machine in [`FocusState`]; every
/// transition goes through the before-focus hook and can be cancelled.
pub struct FocusStrategy {
    header: NavigationMatrix,
    content: NavigationMatrix,
    aggregate: NavigationMatrix,
    active: Region,
    grid_focused: bool,
    focused: Option<FocusedCellInfo>,
    indicator: bool,
    options: FocusOptions,
    cache: MatrixCache,
    layout: Option<ColumnLayout>,
    scroll: ScrollSync,
    pending_scroll: Option<ScrollRequest>,
    events: Vec<FocusEvent>,
    before_focus: Option<BeforeFocusHook>,
    first_focusable_header_cell: Option<Cell>,
    last_focusable_content_cell: Option<Cell>,
    last_focusable_aggregate_cell: Option<Cell>,
}

impl std::fmt::Debug for FocusStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusStrategy")
            .field("active", &self.active)
            .field("grid_focused", &self.grid_focused)
            .field("focused", &self.focused)
            .field("indicator", &self.indicator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for FocusStrategy {
    fn default() -> Self {
        Self::new(FocusOptions::default())
    }
}

impl FocusStrategy {
    pub fn new(options: FocusOptions) -> Self {
        Self {
            header: NavigationMatrix::default(),
            content: NavigationMatrix::placeholder(),
            aggregate: NavigationMatrix::default(),
            active: Region::Content,
            grid_focused: false,
            focused: None,
            indicator: false,
            options,
            cache: MatrixCache::new(),
            layout: None,
            scroll: ScrollSync::new(),
            pending_scroll: None,
            events: Vec::new(),
            before_focus: None,
            first_focusable_header_cell: None,
            last_focusable_content_cell: None,
            last_focusable_aggregate_cell: None,
        }
    }

    pub fn options(&self) -> FocusOptions {
        self.options
    }

    /// Replace the behaviour switches; focus and matrices are kept.
    pub fn set_options(&mut self, options: FocusOptions) {
        self.options = options;
    }

    /// Register the cancelable before-focus hook, replacing any previous one.
    pub fn on_before_focus(&mut self, hook: impl FnMut(&mut CellFocusArgs) + Send + 'static) {
        self.before_focus = Some(Box::new(hook));
    }

    // -------------------------------------------------------------------------
    // Matrices
    // -------------------------------------------------------------------------

    /// Rebuild all three matrices after the row or column set changed.
    ///
    /// Positions that are still occupied survive; a focused cell that vanished
    /// is clamped to the nearest remaining cell of its region.
    pub fn rebuild(
        &mut self,
        visible: &[bool],
        header_rows: usize,
        content_rows: usize,
        aggregate_rows: usize,
    ) {
        let previous = [
            self.header.current(),
            self.content.current(),
            self.aggregate.current(),
        ];
        self.header = self.cache.get(Region::Header, visible, header_rows);
        self.content = self.cache.get(Region::Content, visible, content_rows);
        self.aggregate = self.cache.get(Region::Aggregate, visible, aggregate_rows);

        for (region, cell) in [Region::Header, Region::Content, Region::Aggregate]
            .into_iter()
            .zip(previous)
        {
            if let Some(cell) = cell {
                self.matrix_mut(region).select(cell.row, cell.col);
            }
        }

        self.first_focusable_header_cell = self.header.first_cell();
        self.last_focusable_content_cell = if self.content.is_placeholder() {
            None
        } else {
            self.content.last_cell()
        };
        self.last_focusable_aggregate_cell = self.aggregate.last_cell();

        if let Some(focused) = self.focused {
            let matrix = self.matrix(focused.region);
            if matrix.is_occupied(focused.row_index, focused.col_index) {
                let info = self.info(focused.region, focused.cell());
                self.focused = Some(info);
            } else {
                let clamped = matrix.rows().and_then(|last| {
                    matrix.nearest_in_row(focused.row_index.min(last), focused.col_index)
                });
                log::debug!("[focus] focused cell {:?} vanished, clamped to {:?}", focused, clamped);
                match clamped {
                    Some(cell) => {
                        self.matrix_mut(focused.region).select(cell.row, cell.col);
                        self.focused = Some(self.info(focused.region, cell));
                    }
                    None => {
                        self.focused = None;
                        self.indicator = false;
                    }
                }
            }
        }
    }

    /// Drop memoized matrices so the next rebuild constructs them afresh.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn matrix(&self, region: Region) -> &NavigationMatrix {
        match region {
            Region::Header => &self.header,
            Region::Content => &self.content,
            Region::Aggregate => &self.aggregate,
        }
    }

    fn matrix_mut(&mut self, region: Region) -> &mut NavigationMatrix {
        match region {
            Region::Header => &mut self.header,
            Region::Content => &mut self.content,
            Region::Aggregate => &mut self.aggregate,
        }
    }

    pub fn header_matrix(&self) -> &NavigationMatrix {
        &self.header
    }

    pub fn content_matrix(&self) -> &NavigationMatrix {
        &self.content
    }

    pub fn aggregate_matrix(&self) -> &NavigationMatrix {
        &self.aggregate
    }

    pub fn active_matrix(&self) -> Region {
        self.active
    }

    /// Make `region` authoritative for keyboard navigation without moving focus.
    pub fn set_active_matrix(&mut self, region: Region) {
        self.active = region;
    }

    pub fn first_focusable_header_cell(&self) -> Option<Cell> {
        self.first_focusable_header_cell
    }

    pub fn last_focusable_content_cell(&self) -> Option<Cell> {
        self.last_focusable_content_cell
    }

    pub fn last_focusable_aggregate_cell(&self) -> Option<Cell> {
        self.last_focusable_aggregate_cell
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn state(&self) -> FocusState {
        if !self.grid_focused {
            return FocusState::Unfocused;
        }
        match self.active {
            Region::Header => FocusState::HeaderActive,
            Region::Content => FocusState::ContentActive,
            Region::Aggregate => FocusState::AggregateActive,
        }
    }

    pub fn is_grid_focused(&self) -> bool {
        self.grid_focused
    }

    pub fn focused_cell(&self) -> Option<FocusedCellInfo> {
        self.focused
    }

    /// Whether a cell currently carries visual focus styling.
    pub fn has_indicator(&self) -> bool {
        self.indicator && self.focused.is_some()
    }

    /// Drain focus events produced since the last call.
    pub fn take_events(&mut self) -> Vec<FocusEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    pub fn set_layout(&mut self, layout: ColumnLayout) {
        self.layout = Some(layout);
    }

    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.layout.as_ref()
    }

    pub fn scroll(&self) -> &ScrollSync {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollSync {
        &mut self.scroll
    }

    /// Take the vertical scroll reconciliation queued by page navigation.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    // -------------------------------------------------------------------------
    // Programmatic focus
    // -------------------------------------------------------------------------

    /// Focus the grid root without selecting a cell.
    pub fn focus(&mut self) -> NavOutcome {
        self.grid_focused = true;
        if self.indicator {
            self.indicator = false;
            self.events.push(FocusEvent::IndicatorCleared);
        }
        self.events.push(FocusEvent::GridFocused);
        NavOutcome::GridFocused
    }

    /// Focus the first visible content cell, bypassing the header.
    pub fn focus_content(&mut self) -> NavOutcome {
        match self.content.first_cell() {
            Some(cell) => self.try_focus(Region::Content, cell, Some(NavAction::FocusContent)),
            None => NavOutcome::Stayed,
        }
    }

    pub fn navigate_to_cell(&mut self, row: usize, col: usize, region: Region) -> NavOutcome {
        if !self.matrix(region).is_occupied(row, col) {
            log::debug!("[focus] navigate_to_cell {:?} ({}, {}) is not focusable", region, row, col);
            return NavOutcome::Stayed;
        }
        self.try_focus(region, Cell::new(row, col), None)
    }

    /// Focus the first focusable cell of the grid in reading order.
    pub fn navigate_to_first_cell(&mut self) -> NavOutcome {
        match self.grid_first() {
            Some((region, cell)) => self.try_focus(region, cell, None),
            None => NavOutcome::Stayed,
        }
    }

    /// Focus the last focusable cell of the grid in reading order.
    pub fn navigate_to_last_cell(&mut self) -> NavOutcome {
        match self.grid_last() {
            Some((region, cell)) => self.try_focus(region, cell, None),
            None => NavOutcome::Stayed,
        }
    }

    pub fn navigate_to_next_cell(&mut self, direction: NextCellDirection) -> NavOutcome {
        self.apply(direction.into())
    }

    /// Pointer focus on a cell.
    pub fn cell_clicked(&mut self, region: Region, row: usize, col: usize) -> NavOutcome {
        self.navigate_to_cell(row, col, region)
    }

    /// Remove visual focus styling, keeping the tracked position.
    pub fn clear_indicator(&mut self) {
        if self.indicator {
            self.indicator = false;
            self.events.push(FocusEvent::IndicatorCleared);
        }
    }

    /// Drop all focus state: indicator, tracked positions and grid focus.
    pub fn remove_focus(&mut self) {
        if let Some(previous) = self.focused.take() {
            self.events.push(FocusEvent::Blurred(previous));
        }
        self.clear_indicator();
        self.header.clear();
        self.content.clear();
        self.aggregate.clear();
        self.grid_focused = false;
    }

    // -------------------------------------------------------------------------
    // Keyboard
    // -------------------------------------------------------------------------

    /// Process a key press.
    pub fn handle_key(&mut self, input: KeyInput) -> NavOutcome {
        match NavAction::from_key(input, self.options.platform) {
            Some(action) => {
                let outcome = self.apply(action);
                log::debug!("[focus] key {:?} -> {:?} -> {:?}", input, action, outcome);
                outcome
            }
            None => NavOutcome::Ignored,
        }
    }

    /// Run one transition of the state machine.
    pub fn apply(&mut self, action: NavAction) -> NavOutcome {
        match action {
            NavAction::FocusGrid => return self.focus(),
            NavAction::FocusContent => return self.focus_content(),
            _ => {}
        }

        let Some(current) = self.focused else {
            return self.enter(action);
        };
        let region = current.region;
        let cell = current.cell();

        match action {
            NavAction::Up | NavAction::ShiftEnter => self.vertical(region, cell, Step::Up, action),
            NavAction::Down | NavAction::Enter => self.vertical(region, cell, Step::Down, action),
            NavAction::Left => {
                let step = if self.options.rtl { Step::Right } else { Step::Left };
                self.horizontal(region, cell, step, action)
            }
            NavAction::Right => {
                let step = if self.options.rtl { Step::Left } else { Step::Right };
                self.horizontal(region, cell, step, action)
            }
            NavAction::Tab => self.tab(region, cell, true),
            NavAction::ShiftTab => self.tab(region, cell, false),
            NavAction::Home => {
                let target = self.matrix(region).first_in_row(cell.row);
                self.focus_target(region, target, action)
            }
            NavAction::End => {
                let target = self.matrix(region).last_in_row(cell.row);
                self.focus_target(region, target, action)
            }
            NavAction::CtrlHome => {
                let target = self.matrix(region).first_cell();
                self.focus_target(region, target, action)
            }
            NavAction::CtrlEnd => {
                let target = self.matrix(region).last_cell();
                self.focus_target(region, target, action)
            }
            NavAction::PageUp => self.page(region, cell, false),
            NavAction::PageDown => self.page(region, cell, true),
            NavAction::FocusGrid | NavAction::FocusContent => NavOutcome::Ignored,
        }
    }

    /// Navigation while no cell is focused.
    fn enter(&mut self, action: NavAction) -> NavOutcome {
        let target = match action {
            NavAction::Tab => self.grid_first(),
            NavAction::ShiftTab => self.grid_last(),
            _ if self.grid_focused => {
                let active = self.active;
                match self.matrix(active).first_cell() {
                    Some(cell) => Some((active, cell)),
                    None => self.grid_first(),
                }
            }
            _ => return NavOutcome::Ignored,
        };
        match target {
            Some((region, cell)) => self.try_focus(region, cell, Some(action)),
            None => NavOutcome::Stayed,
        }
    }

    fn vertical(&mut self, region: Region, cell: Cell, step: Step, action: NavAction) -> NavOutcome {
        if let Some(next) = self.matrix(region).step_from(cell, step) {
            return self.try_focus(region, next, Some(action));
        }
        let down = step == Step::Down;
        let candidates: &[Region] = match (region, down) {
            (Region::Header, true) => &[Region::Content, Region::Aggregate],
            (Region::Content, true) => &[Region::Aggregate],
            (Region::Aggregate, false) => &[Region::Content, Region::Header],
            (Region::Content, false) => &[Region::Header],
            _ => &[],
        };
        for &next_region in candidates {
            let matrix = self.matrix(next_region);
            let row = if down { Some(0) } else { matrix.rows() };
            if let Some(target) = row.and_then(|row| matrix.nearest_in_row(row, cell.col)) {
                log::debug!("[focus] {:?} crosses {:?} -> {:?}", action, region, next_region);
                return self.try_focus(next_region, target, Some(action));
            }
        }
        NavOutcome::Stayed
    }

    fn horizontal(&mut self, region: Region, cell: Cell, step: Step, action: NavAction) -> NavOutcome {
        let target = self.matrix(region).step_from(cell, step);
        self.focus_target(region, target, action)
    }

    fn tab(&mut self, region: Region, cell: Cell, forward: bool) -> NavOutcome {
        let action = if forward { NavAction::Tab } else { NavAction::ShiftTab };
        let matrix = self.matrix(region);
        let within = if forward {
            matrix.next_in_reading_order(cell)
        } else {
            matrix.previous_in_reading_order(cell)
        };
        if let Some(next) = within {
            return self.try_focus(region, next, Some(action));
        }

        let candidates: &[Region] = match (region, forward) {
            (Region::Header, true) => &[Region::Content, Region::Aggregate],
            (Region::Content, true) => &[Region::Aggregate],
            (Region::Aggregate, false) => &[Region::Content, Region::Header],
            (Region::Content, false) => &[Region::Header],
            _ => &[],
        };
        for &next_region in candidates {
            let matrix = self.matrix(next_region);
            // An empty-record row is not a tab stop.
            if matrix.is_placeholder() {
                continue;
            }
            let target = if forward {
                matrix.first_cell()
            } else {
                matrix.last_cell()
            };
            if let Some(target) = target {
                log::debug!("[focus] {:?} crosses {:?} -> {:?}", action, region, next_region);
                return self.try_focus(next_region, target, Some(action));
            }
        }

        self.release()
    }

    fn page(&mut self, region: Region, cell: Cell, down: bool) -> NavOutcome {
        let Some(layout) = self.layout.as_ref().filter(|l| l.is_scrollable()) else {
            return NavOutcome::Ignored;
        };
        if region != Region::Content {
            return NavOutcome::Ignored;
        }
        let rows_per_page = layout.rows_per_page();
        let row_height = layout.row_height;
        let viewport_height = layout.viewport_height;
        let Some(last_row) = self.content.rows() else {
            return NavOutcome::Stayed;
        };
        let row = if down {
            (cell.row + rows_per_page).min(last_row)
        } else {
            cell.row.saturating_sub(rows_per_page)
        };
        let target = self.content.nearest_in_row(row, cell.col);
        let action = if down { NavAction::PageDown } else { NavAction::PageUp };
        let outcome = self.focus_target(region, target, action);
        if let NavOutcome::Moved(info) = outcome {
            let row = u32::try_from(info.row_index).unwrap_or(u32::MAX);
            let top = if down {
                row.saturating_add(1)
                    .saturating_mul(row_height)
                    .saturating_sub(viewport_height)
            } else {
                row.saturating_mul(row_height)
            };
            self.pending_scroll = Some(ScrollRequest {
                row: info.row_index,
                top,
            });
        }
        outcome
    }

    /// Boundary escape: relinquish every indicator and tracked position.
    fn release(&mut self) -> NavOutcome {
        log::debug!("[focus] releasing focus from {:?}", self.focused);
        self.remove_focus();
        self.events.push(FocusEvent::Released);
        NavOutcome::Released
    }

    fn focus_target(&mut self, region: Region, target: Option<Cell>, action: NavAction) -> NavOutcome {
        match target {
            Some(cell) => self.try_focus(region, cell, Some(action)),
            None => NavOutcome::Stayed,
        }
    }

    fn grid_first(&self) -> Option<(Region, Cell)> {
        [Region::Header, Region::Content, Region::Aggregate]
            .into_iter()
            .find_map(|region| self.matrix(region).first_cell().map(|cell| (region, cell)))
    }

    fn grid_last(&self) -> Option<(Region, Cell)> {
        [Region::Aggregate, Region::Content, Region::Header]
            .into_iter()
            .find_map(|region| self.matrix(region).last_cell().map(|cell| (region, cell)))
    }

    fn info(&self, region: Region, cell: Cell) -> FocusedCellInfo {
        FocusedCellInfo {
            row_index: cell.row,
            col_index: cell.col,
            region,
            is_placeholder: region == Region::Content && self.content.is_placeholder(),
        }
    }

    /// Commit a focus move unless the before-focus hook cancels it.
    fn try_focus(&mut self, region: Region, cell: Cell, action: Option<NavAction>) -> NavOutcome {
        let target = self.info(region, cell);
        let previous = self.focused;

        if previous == Some(target) && self.indicator && self.grid_focused {
            return NavOutcome::Stayed;
        }

        if let Some(hook) = self.before_focus.as_mut() {
            let mut args = CellFocusArgs {
                previous,
                target,
                action,
                cancel: false,
            };
            hook(&mut args);
            if args.cancel {
                log::debug!("[focus] move to {:?} cancelled", target);
                return NavOutcome::Cancelled;
            }
        }

        self.matrix_mut(region).select(cell.row, cell.col);
        self.active = region;
        self.grid_focused = true;
        self.indicator = true;
        self.focused = Some(target);

        if let Some(previous) = previous.filter(|p| *p != target) {
            self.events.push(FocusEvent::Blurred(previous));
        }
        self.events.push(FocusEvent::Focused(target));

        if !target.is_placeholder {
            if let Some(layout) = self.layout.as_ref() {
                self.scroll.reveal(layout, cell.col);
            }
        }

        NavOutcome::Moved(target)
    }
}
