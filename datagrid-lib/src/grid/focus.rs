use gridnav::ColumnLayout;
use gridnav::FocusEvent;
use gridnav::FocusedCellInfo;
use gridnav::KeyInput;
use gridnav::NavOutcome;
use gridnav::NavigationMatrix;
use gridnav::NextCellDirection;
use gridnav::Region;
use gridnav::ScrollRequest;

use super::CellClickArgs;
use super::CellFocusedArgs;
use super::Grid;
use super::HEADER_ROWS;
use super::events::fire;

impl Grid {
    /// Rebuilds the navigation matrices from column visibility, the view's
    /// row count and the aggregate rows.
    pub(crate) fn rebuild_matrices(&mut self) {
        let visible: Vec<bool> = self.columns.iter().map(|c| c.visible).collect();
        self.focus.rebuild(
            &visible,
            HEADER_ROWS,
            self.view.len(),
            self.settings.aggregate_settings.row_count(),
        );
        self.dispatch_focus_events();
    }

    /// Forwards queued focus events to `on_cell_focus` and keeps them for
    /// [`take_focus_events`](Self::take_focus_events).
    fn dispatch_focus_events(&mut self) {
        for event in self.focus.take_events() {
            if let FocusEvent::Focused(cell) = event {
                fire(&mut self.events.cell_focus, &mut CellFocusedArgs { cell });
            }
            self.focus_events.push(event);
        }
    }

    fn track(&mut self, outcome: NavOutcome) -> NavOutcome {
        self.dispatch_focus_events();
        outcome
    }

    /// Focus changes since the last call, for the rendering layer.
    pub fn take_focus_events(&mut self) -> Vec<FocusEvent> {
        std::mem::take(&mut self.focus_events)
    }

    /// Vertical scroll the host should apply on its next frame.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.focus.take_scroll_request()
    }

    /// Column widths and viewport size, for scroll reveal and page keys.
    pub fn set_layout(&mut self, layout: ColumnLayout) {
        self.focus.set_layout(layout);
    }

    pub fn handle_key(&mut self, input: impl Into<KeyInput>) -> NavOutcome {
        let outcome = self.focus.handle_key(input.into());
        self.track(outcome)
    }

    /// Pointer focus on a cell; raises `on_cell_click`.
    pub fn cell_clicked(&mut self, region: Region, row: usize, col: usize) -> NavOutcome {
        let outcome = self.focus.cell_clicked(region, row, col);
        let outcome = self.track(outcome);
        let mut args = CellClickArgs {
            region,
            row_index: row,
            col_index: col,
            focused: matches!(outcome, NavOutcome::Moved(_)),
        };
        fire(&mut self.events.cell_click, &mut args);
        outcome
    }

    pub fn navigate_to_cell(&mut self, row: usize, col: usize, region: Region) -> NavOutcome {
        let outcome = self.focus.navigate_to_cell(row, col, region);
        self.track(outcome)
    }

    pub fn navigate_to_first_cell(&mut self) -> NavOutcome {
        let outcome = self.focus.navigate_to_first_cell();
        self.track(outcome)
    }

    pub fn navigate_to_last_cell(&mut self) -> NavOutcome {
        let outcome = self.focus.navigate_to_last_cell();
        self.track(outcome)
    }

    pub fn navigate_to_next_cell(&mut self, direction: NextCellDirection) -> NavOutcome {
        let outcome = self.focus.navigate_to_next_cell(direction);
        self.track(outcome)
    }

    pub fn set_active_matrix(&mut self, region: Region) {
        self.focus.set_active_matrix(region);
    }

    pub fn active_matrix(&self) -> Region {
        self.focus.active_matrix()
    }

    pub fn header_matrix(&self) -> &NavigationMatrix {
        self.focus.header_matrix()
    }

    pub fn content_matrix(&self) -> &NavigationMatrix {
        self.focus.content_matrix()
    }

    pub fn aggregate_matrix(&self) -> &NavigationMatrix {
        self.focus.aggregate_matrix()
    }

    pub fn focused_cell(&self) -> Option<FocusedCellInfo> {
        self.focus.focused_cell()
    }

    pub fn is_grid_focused(&self) -> bool {
        self.focus.is_grid_focused()
    }

    pub fn has_focus_indicator(&self) -> bool {
        self.focus.has_indicator()
    }

    /// Focus the grid root without selecting a cell.
    pub fn focus(&mut self) -> NavOutcome {
        let outcome = self.focus.focus();
        self.track(outcome)
    }

    pub fn focus_content(&mut self) -> NavOutcome {
        let outcome = self.focus.focus_content();
        self.track(outcome)
    }

    pub fn clear_indicator(&mut self) {
        self.focus.clear_indicator();
        self.dispatch_focus_events();
    }

    pub fn remove_focus(&mut self) {
        self.focus.remove_focus();
        self.dispatch_focus_events();
    }
}
