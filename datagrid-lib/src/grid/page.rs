use super::Grid;
use super::PageChangeArgs;
use super::events::fire;
use crate::data::Outcome;
use crate::error::Error;

impl Grid {
    /// Pages available for the current record count; at least 1.
    pub fn total_pages(&self) -> usize {
        self.settings.page_settings.total_pages(self.view.count)
    }

    pub fn current_page(&self) -> usize {
        self.settings.page_settings.current_page
    }

    /// Moves to page `page`. Out-of-range and current pages are no-ops.
    pub async fn go_to_page(&mut self, page: usize) -> Result<Outcome, Error> {
        let current = self.current_page();
        if !self.settings.page_settings.enabled || page < 1 || page > self.total_pages() || page == current {
            return Ok(Outcome::Unchanged);
        }

        let mut args = PageChangeArgs {
            previous_page: current,
            current_page: page,
            cancel: false,
        };
        fire(&mut self.events.page_change_start, &mut args);
        if args.cancel {
            return Ok(Outcome::Cancelled);
        }

        let mut settings = self.settings.clone();
        settings.page_settings.current_page = args.current_page;
        self.apply_settings(settings).await?;
        fire(&mut self.events.page_change, &mut args);
        Ok(Outcome::Completed(()))
    }

    pub async fn next_page(&mut self) -> Result<Outcome, Error> {
        self.go_to_page(self.current_page() + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<Outcome, Error> {
        match self.current_page().checked_sub(1) {
            Some(page) => self.go_to_page(page).await,
            None => Ok(Outcome::Unchanged),
        }
    }
}
