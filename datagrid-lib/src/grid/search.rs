use super::Grid;
use super::SearchArgs;
use super::events::fire;
use crate::data::Outcome;
use crate::error::ConfigError;
use crate::error::Error;

impl Grid {
    /// Searches the grid for `value`.
    ///
    /// A changed value resets the current page to 1. Filter descriptors are
    /// left alone. An empty value clears the search.
    pub async fn search(&mut self, value: impl Into<String>) -> Result<Outcome, Error> {
        if !self.settings.search_settings.enabled {
            return Err(ConfigError::FeatureDisabled("searching").into());
        }
        let value = value.into();
        let previous_value = self.settings.search_settings.value.clone();
        if value == previous_value {
            return Ok(Outcome::Unchanged);
        }

        let mut args = SearchArgs {
            value,
            previous_value,
            cancel: false,
        };
        fire(&mut self.events.search_start, &mut args);
        if args.cancel {
            log::debug!("[grid] search for {:?} cancelled", args.value);
            return Ok(Outcome::Cancelled);
        }

        let mut settings = self.settings.clone();
        settings.search_settings.value = args.value.clone();
        settings.page_settings.current_page = 1;
        self.apply_settings(settings).await?;

        fire(&mut self.events.search, &mut args);
        Ok(Outcome::Completed(()))
    }
}
