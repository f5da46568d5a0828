use super::Grid;
use super::SortArgs;
use super::events::fire;
use crate::data::Outcome;
use crate::error::ConfigError;
use crate::error::Error;
use crate::query::Direction;
use crate::settings::SortDescriptor;

impl Grid {
    /// Sorts by `field`.
    ///
    /// With `multi` (and multiple sort mode) the descriptor is added after
    /// the existing ones, or updates the field's descriptor in place.
    /// Otherwise it replaces every other sort.
    pub async fn sort_by_column(&mut self, field: &str, direction: Direction, multi: bool) -> Result<Outcome, Error> {
        if !self.settings.sort_settings.enabled {
            return Err(ConfigError::FeatureDisabled("sorting").into());
        }
        let column = self
            .get_column_by_field(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        if !column.allow_sorting {
            return Err(ConfigError::ColumnNotAllowed {
                field: field.to_string(),
                action: "sorting",
            }
            .into());
        }

        let mut args = SortArgs {
            field: Some(field.to_string()),
            direction: Some(direction),
            multi,
            cancel: false,
        };
        self.change_sort(&mut args, |sort| {
            sort.apply(SortDescriptor::new(field, direction), multi);
        })
        .await
    }

    /// Removes the sort on `field`.
    pub async fn remove_sort_column(&mut self, field: &str) -> Result<Outcome, Error> {
        if self.settings.sort_settings.position(field).is_none() {
            return Ok(Outcome::Unchanged);
        }
        let mut args = SortArgs {
            field: Some(field.to_string()),
            direction: None,
            multi: true,
            cancel: false,
        };
        self.change_sort(&mut args, |sort| sort.columns.retain(|d| d.field != field))
            .await
    }

    /// Removes every sort.
    pub async fn clear_sort(&mut self) -> Result<Outcome, Error> {
        if self.settings.sort_settings.columns.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let mut args = SortArgs {
            field: None,
            direction: None,
            multi: false,
            cancel: false,
        };
        self.change_sort(&mut args, |sort| sort.columns.clear()).await
    }

    async fn change_sort(
        &mut self,
        args: &mut SortArgs,
        update: impl FnOnce(&mut crate::settings::SortSettings),
    ) -> Result<Outcome, Error> {
        fire(&mut self.events.sort_start, args);
        if args.cancel {
            return Ok(Outcome::Cancelled);
        }
        let mut settings = self.settings.clone();
        update(&mut settings.sort_settings);
        self.apply_settings(settings).await?;
        fire(&mut self.events.sort, args);
        Ok(Outcome::Completed(()))
    }
}
