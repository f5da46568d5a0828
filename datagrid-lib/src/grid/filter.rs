use super::FilterArgs;
use super::Grid;
use super::events::fire;
use crate::data::Outcome;
use crate::error::ConfigError;
use crate::error::Error;
use crate::model::Value;
use crate::query::FilterOperator;
use crate::query::Linkage;
use crate::settings::FilterDescriptor;
use crate::settings::FilterSettings;

impl Grid {
    /// Filters `field` by one condition, replacing the field's earlier
    /// filters. Resets the current page to 1.
    pub async fn filter_by_column(
        &mut self,
        field: &str,
        operator: FilterOperator,
        value: impl Into<Value>,
        predicate: Linkage,
        ignore_accent: bool,
        case_sensitive: bool,
    ) -> Result<Outcome, Error> {
        if !self.settings.filter_settings.enabled {
            return Err(ConfigError::FeatureDisabled("filtering").into());
        }
        let column = self
            .get_column_by_field(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        if !column.allow_filtering {
            return Err(ConfigError::ColumnNotAllowed {
                field: field.to_string(),
                action: "filtering",
            }
            .into());
        }

        let descriptor = FilterDescriptor::new(field, operator, value)
            .with_predicate(predicate)
            .with_ignore_accent(ignore_accent)
            .with_case_sensitive(case_sensitive);
        let mut args = FilterArgs {
            field: Some(field.to_string()),
            operator: Some(operator),
            value: descriptor.value.clone(),
            cancel: false,
        };
        self.change_filter(&mut args, |filter| filter.replace_field(descriptor))
            .await
    }

    /// Removes the filters on `field`.
    pub async fn remove_filter(&mut self, field: &str) -> Result<Outcome, Error> {
        if self.settings.filter_settings.for_field(field).next().is_none() {
            return Ok(Outcome::Unchanged);
        }
        let mut args = FilterArgs {
            field: Some(field.to_string()),
            operator: None,
            value: Value::Null,
            cancel: false,
        };
        self.change_filter(&mut args, |filter| {
            filter.remove_field(field);
        })
        .await
    }

    /// Removes every filter.
    pub async fn clear_filter(&mut self) -> Result<Outcome, Error> {
        if self.settings.filter_settings.columns.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let mut args = FilterArgs {
            field: None,
            operator: None,
            value: Value::Null,
            cancel: false,
        };
        self.change_filter(&mut args, |filter| filter.columns.clear()).await
    }

    async fn change_filter(
        &mut self,
        args: &mut FilterArgs,
        update: impl FnOnce(&mut FilterSettings),
    ) -> Result<Outcome, Error> {
        fire(&mut self.events.filter_start, args);
        if args.cancel {
            return Ok(Outcome::Cancelled);
        }
        let mut settings = self.settings.clone();
        update(&mut settings.filter_settings);
        settings.page_settings.current_page = 1;
        self.apply_settings(settings).await?;
        fire(&mut self.events.filter, args);
        Ok(Outcome::Completed(()))
    }
}
