use super::Grid;
use crate::data::Outcome;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::SourceError;
use crate::model::Record;
use crate::model::Value;

impl Grid {
    /// Sets one cell of the record keyed `key` in the current view.
    ///
    /// With `persist` the change goes through the write handshake; a failed
    /// or cancelled write restores the previous record.
    pub async fn set_cell_value(
        &mut self,
        key: impl Into<Value>,
        field: &str,
        value: impl Into<Value>,
        persist: bool,
    ) -> Result<Outcome<Record>, Error> {
        let value = value.into();
        let patch = Record::new().set(field, value);
        self.set_row_data(key, patch, persist).await
    }

    /// Merges `data` into the record keyed `key` in the current view.
    pub async fn set_row_data(&mut self, key: impl Into<Value>, data: Record, persist: bool) -> Result<Outcome<Record>, Error> {
        let key = key.into();
        let key_field = self.primary_key()?;
        let Some(index) = self
            .view
            .result
            .iter()
            .position(|r| r.key_matches(&key_field, &key))
        else {
            let error = SourceError::not_found(key_field, &key).into();
            return Err(self.data.report(error));
        };

        let previous = self.view.result[index].clone();
        self.view.result[index].merge(&data);
        if !persist {
            return Ok(Outcome::Completed(self.view.result[index].clone()));
        }

        let mut patch = data;
        patch.insert(key_field.clone(), key);
        match self.data.update(&key_field, patch).await {
            Ok(Outcome::Completed(_)) => Ok(Outcome::Completed(self.view.result[index].clone())),
            Ok(outcome) => {
                self.view.result[index] = previous;
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("[grid] rolling back row {} after failed update", index);
                self.view.result[index] = previous;
                Err(e)
            }
        }
    }

    /// Inserts `record` at `index` and reloads the view.
    pub async fn add_record(&mut self, record: Record, index: usize) -> Result<Outcome<Record>, Error> {
        if !self.settings.edit_settings.allow_adding {
            return Err(ConfigError::FeatureDisabled("adding").into());
        }
        let outcome = self.data.insert(record, index).await?;
        self.refresh_after(outcome).await
    }

    /// Updates the record identified by its primary key and reloads the view.
    pub async fn update_record(&mut self, record: Record) -> Result<Outcome<Record>, Error> {
        if !self.settings.edit_settings.allow_editing {
            return Err(ConfigError::FeatureDisabled("editing").into());
        }
        let key_field = self.primary_key()?;
        let outcome = self.data.update(&key_field, record).await?;
        self.refresh_after(outcome).await
    }

    /// Deletes `records` by primary key and reloads the view.
    pub async fn delete_records(&mut self, records: Vec<Record>) -> Result<Outcome<usize>, Error> {
        if !self.settings.edit_settings.allow_deleting {
            return Err(ConfigError::FeatureDisabled("deleting").into());
        }
        let key_field = self.primary_key()?;
        let outcome = self.data.remove(&key_field, records).await?;
        self.refresh_after(outcome).await
    }

    pub async fn delete_record(&mut self, record: Record) -> Result<Outcome<usize>, Error> {
        self.delete_records(vec![record]).await
    }

    async fn refresh_after<T>(&mut self, outcome: Outcome<T>) -> Result<Outcome<T>, Error> {
        if outcome.is_completed() {
            self.refresh().await?;
        }
        Ok(outcome)
    }
}
