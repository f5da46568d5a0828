use gridnav::Region;

use super::Grid;
use crate::error::ConfigError;
use crate::model::Column;
use crate::model::Record;

/// What sits at a grid position.
#[derive(Debug, Clone, PartialEq)]
pub struct RowInfo<'a> {
    pub region: Region,
    pub row_index: usize,
    pub col_index: usize,
    pub column: Option<&'a Column>,
    /// The content record; `None` for header and aggregate rows.
    pub record: Option<&'a Record>,
}

impl Grid {
    pub fn get_column_by_field(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn get_column_by_uid(&self, uid: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.uid == uid)
    }

    pub fn get_visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    pub fn get_hidden_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.visible).collect()
    }

    pub fn get_primary_key_field_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.field.as_str())
            .collect()
    }

    /// First primary key field.
    pub(crate) fn primary_key(&self) -> Result<String, ConfigError> {
        self.get_primary_key_field_names()
            .first()
            .map(|f| f.to_string())
            .ok_or(ConfigError::MissingPrimaryKey)
    }

    /// Row and column at a matrix position. `None` outside the region.
    pub fn get_row_info(&self, region: Region, row: usize, col: usize) -> Option<RowInfo<'_>> {
        let rows = match region {
            Region::Header => super::HEADER_ROWS,
            Region::Content => self.view.len(),
            Region::Aggregate => self.settings.aggregate_settings.row_count(),
        };
        if row >= rows || col >= self.columns.len() {
            return None;
        }
        Some(RowInfo {
            region,
            row_index: row,
            col_index: col,
            column: self.columns.get(col),
            record: match region {
                Region::Content => self.view.result.get(row),
                _ => None,
            },
        })
    }

    /// Row info for the focused cell.
    pub fn focused_row_info(&self) -> Option<RowInfo<'_>> {
        let cell = self.focus.focused_cell()?;
        self.get_row_info(cell.region, cell.row_index, cell.col_index)
    }

    pub fn show_column(&mut self, field: &str) -> Result<(), ConfigError> {
        self.set_column_visible(field, true)
    }

    pub fn hide_column(&mut self, field: &str) -> Result<(), ConfigError> {
        self.set_column_visible(field, false)
    }

    fn set_column_visible(&mut self, field: &str, visible: bool) -> Result<(), ConfigError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.field == field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;
        if column.visible != visible {
            column.visible = visible;
            self.focus.invalidate();
            self.rebuild_matrices();
        }
        Ok(())
    }
}
