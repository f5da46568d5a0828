//! Sort settings

use serde::Deserialize;
use serde::Serialize;

use crate::query::Direction;

/// Whether a new sort replaces or extends the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    Single,
    #[default]
    Multiple,
}

/// One sorted column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDescriptor {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortDescriptor {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Sort configuration.
///
/// `columns` is ordered by precedence: the first descriptor is the primary
/// sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortSettings {
    /// Default: true
    pub enabled: bool,
    /// Default: [`SortMode::Multiple`]
    pub mode: SortMode,
    pub columns: Vec<SortDescriptor>,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SortMode::Multiple,
            columns: Vec::new(),
        }
    }
}

impl SortSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_mode(mut self, mode: SortMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_column(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.columns.push(SortDescriptor::new(field, direction));
        self
    }

    /// Position of `field` among the descriptors.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|d| d.field == field)
    }

    /// Adds or replaces a descriptor.
    ///
    /// In single mode, or when `multi` is false, the descriptor replaces all
    /// others. Otherwise an existing descriptor for the field is updated in
    /// place and a new field is appended.
    pub fn apply(&mut self, descriptor: SortDescriptor, multi: bool) {
        if self.mode == SortMode::Single || !multi {
            self.columns = vec![descriptor];
            return;
        }
        match self.position(&descriptor.field) {
            Some(i) => self.columns[i] = descriptor,
            None => self.columns.push(descriptor),
        }
    }

    /// Normalized copy. Disabled sorting has no descriptors, single mode keeps
    /// only the most recent one.
    pub fn resolve(&self) -> Self {
        let mut resolved = self.clone();
        if !resolved.enabled {
            resolved.columns.clear();
        } else if resolved.mode == SortMode::Single && resolved.columns.len() > 1 {
            let last = resolved.columns.split_off(resolved.columns.len() - 1);
            resolved.columns = last;
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_appends_and_replaces_in_place() {
        let mut sort = SortSettings::default();
        sort.apply(SortDescriptor::new("CustomerID", Direction::Descending), true);
        sort.apply(SortDescriptor::new("Freight", Direction::Ascending), true);
        sort.apply(SortDescriptor::new("CustomerID", Direction::Ascending), true);
        assert_eq!(sort.columns.len(), 2);
        assert_eq!(sort.columns[0], SortDescriptor::new("CustomerID", Direction::Ascending));
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sort = SortSettings::default().with_mode(SortMode::Single);
        sort.apply(SortDescriptor::new("a", Direction::Ascending), true);
        sort.apply(SortDescriptor::new("b", Direction::Ascending), true);
        assert_eq!(sort.columns, vec![SortDescriptor::new("b", Direction::Ascending)]);
    }

    #[test]
    fn test_resolve_single_keeps_last() {
        let sort = SortSettings::default()
            .with_mode(SortMode::Single)
            .with_column("a", Direction::Ascending)
            .with_column("b", Direction::Descending)
            .resolve();
        assert_eq!(sort.columns, vec![SortDescriptor::new("b", Direction::Descending)]);
    }
}
