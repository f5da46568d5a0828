//! Edit settings

use serde::Deserialize;
use serde::Serialize;

/// Which record mutations the grid permits. Everything is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditSettings {
    pub allow_adding: bool,
    pub allow_editing: bool,
    pub allow_deleting: bool,
}

impl EditSettings {
    /// Adding, editing and deleting all allowed.
    pub fn all() -> Self {
        Self {
            allow_adding: true,
            allow_editing: true,
            allow_deleting: true,
        }
    }

    pub fn with_allow_adding(mut self, allow: bool) -> Self {
        self.allow_adding = allow;
        self
    }

    pub fn with_allow_editing(mut self, allow: bool) -> Self {
        self.allow_editing = allow;
        self
    }

    pub fn with_allow_deleting(mut self, allow: bool) -> Self {
        self.allow_deleting = allow;
        self
    }
}
