//! Grid column definitions

use serde::Deserialize;
use serde::Serialize;

use crate::query::Comparer;

/// Data type of a column, used for date-range filtering and OData literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    DateTime,
}

impl ColumnType {
    pub fn is_date(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }
}

/// A column bound to one record field.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Column, ColumnType};
///
/// let id = Column::new("OrderID").primary_key().with_type(ColumnType::Number);
/// let date = Column::new("OrderDate").with_type(ColumnType::Date).with_header_text("Order Date");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Column {
    pub field: String,
    pub header_text: Option<String>,
    /// Unique id; assigned as `grid-column{index}` when left empty.
    pub uid: String,
    pub visible: bool,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub allow_sorting: bool,
    pub allow_filtering: bool,
    pub allow_searching: bool,
    pub is_primary_key: bool,
    /// Rendered width, used for horizontal scroll reveal.
    pub width: Option<u32>,
    /// Custom ordering, applied only when querying a local source.
    #[serde(skip)]
    pub sort_comparer: Option<Comparer>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            field: String::new(),
            header_text: None,
            uid: String::new(),
            visible: true,
            column_type: ColumnType::default(),
            allow_sorting: true,
            allow_filtering: true,
            allow_searching: true,
            is_primary_key: false,
            width: None,
            sort_comparer: None,
        }
    }
}

impl Column {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn with_header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = Some(text.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_sort_comparer(mut self, comparer: Comparer) -> Self {
        self.sort_comparer = Some(comparer);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn allow_sorting(mut self, allow: bool) -> Self {
        self.allow_sorting = allow;
        self
    }

    pub fn allow_filtering(mut self, allow: bool) -> Self {
        self.allow_filtering = allow;
        self
    }

    pub fn allow_searching(mut self, allow: bool) -> Self {
        self.allow_searching = allow;
        self
    }

    /// Header text, falling back to the field name.
    pub fn header_text(&self) -> &str {
        self.header_text.as_deref().unwrap_or(&self.field)
    }
}

/// Gives every column without a uid the id `grid-column{index}`.
pub fn assign_uids(columns: &mut [Column]) {
    for (index, column) in columns.iter_mut().enumerate() {
        if column.uid.is_empty() {
            column.uid = format!("grid-column{}", index);
        }
    }
}
