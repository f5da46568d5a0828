//! Headless data grid core.
//!
//! Composes sort, filter, search, aggregate and page settings into a [`Query`](query::Query),
//! runs it against a local or remote [`DataSource`](source::DataSource), performs
//! CRUD through a two-phase confirmation handshake, and drives keyboard focus
//! through [`gridnav`].

pub mod data;
pub mod error;
pub mod grid;
pub mod model;
pub mod query;
pub mod settings;
pub mod source;

pub use data::DataBinding;
pub use data::DataOperations;
pub use data::Outcome;
pub use error::Error;
pub use grid::Grid;
pub use model::Column;
pub use model::Record;
pub use model::Value;
pub use query::Query;
pub use query::QueryBuilder;
pub use settings::GridSettings;
