//! Grid settings.
//!
//! Each feature is a plain configuration struct: `Default` carries the
//! documented defaults, `with_*` methods override them and `resolve()`
//! normalizes a snapshot (clearing descriptors of disabled features,
//! clamping paging). Settings deserialize from camelCase JSON with every
//! key optional.

mod aggregate;
mod edit;
mod filter;
mod grid;
mod page;
mod search;
mod sort;

pub use aggregate::*;
pub use edit::*;
pub use filter::*;
pub use grid::*;
pub use page::*;
pub use search::*;
pub use sort::*;
