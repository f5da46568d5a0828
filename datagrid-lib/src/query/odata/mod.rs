//! OData rendering of queries.

mod url;

pub use url::*;
