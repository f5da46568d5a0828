//! Grid data model

mod column;
mod record;
mod value;

pub use column::*;
pub use record::*;
pub use value::*;
