//! Data operations.
//!
//! [`DataOperations`] runs composed queries against a [`DataBinding`] and
//! performs writes through a two-phase handshake: a change is proposed,
//! confirmed or cancelled by the consumer, and only then persisted.

mod change;
mod handshake;
mod operations;
mod pending;
mod request;

pub use change::*;
pub use handshake::*;
pub use operations::*;
pub use pending::*;
pub use request::*;
