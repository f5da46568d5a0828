pub mod action;
pub mod event;
pub mod focus;
pub mod matrix;
pub mod scroll;

pub use action::{NavAction, Platform};
pub use event::{Key, KeyInput, Modifiers};
pub use focus::{
    CellFocusArgs, FocusEvent, FocusOptions, FocusState, FocusStrategy, FocusedCellInfo,
    NavOutcome, NextCellDirection,
};
pub use matrix::{Cell, MatrixCache, NavigationMatrix, Region, Step};
pub use scroll::{ColumnLayout, ScrollRequest, ScrollSync};
