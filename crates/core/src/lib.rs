//! Core types shared by every TabTab crate: cell addressing and the
//! selection model. No I/O, no rendering.

pub mod cell_ref;
pub mod selection;

pub use cell_ref::{col_letter, parse_a1, CellRef, GridDims, FIRST_OUTPUT_ROW, HEADER_ROW, NUM_COLS, NUM_ROWS};
pub use selection::{Range, RangeSelection, Selection};
