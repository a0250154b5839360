//! In-memory workbook model.
//!
//! These structures are what the assembler produces and the edit session
//! mutates. They are deliberately plain data: sparse maps for cells and
//! row/column overrides (absence means default/blank), index-addressed
//! shared-string and style tables, and a tagged union for cell values so
//! every consumer matches exhaustively instead of probing types at runtime.

mod cell;
mod cellref;
mod workbook;

pub use cell::*;
pub use cellref::{column_index, column_letters, parse_cell_ref};
pub use workbook::*;
