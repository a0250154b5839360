//! # gridbook
//!
//! Offline spreadsheet editor core: the pipeline that turns a compressed
//! XML workbook package into an in-memory model, evaluates embedded
//! formulas on demand, and manages reversible cell edits with undo/redo.
//!
//! Rendering, file dialogs, export, and persistence live in the host
//! application; this crate only accepts bytes in and hands values out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gridbook::{open_workbook, CellPosition, EditSession};
//!
//! // Import a package into a workbook model.
//! let model = open_workbook("book.xlsx")?;
//! println!("Sheets: {}", model.sheets.len());
//!
//! // Wrap it in an edit session: the single mutation authority.
//! let mut session = EditSession::new(model);
//! session.set_cell_value(CellPosition::new(1, 1), "=2*21");
//! assert_eq!(session.cell_display_value(CellPosition::new(1, 1)).to_display(), "42");
//! session.undo();
//! # Ok::<(), gridbook::Error>(())
//! ```
//!
//! ## Layered APIs
//!
//! ```no_run
//! use gridbook::container::PackageReader;
//! use gridbook::xlsx::WorkbookReader;
//!
//! // Container level: named parts in, decompressed bytes out.
//! let package = PackageReader::open("book.xlsx")?;
//! assert!(package.exists("xl/workbook.xml"));
//!
//! // Assembly level: package in, workbook model out.
//! let model = WorkbookReader::from_package(package)?;
//! # Ok::<(), gridbook::Error>(())
//! ```

pub mod container;
pub mod editor;
pub mod error;
pub mod formula;
pub mod markup;
pub mod model;
pub mod xlsx;

// Re-exports
pub use container::PackageReader;
pub use editor::{CellEdit, Direction, EditSession, EditingState, MAX_UNDO_STACK};
pub use error::{Error, Result};
pub use formula::{CellResolver, Value};
pub use model::{
    CellData, CellPosition, CellType, CellValue, CellXfsStyle, ColProp, DefinedName, MergedRange,
    Pane, RowProp, SheetModel, SheetView, WorkbookModel,
};
pub use xlsx::WorkbookReader;

use std::path::Path;

/// Import a workbook package from a file path.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<WorkbookModel> {
    WorkbookReader::open(path)
}

/// Import a workbook package from bytes.
pub fn read_workbook_bytes(data: &[u8]) -> Result<WorkbookModel> {
    WorkbookReader::from_bytes(data.to_vec())
}

/// Import a workbook package and wrap it in an edit session.
pub fn open_session(path: impl AsRef<Path>) -> Result<EditSession> {
    Ok(EditSession::new(open_workbook(path)?))
}
