//! Live-edit session over an assembled workbook.
//!
//! An [`EditSession`] is the single mutation authority for one
//! [`WorkbookModel`]: the UI layer reads through it and writes through it,
//! never touching the model directly. Each committed write replaces the
//! owning sheet wholesale (copy-on-write at sheet granularity), so readers
//! holding an older snapshot keep a consistent view and consumers can
//! detect change by `Arc` identity.

mod history;

pub use history::{CellEdit, EditHistory, MAX_UNDO_STACK};

use crate::formula::{self, Value};
use crate::model::{
    CellData, CellPosition, CellType, CellValue, SheetModel, WorkbookModel,
};
use std::sync::Arc;

/// One-step selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Transient draft layered above the committed model while a cell is
/// being edited.
#[derive(Debug, Clone)]
pub struct EditingState {
    pub position: CellPosition,
    /// Live buffer contents.
    pub value: String,
    /// Raw text at the moment editing started.
    pub original_value: String,
}

/// Read/write/navigate/undo/redo surface over one workbook.
pub struct EditSession {
    workbook: WorkbookModel,
    active_sheet: usize,
    selection: Option<CellPosition>,
    editing: Option<EditingState>,
    history: EditHistory,
}

impl EditSession {
    /// Wrap an assembled workbook.
    pub fn new(workbook: WorkbookModel) -> Self {
        Self {
            workbook,
            active_sheet: 0,
            selection: None,
            editing: None,
            history: EditHistory::new(),
        }
    }

    /// Start a blank document with a single empty sheet.
    pub fn empty() -> Self {
        let mut workbook = WorkbookModel::new();
        workbook
            .sheets
            .push(Arc::new(SheetModel::new("rId1", "Sheet1", 1)));
        Self::new(workbook)
    }

    /// The current model. Mutate only through this session.
    pub fn workbook(&self) -> &WorkbookModel {
        &self.workbook
    }

    /// Cheap snapshot: sheets are shared by `Arc` until the next edit.
    pub fn snapshot(&self) -> WorkbookModel {
        self.workbook.clone()
    }

    pub fn active_sheet(&self) -> Option<&Arc<SheetModel>> {
        self.workbook.sheets.get(self.active_sheet)
    }

    /// Switch the active sheet; out-of-range indices are ignored.
    pub fn set_active_sheet(&mut self, index: usize) {
        if index < self.workbook.sheets.len() {
            self.active_sheet = index;
        }
    }

    pub fn selection(&self) -> Option<CellPosition> {
        self.selection
    }

    pub fn select(&mut self, position: CellPosition) {
        self.selection = Some(position);
    }

    pub fn editing(&self) -> Option<&EditingState> {
        self.editing.as_ref()
    }

    /// Raw editable text at a position: `"="` + formula source for a
    /// formula cell, else the literal's text, else `""` for a blank.
    pub fn cell_value(&self, position: CellPosition) -> String {
        let Some(cell) = self.cell_at(position) else {
            return String::new();
        };
        match &cell.formula {
            Some(src) => format!("={src}"),
            None => cell.value.to_text(),
        }
    }

    /// Evaluated display value at a position.
    ///
    /// A formula cell is piped through the engine against the current
    /// sheet; a literal cell yields its literal; a blank yields
    /// [`Value::Empty`] (displayed as `""`).
    pub fn cell_display_value(&self, position: CellPosition) -> Value {
        let Some(sheet) = self.active_sheet() else {
            return Value::Empty;
        };
        let Some(cell) = sheet.cell(position.row, position.col) else {
            return Value::Empty;
        };
        match &cell.formula {
            Some(src) => {
                // Single-layer resolution: a referenced formula cell
                // contributes its last-committed literal, never a fresh
                // evaluation.
                let resolver = |row: u32, col: u32| match sheet.cell(row, col) {
                    Some(c) => literal_value(&c.value),
                    None => Value::Empty,
                };
                formula::evaluate(src, &resolver)
            }
            None => literal_value(&cell.value),
        }
    }

    /// Classify and commit a write at a position.
    ///
    /// Leading `=` stores a formula (display is always recomputed; no
    /// cached literal is persisted). Empty text deletes the entry. Text
    /// that parses fully as a number stores a numeric literal; anything
    /// else stores text. Every successful write records an undo entry and
    /// clears the redo stack.
    pub fn set_cell_value(&mut self, position: CellPosition, text: &str) {
        if position.row == 0 || position.col == 0 {
            return;
        }
        // No active sheet, no write: an undo entry is only recorded for a
        // write that actually landed.
        if self.active_sheet().is_none() {
            return;
        }
        let sheet_index = self.active_sheet;
        let old_value = self.cell_value(position);
        self.apply_cell_text(sheet_index, position, text);
        self.history.record(CellEdit::new(
            sheet_index,
            position,
            old_value,
            text.to_string(),
        ));
    }

    /// Revert the most recent edit, on the sheet it was committed on.
    /// No-op when nothing to undo.
    pub fn undo(&mut self) {
        if let Some(edit) = self.history.pop_undo() {
            self.apply_cell_text(edit.sheet_index, edit.position, &edit.old_value);
        }
    }

    /// Reapply the most recently undone edit, on the sheet it was
    /// committed on. No-op when nothing to redo.
    pub fn redo(&mut self) {
        if let Some(edit) = self.history.pop_redo() {
            self.apply_cell_text(edit.sheet_index, edit.position, &edit.new_value);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Open a draft at a position, seeded with the raw cell text.
    pub fn start_editing(&mut self, position: CellPosition) {
        let value = self.cell_value(position);
        self.editing = Some(EditingState {
            position,
            original_value: value.clone(),
            value,
        });
        self.selection = Some(position);
    }

    /// Replace the draft buffer. No-op when no draft is open.
    pub fn update_editing_value(&mut self, text: &str) {
        if let Some(editing) = self.editing.as_mut() {
            editing.value = text.to_string();
        }
    }

    /// Close the draft. `save == true` commits through
    /// [`Self::set_cell_value`] only when the buffer differs from the
    /// original; `save == false` discards with no model mutation and no
    /// undo entry.
    pub fn stop_editing(&mut self, save: bool) {
        let Some(editing) = self.editing.take() else {
            return;
        };
        if save && editing.value != editing.original_value {
            self.set_cell_value(editing.position, &editing.value);
        }
    }

    /// Move the selection one step. Row and column clamp at 1 and are
    /// unbounded upward. An open draft is committed first.
    pub fn navigate(&mut self, direction: Direction) {
        let Some(current) = self.selection else {
            return;
        };
        if self.editing.is_some() {
            self.stop_editing(true);
        }
        let next = match direction {
            Direction::Up => CellPosition::new(current.row.saturating_sub(1).max(1), current.col),
            Direction::Down => CellPosition::new(current.row + 1, current.col),
            Direction::Left => CellPosition::new(current.row, current.col.saturating_sub(1).max(1)),
            Direction::Right => CellPosition::new(current.row, current.col + 1),
        };
        self.selection = Some(next);
    }

    /// Raw text of the selected cell, without mutation.
    pub fn copy(&self) -> Option<String> {
        self.selection.map(|pos| self.cell_value(pos))
    }

    /// Raw text of the selected cell; the cell is then cleared through an
    /// undo-tracked write.
    pub fn cut(&mut self) -> Option<String> {
        let pos = self.selection?;
        let value = self.cell_value(pos);
        self.set_cell_value(pos, "");
        Some(value)
    }

    /// Write text into the selected cell.
    pub fn paste(&mut self, text: &str) {
        if let Some(pos) = self.selection {
            self.set_cell_value(pos, text);
        }
    }

    fn cell_at(&self, position: CellPosition) -> Option<&CellData> {
        self.active_sheet()?.cell(position.row, position.col)
    }

    /// The one mutation path. Replaces the addressed sheet with an updated
    /// copy; never records history (callers decide that).
    fn apply_cell_text(&mut self, sheet_index: usize, position: CellPosition, text: &str) {
        let Some(current) = self.workbook.sheets.get(sheet_index) else {
            return;
        };
        let style_id = current
            .cell(position.row, position.col)
            .and_then(|c| c.style_id);

        let mut sheet = SheetModel::clone(current);
        let key = (position.row, position.col);

        if text.is_empty() {
            sheet.cells.remove(&key);
        } else if let Some(src) = text.strip_prefix('=') {
            sheet.cells.insert(
                key,
                CellData {
                    row: position.row,
                    col: position.col,
                    cell_type: CellType::FormulaString,
                    value: CellValue::Empty,
                    formula: Some(src.to_string()),
                    style_id,
                },
            );
        } else {
            let (cell_type, value) = match text.trim().parse::<f64>() {
                Ok(n) => (CellType::Number, CellValue::Number(n)),
                Err(_) => (CellType::InlineString, CellValue::Text(text.to_string())),
            };
            sheet.cells.insert(
                key,
                CellData {
                    row: position.row,
                    col: position.col,
                    cell_type,
                    value,
                    formula: None,
                    style_id,
                },
            );
        }

        self.workbook.sheets[sheet_index] = Arc::new(sheet);
    }
}

fn literal_value(value: &CellValue) -> Value {
    match value {
        CellValue::Number(n) => Value::Number(*n),
        CellValue::Text(s) => Value::Text(s.clone()),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Empty => Value::Empty,
    }
}
