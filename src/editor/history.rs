//! Bounded, linear undo/redo history.

use crate::model::CellPosition;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of undo entries to keep.
pub const MAX_UNDO_STACK: usize = 100;

/// One reversible cell edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    /// Index of the sheet the edit was committed on. Undo and redo write
    /// back through this, regardless of which sheet is active later.
    pub sheet_index: usize,
    pub position: CellPosition,
    /// Raw editable text before the edit.
    pub old_value: String,
    /// Raw editable text after the edit.
    pub new_value: String,
    /// Milliseconds since the Unix epoch at commit time.
    pub timestamp_ms: u64,
}

impl CellEdit {
    pub fn new(
        sheet_index: usize,
        position: CellPosition,
        old_value: String,
        new_value: String,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            sheet_index,
            position,
            old_value,
            new_value,
            timestamp_ms,
        }
    }
}

/// Linear-history edit stacks, owned by one session (never process-wide).
///
/// Recording a fresh edit clears the redo stack; the undo stack is LIFO
/// with the oldest entry evicted past [`MAX_UNDO_STACK`].
#[derive(Debug, Default)]
pub struct EditHistory {
    undo_stack: VecDeque<CellEdit>,
    redo_stack: Vec<CellEdit>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed edit.
    pub fn record(&mut self, edit: CellEdit) {
        self.undo_stack.push_back(edit);
        if self.undo_stack.len() > MAX_UNDO_STACK {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Pop the most recent edit for undoing; it moves to the redo stack.
    pub fn pop_undo(&mut self) -> Option<CellEdit> {
        let edit = self.undo_stack.pop_back()?;
        self.redo_stack.push(edit.clone());
        Some(edit)
    }

    /// Pop the most recently undone edit for redoing; it moves back to
    /// the undo stack.
    pub fn pop_redo(&mut self) -> Option<CellEdit> {
        let edit = self.redo_stack.pop()?;
        self.undo_stack.push_back(edit.clone());
        Some(edit)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(n: u32) -> CellEdit {
        CellEdit::new(
            0,
            CellPosition::new(1, 1),
            format!("{}", n.saturating_sub(1)),
            format!("{n}"),
        )
    }

    #[test]
    fn test_record_caps_at_limit() {
        let mut history = EditHistory::new();
        for n in 1..=(MAX_UNDO_STACK as u32 + 1) {
            history.record(edit(n));
        }
        assert_eq!(history.undo_depth(), MAX_UNDO_STACK);
        // The oldest entry was evicted; the bottom of the stack is edit 2.
        let mut last = None;
        while let Some(e) = history.pop_undo() {
            last = Some(e);
        }
        assert_eq!(last.unwrap().new_value, "2");
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = EditHistory::new();
        history.record(edit(1));
        history.record(edit(2));
        assert!(history.pop_undo().is_some());
        assert!(history.can_redo());

        history.record(edit(3));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_undo_redo_shuttle() {
        let mut history = EditHistory::new();
        history.record(edit(1));

        let undone = history.pop_undo().unwrap();
        assert_eq!(undone.new_value, "1");
        assert!(!history.can_undo());

        let redone = history.pop_redo().unwrap();
        assert_eq!(redone, undone);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_pops_are_noops() {
        let mut history = EditHistory::new();
        assert!(history.pop_undo().is_none());
        assert!(history.pop_redo().is_none());
    }
}
