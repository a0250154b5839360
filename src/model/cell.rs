//! Cell-level model types.

use serde::{Deserialize, Serialize};

/// A 1-based (row, column) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

impl CellPosition {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Interpretation tag carried by a cell's `t` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    /// Default/`n`: numeric content.
    #[default]
    Number,
    /// `s`: value is an index into the shared-string table.
    SharedString,
    /// `b`: boolean, `"1"` is true.
    Bool,
    /// `d`: ISO date text, retained raw.
    Date,
    /// `str`: a formula's cached string result.
    FormulaString,
    /// `e`: an error literal such as `#DIV/0!`.
    Error,
    /// `inlineStr`: string stored inline in the cell element.
    InlineString,
}

impl CellType {
    /// Map a `t` attribute value; anything unrecognized keeps raw text.
    pub fn from_attr(t: Option<&str>) -> Self {
        match t {
            None | Some("n") => CellType::Number,
            Some("s") => CellType::SharedString,
            Some("b") => CellType::Bool,
            Some("d") => CellType::Date,
            Some("e") => CellType::Error,
            Some("inlineStr") => CellType::InlineString,
            Some(_) => CellType::FormulaString,
        }
    }
}

/// A cell's literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// No literal stored (e.g. a formula cell with no cached result).
    Empty,
}

impl CellValue {
    /// Editable textual form of the literal; `Empty` renders as `""`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// Render a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One stored (non-blank) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
    /// Interpretation tag from the source, or an inferred tag for edits.
    pub cell_type: CellType,
    /// Literal value. Distinct from `formula`: a formula cell may carry a
    /// cached literal here, and the two are never conflated.
    pub value: CellValue,
    /// Formula source without the leading `=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// 0-based index into the workbook's style record list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<u32>,
}

/// A formatting record from `cellXfs`; cells reference it by its position
/// in the workbook's style list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellXfsStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_fmt_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xf_id: Option<u32>,
}

/// Explicit row override; rows without one use defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RowProp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub hidden: bool,
    pub custom_height: bool,
}

/// Explicit column override; columns without one use defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColProp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub hidden: bool,
    pub custom_width: bool,
}

/// A merged range kept as its raw `"A1:B2"`-style reference text;
/// consumers parse it when they care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRange {
    pub ref_text: String,
}

/// Freeze/split pane state from the sheet view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_split: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_split: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_left_cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Per-sheet view state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,
}
