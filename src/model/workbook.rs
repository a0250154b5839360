//! Workbook and sheet containers.

use super::{CellData, CellXfsStyle, ColProp, MergedRange, RowProp, SheetView};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_WORKBOOK_ID: AtomicU64 = AtomicU64::new(1);

/// A defined name from the workbook manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedName {
    pub name: String,
    /// The reference text the name resolves to (element content).
    pub ref_text: String,
    /// Sheet scope; `None` means workbook-global.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<u32>,
}

/// One worksheet: a sparse cell table plus sparse presentation overrides.
///
/// Absent cell key ⇒ blank cell; a zero/empty placeholder is never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetModel {
    /// Relationship identifier from the manifest (e.g. `"rId1"`).
    pub id: String,
    /// Display name shown on the sheet tab.
    pub name: String,
    /// Numeric sheet id; names the worksheet part in the package.
    pub sheet_id: u32,
    /// Sparse cell table keyed by 1-based (row, col).
    #[serde(with = "cell_table")]
    pub cells: HashMap<(u32, u32), CellData>,
    /// Raw merged-range reference strings, unparsed.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub merged_ranges: Vec<MergedRange>,
    /// Explicit row overrides keyed by 1-based row index.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub row_props: HashMap<u32, RowProp>,
    /// Explicit column overrides keyed by 1-based column index.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub col_props: HashMap<u32, ColProp>,
    /// Freeze/split view state, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<SheetView>,
}

impl SheetModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sheet_id: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sheet_id,
            ..Default::default()
        }
    }

    /// Look up a cell; `None` is a blank cell.
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }
}

/// The assembled workbook.
///
/// Sheets are held behind `Arc` so the edit session can replace one sheet
/// per committed edit while older snapshots stay consistent; `Arc::ptr_eq`
/// gives consumers reference-equality change detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkbookModel {
    /// Opaque document identifier.
    pub id: String,
    /// Sheets in tab order (= manifest document order).
    pub sheets: Vec<Arc<SheetModel>>,
    /// Shared strings in first-seen source order, addressed by index.
    pub shared_strings: Vec<String>,
    /// Numeric-format-id → format-code.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub num_fmts: HashMap<u32, String>,
    /// Style records; a cell's `style_id` is a 0-based index here.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub styles: Vec<CellXfsStyle>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub defined_names: Vec<DefinedName>,
}

impl WorkbookModel {
    /// Create an empty workbook with a fresh identifier.
    pub fn new() -> Self {
        let n = NEXT_WORKBOOK_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("wb-{n}"),
            ..Default::default()
        }
    }

    pub fn sheet_by_id(&self, id: &str) -> Option<&Arc<SheetModel>> {
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Arc<SheetModel>> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Serialize the sparse cell table with `"row-col"` string keys so the
/// model stays representable in JSON for the downstream persistence and
/// export consumers.
mod cell_table {
    use super::CellData;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S: Serializer>(
        cells: &HashMap<(u32, u32), CellData>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            cells
                .iter()
                .map(|((row, col), cell)| (format!("{row}-{col}"), cell)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(u32, u32), CellData>, D::Error> {
        let raw = HashMap::<String, CellData>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, cell)| {
                let (row, col) = key
                    .split_once('-')
                    .and_then(|(r, c)| Some((r.parse().ok()?, c.parse().ok()?)))
                    .ok_or_else(|| D::Error::custom(format!("bad cell key: {key}")))?;
                Ok(((row, col), cell))
            })
            .collect()
    }
}
