//! Worksheet body parsing.
//!
//! One pass over the worksheet part's events, driven by an explicit state
//! machine so malformed nesting cannot corrupt the scan: an element seen
//! in the wrong state is simply ignored.

use crate::error::Result;
use crate::markup::{XmlEvent, XmlScanner};
use crate::model::{
    parse_cell_ref, CellData, CellType, CellValue, ColProp, MergedRange, Pane, RowProp,
    SheetModel, SheetView,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InSheetData,
    InRow,
    InCell,
    InValue,
    InFormula,
    InInline,
    InInlineText,
}

/// A cell element in progress.
#[derive(Debug, Default)]
struct PendingCell {
    row: u32,
    col: u32,
    cell_type: CellType,
    style_id: Option<u32>,
    value_text: String,
    has_value: bool,
    formula_text: String,
    has_formula: bool,
    inline_text: String,
}

/// Parse one worksheet part into a [`SheetModel`].
///
/// The shared-string table must already be fully built: `t="s"` cell
/// values are resolved against it here, with an out-of-range index
/// resolving to an empty string rather than an error.
pub fn parse_sheet(
    xml: &str,
    id: &str,
    name: &str,
    sheet_id: u32,
    shared_strings: &[String],
) -> Result<SheetModel> {
    let mut sheet = SheetModel::new(id, name, sheet_id);
    let mut scanner = XmlScanner::new(xml);
    let mut state = State::Idle;
    let mut pending: Option<PendingCell> = None;

    while let Some(event) = scanner.next_event()? {
        match (state, &event) {
            (State::Idle, XmlEvent::Start { name, .. }) if name == "sheetData" => {
                state = State::InSheetData;
            }
            (State::InSheetData, XmlEvent::Start { name, .. }) if name == "row" => {
                collect_row_props(&event, &mut sheet);
                state = State::InRow;
            }
            (State::InRow, XmlEvent::Start { name, .. }) if name == "c" => {
                let ref_text = event.attr("r").unwrap_or_default();
                let (row, col) = parse_cell_ref(ref_text);
                pending = Some(PendingCell {
                    row,
                    col,
                    cell_type: CellType::from_attr(event.attr("t")),
                    style_id: event.attr("s").and_then(|s| s.parse().ok()),
                    ..Default::default()
                });
                state = State::InCell;
            }
            (State::InCell, XmlEvent::Start { name, .. }) if name == "v" => {
                if let Some(cell) = pending.as_mut() {
                    cell.has_value = true;
                }
                state = State::InValue;
            }
            (State::InCell, XmlEvent::Start { name, .. }) if name == "f" => {
                if let Some(cell) = pending.as_mut() {
                    cell.has_formula = true;
                }
                state = State::InFormula;
            }
            (State::InCell, XmlEvent::Start { name, .. }) if name == "is" => {
                state = State::InInline;
            }
            (State::InInline, XmlEvent::Start { name, .. }) if name == "t" => {
                state = State::InInlineText;
            }
            (State::InValue, XmlEvent::Text(text)) => {
                if let Some(cell) = pending.as_mut() {
                    cell.value_text.push_str(text);
                }
            }
            (State::InFormula, XmlEvent::Text(text)) => {
                if let Some(cell) = pending.as_mut() {
                    cell.formula_text.push_str(text);
                }
            }
            (State::InInlineText, XmlEvent::Text(text)) => {
                if let Some(cell) = pending.as_mut() {
                    cell.inline_text.push_str(text);
                }
            }
            (State::InValue, XmlEvent::End { name }) if name == "v" => state = State::InCell,
            (State::InFormula, XmlEvent::End { name }) if name == "f" => state = State::InCell,
            (State::InInlineText, XmlEvent::End { name }) if name == "t" => {
                state = State::InInline;
            }
            (State::InInline, XmlEvent::End { name }) if name == "is" => state = State::InCell,
            (State::InCell, XmlEvent::End { name }) if name == "c" => {
                if let Some(cell) = pending.take() {
                    finish_cell(cell, shared_strings, &mut sheet);
                }
                state = State::InRow;
            }
            (State::InRow, XmlEvent::End { name }) if name == "row" => {
                state = State::InSheetData;
            }
            (State::InSheetData, XmlEvent::End { name }) if name == "sheetData" => {
                state = State::Idle;
            }
            (State::Idle, XmlEvent::Start { name, .. }) if name == "mergeCell" => {
                if let Some(ref_text) = event.attr("ref") {
                    sheet.merged_ranges.push(MergedRange {
                        ref_text: ref_text.to_string(),
                    });
                }
            }
            (State::Idle, XmlEvent::Start { name, .. }) if name == "col" => {
                collect_col_props(&event, &mut sheet);
            }
            (State::Idle, XmlEvent::Start { name, .. }) if name == "pane" => {
                sheet.view.get_or_insert_with(SheetView::default).pane = Some(Pane {
                    x_split: event.attr("xSplit").and_then(|v| v.parse().ok()),
                    y_split: event.attr("ySplit").and_then(|v| v.parse().ok()),
                    top_left_cell: event.attr("topLeftCell").map(String::from),
                    state: event.attr("state").map(String::from),
                });
            }
            _ => {}
        }
    }

    Ok(sheet)
}

/// Record a row override only when the source makes one explicit.
fn collect_row_props(event: &XmlEvent, sheet: &mut SheetModel) {
    let Some(row) = event.attr("r").and_then(|v| v.parse::<u32>().ok()) else {
        return;
    };
    let height = event.attr("ht").and_then(|v| v.parse().ok());
    let hidden = event.attr("hidden") == Some("1");
    if height.is_some() || hidden {
        sheet.row_props.insert(
            row,
            RowProp {
                height,
                hidden,
                custom_height: event.attr("customHeight") == Some("1"),
            },
        );
    }
}

fn collect_col_props(event: &XmlEvent, sheet: &mut SheetModel) {
    let Some(col) = event.attr("min").and_then(|v| v.parse::<u32>().ok()) else {
        return;
    };
    // An unparsable width is treated as absent, not an error.
    let width = event.attr("width").and_then(|v| v.parse().ok());
    let hidden = event.attr("hidden") == Some("1");
    if width.is_some() || hidden {
        sheet.col_props.insert(
            col,
            ColProp {
                width,
                hidden,
                custom_width: event.attr("customWidth") == Some("1"),
            },
        );
    }
}

/// Interpret a completed cell element and store it in the sparse table.
fn finish_cell(cell: PendingCell, shared_strings: &[String], sheet: &mut SheetModel) {
    if cell.row == 0 || cell.col == 0 {
        warn!(sheet = %sheet.name, "dropping cell with unparseable reference");
        return;
    }

    let value = match cell.cell_type {
        CellType::Number => {
            if cell.value_text.is_empty() {
                CellValue::Empty
            } else {
                match cell.value_text.trim().parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => {
                        debug!(text = %cell.value_text, "non-numeric content in numeric cell");
                        CellValue::Text(cell.value_text.clone())
                    }
                }
            }
        }
        CellType::SharedString => {
            let resolved = cell
                .value_text
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx));
            if resolved.is_none() {
                debug!(index = %cell.value_text, "shared-string index out of range");
            }
            // Lenient by policy: a bad index is an empty string, not an error.
            CellValue::Text(resolved.cloned().unwrap_or_default())
        }
        CellType::Bool => CellValue::Bool(cell.value_text.trim() == "1"),
        CellType::InlineString => CellValue::Text(cell.inline_text.clone()),
        // Dates, errors, and cached formula strings keep their raw text.
        CellType::Date | CellType::Error | CellType::FormulaString => {
            if cell.has_value {
                CellValue::Text(cell.value_text.clone())
            } else {
                CellValue::Empty
            }
        }
    };

    let formula = cell
        .has_formula
        .then(|| cell.formula_text.trim_start_matches('=').to_string());

    // A cell with nothing in it is a blank; the sparse table never stores
    // placeholders.
    if value.is_empty() && formula.is_none() && cell.style_id.is_none() {
        return;
    }

    sheet.cells.insert(
        (cell.row, cell.col),
        CellData {
            row: cell.row,
            col: cell.col,
            cell_type: cell.cell_type,
            value,
            formula,
            style_id: cell.style_id,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str, shared: &[String]) -> SheetModel {
        parse_sheet(xml, "rId1", "Sheet1", 1, shared).unwrap()
    }

    #[test]
    fn test_cell_types() {
        let shared = vec!["alpha".to_string(), "beta".to_string()];
        let xml = r#"<worksheet><sheetData>
    <row r="1">
        <c r="A1"><v>3.5</v></c>
        <c r="B1" t="s"><v>1</v></c>
        <c r="C1" t="b"><v>1</v></c>
        <c r="D1" t="inlineStr"><is><t>inline</t></is></c>
        <c r="E1" t="e"><v>#DIV/0!</v></c>
    </row>
</sheetData></worksheet>"#;

        let sheet = parse(xml, &shared);
        assert_eq!(sheet.cell(1, 1).unwrap().value, CellValue::Number(3.5));
        assert_eq!(
            sheet.cell(1, 2).unwrap().value,
            CellValue::Text("beta".into())
        );
        assert_eq!(sheet.cell(1, 3).unwrap().value, CellValue::Bool(true));
        assert_eq!(
            sheet.cell(1, 4).unwrap().value,
            CellValue::Text("inline".into())
        );
        assert_eq!(
            sheet.cell(1, 5).unwrap().value,
            CellValue::Text("#DIV/0!".into())
        );
    }

    #[test]
    fn test_out_of_range_shared_string_is_empty() {
        let shared = vec!["only".to_string()];
        let xml = r#"<worksheet><sheetData>
    <row r="1"><c r="A1" t="s"><v>99</v></c></row>
</sheetData></worksheet>"#;

        let sheet = parse(xml, &shared);
        assert_eq!(sheet.cell(1, 1).unwrap().value, CellValue::Text(String::new()));
    }

    #[test]
    fn test_formula_kept_separate_from_cached_value() {
        let xml = r#"<worksheet><sheetData>
    <row r="2"><c r="B2"><f>A1+A2</f><v>5</v></c></row>
</sheetData></worksheet>"#;

        let sheet = parse(xml, &[]);
        let cell = sheet.cell(2, 2).unwrap();
        assert_eq!(cell.formula.as_deref(), Some("A1+A2"));
        assert_eq!(cell.value, CellValue::Number(5.0));
    }

    #[test]
    fn test_unparseable_ref_dropped() {
        let xml = r#"<worksheet><sheetData>
    <row r="1"><c r="bogus"><v>1</v></c><c r="A1"><v>2</v></c></row>
</sheetData></worksheet>"#;

        let sheet = parse(xml, &[]);
        assert_eq!(sheet.cells.len(), 1);
        assert!(sheet.cell(1, 1).is_some());
    }

    #[test]
    fn test_row_and_col_overrides_only_when_explicit() {
        let xml = r#"<worksheet>
    <cols>
        <col min="2" max="2" width="18.5" customWidth="1"/>
        <col min="3" max="3"/>
    </cols>
    <sheetData>
        <row r="1" ht="24" customHeight="1"><c r="A1"><v>1</v></c></row>
        <row r="2"><c r="A2"><v>2</v></c></row>
        <row r="3" hidden="1"/>
    </sheetData>
</worksheet>"#;

        let sheet = parse(xml, &[]);
        assert_eq!(sheet.row_props.get(&1).unwrap().height, Some(24.0));
        assert!(sheet.row_props.get(&1).unwrap().custom_height);
        assert!(!sheet.row_props.contains_key(&2));
        assert!(sheet.row_props.get(&3).unwrap().hidden);

        assert_eq!(sheet.col_props.get(&2).unwrap().width, Some(18.5));
        assert!(!sheet.col_props.contains_key(&3));
    }

    #[test]
    fn test_merges_and_pane() {
        let xml = r#"<worksheet>
    <sheetViews><sheetView><pane xSplit="1" ySplit="2" topLeftCell="B3" state="frozen"/></sheetView></sheetViews>
    <sheetData/>
    <mergeCells count="1"><mergeCell ref="A1:B2"/></mergeCells>
</worksheet>"#;

        let sheet = parse(xml, &[]);
        assert_eq!(sheet.merged_ranges.len(), 1);
        assert_eq!(sheet.merged_ranges[0].ref_text, "A1:B2");

        let pane = sheet.view.unwrap().pane.unwrap();
        assert_eq!(pane.x_split, Some(1));
        assert_eq!(pane.y_split, Some(2));
        assert_eq!(pane.top_left_cell.as_deref(), Some("B3"));
        assert_eq!(pane.state.as_deref(), Some("frozen"));
    }

    #[test]
    fn test_blank_cell_not_stored() {
        let xml = r#"<worksheet><sheetData>
    <row r="1"><c r="A1"/><c r="B1" s="2"/></row>
</sheetData></worksheet>"#;

        let sheet = parse(xml, &[]);
        // A1 carries nothing at all; B1 carries a style and stays.
        assert!(sheet.cell(1, 1).is_none());
        assert_eq!(sheet.cell(1, 2).unwrap().style_id, Some(2));
    }
}
