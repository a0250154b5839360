//! Workbook package assembly.
//!
//! Turns a package's parts into a [`WorkbookModel`] through four
//! extraction passes: shared strings, styles, the workbook manifest, and
//! one pass per worksheet body. The string and style tables are fully
//! built before any sheet body is parsed, because cell values reference
//! both by index.
//!
//! # Example
//!
//! ```no_run
//! use gridbook::xlsx::WorkbookReader;
//!
//! let model = WorkbookReader::open("book.xlsx")?;
//! for sheet in &model.sheets {
//!     println!("{}: {} cells", sheet.name, sheet.cells.len());
//! }
//! # Ok::<(), gridbook::Error>(())
//! ```

mod shared_strings;
mod sheet;
mod styles;

pub use shared_strings::parse_shared_strings;
pub use sheet::parse_sheet;
pub use styles::{parse_styles, StylesPart};

use crate::container::PackageReader;
use crate::error::{Error, Result};
use crate::markup::{XmlEvent, XmlScanner};
use crate::model::{DefinedName, WorkbookModel};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";

/// One `<sheet>` entry from the manifest, in document (= tab) order.
#[derive(Debug, Clone)]
struct SheetEntry {
    rel_id: String,
    name: String,
    sheet_id: u32,
}

/// Assembles a [`WorkbookModel`] from a package.
pub struct WorkbookReader;

impl WorkbookReader {
    /// Read a workbook package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<WorkbookModel> {
        Self::from_package(PackageReader::open(path)?)
    }

    /// Read a workbook package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<WorkbookModel> {
        Self::from_package(PackageReader::from_bytes(data)?)
    }

    /// Assemble the model from an opened package.
    ///
    /// A missing workbook manifest is fatal; missing shared strings or
    /// styles leave empty tables and import proceeds.
    pub fn from_package(package: PackageReader) -> Result<WorkbookModel> {
        let mut model = WorkbookModel::new();

        match package.read_part(SHARED_STRINGS_PART)? {
            Some(xml) => model.shared_strings = parse_shared_strings(&xml)?,
            None => debug!("no shared-strings part; table stays empty"),
        }

        match package.read_part(STYLES_PART)? {
            Some(xml) => {
                let styles = parse_styles(&xml)?;
                model.num_fmts = styles.num_fmts;
                model.styles = styles.cell_xfs;
            }
            None => debug!("no styles part; tables stay empty"),
        }

        let manifest = package
            .read_part(WORKBOOK_PART)?
            .ok_or_else(|| Error::MissingPart(WORKBOOK_PART.to_string()))?;
        let (entries, defined_names) = parse_manifest(&manifest)?;
        model.defined_names = defined_names;

        for entry in entries {
            let part = format!("xl/worksheets/sheet{}.xml", entry.sheet_id);
            match package.read_part(&part)? {
                Some(xml) => {
                    let sheet = parse_sheet(
                        &xml,
                        &entry.rel_id,
                        &entry.name,
                        entry.sheet_id,
                        &model.shared_strings,
                    )?;
                    debug!(sheet = %sheet.name, cells = sheet.cells.len(), "sheet assembled");
                    model.sheets.push(Arc::new(sheet));
                }
                None => warn!(part = %part, name = %entry.name, "worksheet part missing; sheet skipped"),
            }
        }

        Ok(model)
    }
}

/// Manifest pass: sheet entries in document order plus defined names.
fn parse_manifest(xml: &str) -> Result<(Vec<SheetEntry>, Vec<DefinedName>)> {
    let mut entries = Vec::new();
    let mut defined_names = Vec::new();
    let mut scanner = XmlScanner::new(xml);
    // A definedName's ref is its element content.
    let mut open_name: Option<DefinedName> = None;

    while let Some(event) = scanner.next_event()? {
        match &event {
            XmlEvent::Start { name, .. } if name == "sheet" => {
                entries.push(SheetEntry {
                    rel_id: event
                        .attr("r:id")
                        .or_else(|| event.attr("id"))
                        .unwrap_or_default()
                        .to_string(),
                    name: event.attr("name").unwrap_or_default().to_string(),
                    sheet_id: event
                        .attr("sheetId")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(1),
                });
            }
            XmlEvent::Start { name, .. } if name == "definedName" => {
                open_name = Some(DefinedName {
                    name: event.attr("name").unwrap_or_default().to_string(),
                    ref_text: String::new(),
                    local_sheet_id: event.attr("localSheetId").and_then(|v| v.parse().ok()),
                });
            }
            XmlEvent::Text(text) => {
                if let Some(dn) = open_name.as_mut() {
                    dn.ref_text.push_str(text);
                }
            }
            XmlEvent::End { name } if name == "definedName" => {
                if let Some(dn) = open_name.take() {
                    defined_names.push(dn);
                }
            }
            _ => {}
        }
    }

    Ok((entries, defined_names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let xml = r#"<workbook>
    <sheets>
        <sheet name="Data" sheetId="1" r:id="rId1"/>
        <sheet name="Summary" sheetId="3" r:id="rId2"/>
    </sheets>
    <definedNames>
        <definedName name="Totals" localSheetId="0">Data!$A$1:$A$9</definedName>
        <definedName name="Everywhere">Summary!$B$2</definedName>
    </definedNames>
</workbook>"#;

        let (entries, names) = parse_manifest(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Data");
        assert_eq!(entries[0].rel_id, "rId1");
        assert_eq!(entries[1].sheet_id, 3);

        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "Totals");
        assert_eq!(names[0].ref_text, "Data!$A$1:$A$9");
        assert_eq!(names[0].local_sheet_id, Some(0));
        assert_eq!(names[1].local_sheet_id, None);
    }

    #[test]
    fn test_manifest_order_is_tab_order() {
        let xml = r#"<workbook><sheets>
            <sheet name="Z" sheetId="9" r:id="rId1"/>
            <sheet name="A" sheetId="2" r:id="rId2"/>
        </sheets></workbook>"#;

        let (entries, _) = parse_manifest(xml).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A"]);
    }
}
