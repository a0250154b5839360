//! End-to-end import tests over in-memory workbook packages.

use gridbook::{CellType, CellValue, Error, WorkbookReader};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const WORKBOOK_ONE_SHEET: &str = r#"<workbook>
    <sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

#[test]
fn imports_a_complete_package() {
    let data = package(&[
        (
            "xl/sharedStrings.xml",
            r#"<sst><si><t>Name</t></si><si><r><t>Wide</t></r><r><t>World</t></r></si></sst>"#,
        ),
        (
            "xl/styles.xml",
            r#"<styleSheet>
                <numFmts><numFmt numFmtId="164" formatCode="0.0%"/></numFmts>
                <cellXfs>
                    <xf numFmtId="0" fontId="0"/>
                    <xf numFmtId="164" fontId="1" fillId="2"/>
                </cellXfs>
            </styleSheet>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<workbook>
                <sheets>
                    <sheet name="Data" sheetId="1" r:id="rId1"/>
                    <sheet name="Notes" sheetId="2" r:id="rId2"/>
                </sheets>
                <definedNames>
                    <definedName name="Header">Data!$A$1</definedName>
                </definedNames>
            </workbook>"#,
        ),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet>
                <cols><col min="1" max="1" width="22" customWidth="1"/></cols>
                <sheetViews><sheetView><pane ySplit="1" topLeftCell="A2" state="frozen"/></sheetView></sheetViews>
                <sheetData>
                    <row r="1" ht="30" customHeight="1">
                        <c r="A1" t="s" s="1"><v>0</v></c>
                        <c r="B1" t="s"><v>1</v></c>
                    </row>
                    <row r="2">
                        <c r="A2"><v>12.5</v></c>
                        <c r="B2"><f>A2*2</f><v>25</v></c>
                        <c r="C2" t="b"><v>1</v></c>
                    </row>
                </sheetData>
                <mergeCells><mergeCell ref="A1:B1"/></mergeCells>
            </worksheet>"#,
        ),
        (
            "xl/worksheets/sheet2.xml",
            r#"<worksheet><sheetData/></worksheet>"#,
        ),
    ]);

    let model = WorkbookReader::from_bytes(data).unwrap();

    assert_eq!(model.shared_strings, vec!["Name", "WideWorld"]);
    assert_eq!(model.num_fmts.get(&164).map(String::as_str), Some("0.0%"));
    assert_eq!(model.styles.len(), 2);
    assert_eq!(model.styles[1].fill_id, Some(2));

    // Manifest document order is tab order.
    let names: Vec<&str> = model.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Data", "Notes"]);
    assert_eq!(model.defined_names.len(), 1);
    assert_eq!(model.defined_names[0].ref_text, "Data!$A$1");

    let sheet = model.sheet_by_name("Data").unwrap();
    let a1 = sheet.cell(1, 1).unwrap();
    assert_eq!(a1.cell_type, CellType::SharedString);
    assert_eq!(a1.value, CellValue::Text("Name".into()));
    assert_eq!(a1.style_id, Some(1));

    assert_eq!(sheet.cell(1, 2).unwrap().value, CellValue::Text("WideWorld".into()));
    assert_eq!(sheet.cell(2, 1).unwrap().value, CellValue::Number(12.5));
    assert_eq!(sheet.cell(2, 3).unwrap().value, CellValue::Bool(true));

    // Formula source and cached value stay distinct.
    let b2 = sheet.cell(2, 2).unwrap();
    assert_eq!(b2.formula.as_deref(), Some("A2*2"));
    assert_eq!(b2.value, CellValue::Number(25.0));

    assert_eq!(sheet.merged_ranges[0].ref_text, "A1:B1");
    assert_eq!(sheet.row_props.get(&1).unwrap().height, Some(30.0));
    assert_eq!(sheet.col_props.get(&1).unwrap().width, Some(22.0));
    let pane = sheet.view.as_ref().unwrap().pane.as_ref().unwrap();
    assert_eq!(pane.y_split, Some(1));
    assert_eq!(pane.state.as_deref(), Some("frozen"));
}

#[test]
fn missing_manifest_is_fatal() {
    let data = package(&[(
        "xl/worksheets/sheet1.xml",
        "<worksheet><sheetData/></worksheet>",
    )]);
    let result = WorkbookReader::from_bytes(data);
    assert!(matches!(result, Err(Error::MissingPart(ref p)) if p == "xl/workbook.xml"));
}

#[test]
fn corrupt_container_is_fatal() {
    let result = WorkbookReader::from_bytes(b"definitely not a package".to_vec());
    assert!(matches!(result, Err(Error::Package(_))));
}

#[test]
fn empty_package_with_zero_sheets_imports_cleanly() {
    let data = package(&[("xl/workbook.xml", "<workbook><sheets/></workbook>")]);
    let model = WorkbookReader::from_bytes(data).unwrap();

    assert!(model.sheets.is_empty());
    assert!(model.shared_strings.is_empty());
    assert!(model.styles.is_empty());
    assert!(model.num_fmts.is_empty());
    assert!(model.defined_names.is_empty());
}

#[test]
fn missing_optional_parts_leave_empty_tables() {
    let data = package(&[
        ("xl/workbook.xml", WORKBOOK_ONE_SHEET),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>7</v></c></row></sheetData></worksheet>"#,
        ),
    ]);
    let model = WorkbookReader::from_bytes(data).unwrap();

    assert!(model.shared_strings.is_empty());
    assert!(model.styles.is_empty());
    assert_eq!(
        model.sheets[0].cell(1, 1).unwrap().value,
        CellValue::Number(7.0)
    );
}

#[test]
fn manifest_entry_without_worksheet_part_is_skipped() {
    let data = package(&[(
        "xl/workbook.xml",
        r#"<workbook><sheets>
            <sheet name="Present" sheetId="1" r:id="rId1"/>
            <sheet name="Ghost" sheetId="7" r:id="rId2"/>
        </sheets></workbook>"#,
    ), (
        "xl/worksheets/sheet1.xml",
        "<worksheet><sheetData/></worksheet>",
    )]);
    let model = WorkbookReader::from_bytes(data).unwrap();

    assert_eq!(model.sheets.len(), 1);
    assert_eq!(model.sheets[0].name, "Present");
}

#[test]
fn out_of_range_shared_string_resolves_to_empty() {
    let data = package(&[
        ("xl/sharedStrings.xml", "<sst><si><t>only</t></si></sst>"),
        ("xl/workbook.xml", WORKBOOK_ONE_SHEET),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>42</v></c></row></sheetData></worksheet>"#,
        ),
    ]);
    let model = WorkbookReader::from_bytes(data).unwrap();

    assert_eq!(
        model.sheets[0].cell(1, 1).unwrap().value,
        CellValue::Text(String::new())
    );
}
