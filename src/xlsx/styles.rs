//! Styles table parsing: number formats and cell formatting records.

use crate::error::Result;
use crate::markup::{XmlEvent, XmlScanner};
use crate::model::CellXfsStyle;
use std::collections::HashMap;
use tracing::debug;

/// Parsed contents of `xl/styles.xml`.
#[derive(Debug, Default)]
pub struct StylesPart {
    /// numFmtId → format code.
    pub num_fmts: HashMap<u32, String>,
    /// Ordered style records; a cell's `s` attribute is a 0-based index.
    pub cell_xfs: Vec<CellXfsStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InNumFmts,
    InCellXfs,
}

/// Parse `xl/styles.xml`.
///
/// Only `<cellXfs>` records enter the style list; the `<cellStyleXfs>`
/// section also holds `<xf>` elements and must not. A malformed numeric
/// attribute degrades to an absent field, never an abort.
pub fn parse_styles(xml: &str) -> Result<StylesPart> {
    let mut part = StylesPart::default();
    let mut scanner = XmlScanner::new(xml);
    let mut state = State::Idle;

    while let Some(event) = scanner.next_event()? {
        match (state, &event) {
            (State::Idle, XmlEvent::Start { name, .. }) if name == "numFmts" => {
                state = State::InNumFmts;
            }
            (State::Idle, XmlEvent::Start { name, .. }) if name == "cellXfs" => {
                state = State::InCellXfs;
            }
            (State::InNumFmts, XmlEvent::Start { name, .. }) if name == "numFmt" => {
                match event.attr("numFmtId").and_then(|v| v.parse::<u32>().ok()) {
                    Some(id) => {
                        let code = event.attr("formatCode").unwrap_or_default().to_string();
                        part.num_fmts.insert(id, code);
                    }
                    None => debug!("skipping numFmt with malformed numFmtId"),
                }
            }
            (State::InCellXfs, XmlEvent::Start { name, .. }) if name == "xf" => {
                part.cell_xfs.push(CellXfsStyle {
                    num_fmt_id: attr_u32(&event, "numFmtId"),
                    font_id: attr_u32(&event, "fontId"),
                    fill_id: attr_u32(&event, "fillId"),
                    border_id: attr_u32(&event, "borderId"),
                    xf_id: attr_u32(&event, "xfId"),
                });
            }
            (State::InNumFmts, XmlEvent::End { name }) if name == "numFmts" => {
                state = State::Idle;
            }
            (State::InCellXfs, XmlEvent::End { name }) if name == "cellXfs" => {
                state = State::Idle;
            }
            _ => {}
        }
    }

    Ok(part)
}

fn attr_u32(event: &XmlEvent, key: &str) -> Option<u32> {
    event.attr(key).and_then(|v| v.parse().ok())
}
