//! Shared-string table parsing.

use crate::error::Result;
use crate::markup::{XmlEvent, XmlScanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InItem,
    InText,
}

/// Parse `xl/sharedStrings.xml` into the index-addressed string table.
///
/// All text runs inside one `<si>` are concatenated into one entry, so
/// rich-text items collapse to their plain text. Entry order is source
/// order; the position is the index cell values reference.
///
/// A run marked `xml:space="preserve"` keeps its surrounding whitespace;
/// any other run is trimmed.
pub fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let mut scanner = XmlScanner::new_preserving(xml);
    let mut state = State::Idle;
    let mut current = String::new();
    let mut run = String::new();
    let mut preserve = false;

    while let Some(event) = scanner.next_event()? {
        match (state, &event) {
            (State::Idle, XmlEvent::Start { name, .. }) if name == "si" => {
                current.clear();
                state = State::InItem;
            }
            (State::InItem, XmlEvent::Start { name, .. }) if name == "t" => {
                run.clear();
                preserve = event.attr("xml:space") == Some("preserve");
                state = State::InText;
            }
            (State::InText, XmlEvent::Text(text)) => {
                run.push_str(text);
            }
            (State::InText, XmlEvent::End { name }) if name == "t" => {
                current.push_str(if preserve { run.as_str() } else { run.trim() });
                state = State::InItem;
            }
            (State::InItem, XmlEvent::End { name }) if name == "si" => {
                strings.push(std::mem::take(&mut current));
                state = State::Idle;
            }
            _ => {}
        }
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="3">
    <si><t>Hello</t></si>
    <si><t>World</t></si>
    <si><t>A &amp; B</t></si>
</sst>"#;

        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Hello", "World", "A & B"]);
    }

    #[test]
    fn test_rich_text_runs_concatenate() {
        let xml = r#"<sst>
    <si>
        <r><t>Hello</t></r>
        <r><t>World</t></r>
    </si>
    <si><t/></si>
</sst>"#;

        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["HelloWorld", ""]);
    }

    #[test]
    fn test_space_preserve_keeps_padding() {
        let xml = r#"<sst>
    <si><t xml:space="preserve"> padded </t></si>
    <si><t>
        trimmed
    </t></si>
</sst>"#;

        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec![" padded ", "trimmed"]);
    }

    #[test]
    fn test_empty_table() {
        assert!(parse_shared_strings("<sst/>").unwrap().is_empty());
    }
}
