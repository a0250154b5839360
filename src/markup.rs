//! Forward-only XML event scanner.
//!
//! Every extraction pass in [`crate::xlsx`] consumes the same three event
//! kinds: a start element with its attributes, decoded character data, and
//! an end element. [`XmlScanner`] normalizes quick-xml's event stream down
//! to exactly those, expanding self-closing elements into a start
//! immediately followed by an end so callers never special-case them.
//!
//! The scanner is non-validating: tag and attribute tokenization only, no
//! schema or well-formedness checks. Each scanner consumes its buffer once,
//! start to finish.

use crate::error::{Error, Result};

/// One scanner event.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// Start of an element, with attributes in document order.
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// Decoded character data (entity and numeric references resolved).
    Text(String),
    /// End of an element.
    End { name: String },
}

impl XmlEvent {
    /// Look up an attribute value by name on a `Start` event.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            XmlEvent::Start { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// Pull-based scanner over one XML string buffer.
pub struct XmlScanner<'a> {
    reader: quick_xml::Reader<&'a [u8]>,
    // Set when a self-closing element was expanded; its end event is
    // delivered on the next pull.
    pending_end: Option<String>,
}

impl<'a> XmlScanner<'a> {
    /// Create a scanner over an XML string. Surrounding whitespace in
    /// text events is trimmed.
    pub fn new(xml: &'a str) -> Self {
        Self::with_trim(xml, true)
    }

    /// Create a scanner that delivers character data verbatim, including
    /// whitespace-only text events. Callers that honor `xml:space` trim
    /// for themselves.
    pub fn new_preserving(xml: &'a str) -> Self {
        Self::with_trim(xml, false)
    }

    fn with_trim(xml: &'a str, trim: bool) -> Self {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(trim);
        Self {
            reader,
            pending_end: None,
        }
    }

    /// Pull the next event, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        use quick_xml::events::Event;

        if let Some(name) = self.pending_end.take() {
            return Ok(Some(XmlEvent::End { name }));
        }

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = collect_attrs(&e)?;
                    return Ok(Some(XmlEvent::Start { name, attrs }));
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = collect_attrs(&e)?;
                    self.pending_end = Some(name.clone());
                    return Ok(Some(XmlEvent::Start { name, attrs }));
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlParse(err.to_string()))?;
                    return Ok(Some(XmlEvent::Text(text.into_owned())));
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Some(XmlEvent::End { name }));
                }
                Ok(Event::Eof) => return Ok(None),
                // Declarations, comments, processing instructions, doctypes.
                Ok(_) => continue,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
            }
        }
    }
}

fn collect_attrs(e: &quick_xml::events::BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::XmlParse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlParse(err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}
