//! ZIP container abstraction for the workbook package.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Package reader over a ZIP-structured byte buffer.
///
/// Parses the archive's central directory on construction and exposes a
/// lookup from internal part path to fully decompressed content. A corrupt
/// or missing central directory is fatal; an absent part is not.
pub struct PackageReader {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl PackageReader {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gridbook::container::PackageReader;
    ///
    /// let package = PackageReader::open("book.xlsx")?;
    /// # Ok::<(), gridbook::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a package reader from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create a package reader from a seekable reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part as a decoded string.
    ///
    /// Returns `Ok(None)` when the part does not exist. A part that exists
    /// but fails to decompress is an error: import never proceeds over a
    /// partially read container.
    ///
    /// Handles UTF-8 (with or without BOM) and UTF-16 LE/BE content.
    pub fn read_part(&self, path: &str) -> Result<Option<String>> {
        match self.read_part_bytes(path)? {
            Some(bytes) => decode_xml_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Read a part's raw decompressed bytes.
    pub fn read_part_bytes(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = match archive.by_name(path) {
            Ok(f) => f,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Check if a part exists in the package.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all part names in the package.
    pub fn part_names(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }
}

impl std::fmt::Debug for PackageReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageReader")
            .field("parts", &self.archive.borrow().len())
            .finish()
    }
}

/// Decode XML part bytes, honoring a BOM when present.
///
/// Workbook parts are almost always UTF-8, but UTF-16 packages exist in the
/// wild; a decoded buffer is always handed to the scanner as UTF-8.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec()).map_err(|e| Error::Encoding(e.to_string()));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        // No BOM and not valid UTF-8: salvage what we can rather than
        // failing the whole import over one part.
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| combine([bytes[i], bytes[i + 1]]));
    let decoded = char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))?;
    // The declaration still names UTF-16; the scanner sees UTF-8 now.
    Ok(decoded
        .replacen("encoding=\"UTF-16\"", "encoding=\"UTF-8\"", 1)
        .replacen("encoding='UTF-16'", "encoding='UTF-8'", 1))
}
