//! Error types for the gridbook library.

use std::io;
use thiserror::Error;

/// Result type alias for gridbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or editing a workbook.
///
/// Import distinguishes fatal failures (a corrupt package or a missing
/// workbook manifest abort with no partial model) from conditions recovered
/// locally (missing optional parts, malformed attributes). Formula
/// evaluation never surfaces here at all; it is contained as a display
/// sentinel inside [`crate::formula::Value`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The package container is corrupt or is not a ZIP archive.
    #[error("Package error: {0}")]
    Package(String),

    /// Error tokenizing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing (e.g. the workbook manifest).
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// Invalid or malformed data in the package.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Package(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
