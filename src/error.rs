//! Structured error types for xlcsv.
//!
//! Every failure in the pipeline is one [`XlcsvError`]; [`ErrorKind`] groups the
//! variants into the three classes the orchestrator reports.

/// All errors that can occur while discovering, decoding, or packaging workbooks.
#[derive(Debug, thiserror::Error)]
pub enum XlcsvError {
    /// The run was rejected before it started (no files, blank root name).
    #[error("{0}")]
    Validation(String),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP container error while reading a workbook.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Legacy BIFF workbook error from calamine.
    #[error("XLS workbook: {0}")]
    Xls(#[from] calamine::XlsError),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure while writing the output archive.
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used for status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any file was touched.
    Validation,
    /// A selected file could not be decoded as a spreadsheet.
    Parse,
    /// Anything else.
    Unknown,
}

impl XlcsvError {
    /// Which class of failure this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Xml(_) | Self::Zip(_) | Self::Xls(_) | Self::Parse(_) => ErrorKind::Parse,
            Self::Archive(_) | Self::Io(_) | Self::Other(_) => ErrorKind::Unknown,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlcsvError>;

impl From<String> for XlcsvError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for XlcsvError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<XlcsvError> for wasm_bindgen::JsValue {
    fn from(e: XlcsvError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
