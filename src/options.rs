//! Runtime options for a conversion run.
//!
//! Nothing is persisted. JavaScript callers pass a plain object that is
//! deserialized with `serde-wasm-bindgen`; the CLI builds these from flags.
//! Every field has a default, so `{}` is a valid options object.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XlcsvError};

/// Row terminator written after every CSV row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
}

impl LineTerminator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// CSV dialect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvOptions {
    pub delimiter: char,
    pub line_terminator: LineTerminator,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            line_terminator: LineTerminator::Lf,
        }
    }
}

/// Options for a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    pub csv: CsvOptions,
    /// Leave hidden and very hidden sheets out of the archive.
    pub skip_hidden_sheets: bool,
}

impl ConvertOptions {
    /// Reject dialects whose output could not be read back.
    pub fn validate(&self) -> Result<()> {
        match self.csv.delimiter {
            '"' | '\r' | '\n' => Err(XlcsvError::Validation(format!(
                "{:?} cannot be used as a CSV delimiter.",
                self.csv.delimiter
            ))),
            _ => Ok(()),
        }
    }
}
