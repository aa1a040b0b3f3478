//! xlcsv - folder of Excel workbooks to a ZIP of CSV files
//!
//! Runs in the browser via WebAssembly or natively:
//! - `.xlsx` and legacy `.xls`, detected from the file signature
//! - one CSV per sheet, mirroring the selected folder under a new root name
//! - deterministic, deflate-compressed archive built entirely in memory
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { Converter, download_archive } from 'xlcsv';
//! await init();
//! const converter = new Converter();
//! converter.add_file("Reports/q1.xlsx", bytes);
//! const zip = await converter.run("Export", (pct) => console.log(pct));
//! download_archive(zip, "Export.zip");
//! ```
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use xlcsv::{convert, ConvertOptions, RunStatus, SelectedFile};
//!
//! let files = vec![SelectedFile::new("Reports/q1.xlsx", std::fs::read("q1.xlsx").unwrap())];
//! if let RunStatus::Success(out) = convert(files, "Export", ConvertOptions::default(), |_| {}) {
//!     std::fs::write(&out.file_name, &out.archive).unwrap();
//! }
//! ```

// Conversion pipeline
pub mod archive;
pub mod cell_ref;
pub mod convert;
pub mod csv;
pub mod discovery;
pub mod error;
pub mod numfmt;
pub mod options;
pub mod parser;
pub mod path_rewrite;
pub mod types;

// Browser surface
#[cfg(target_arch = "wasm32")]
mod converter;
#[cfg(target_arch = "wasm32")]
pub mod delivery;
#[cfg(target_arch = "wasm32")]
pub mod logging;

use wasm_bindgen::prelude::*;

pub use archive::ArchiveBuilder;
pub use convert::{convert, convert_async, ConversionOutput, ConversionRun, RunStatus};
#[cfg(target_arch = "wasm32")]
pub use converter::Converter;
pub use error::{ErrorKind, Result, XlcsvError};
pub use options::{ConvertOptions, CsvOptions, LineTerminator};

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
