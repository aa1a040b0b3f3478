//! Data types for the conversion pipeline.

mod cell;
mod file;
mod workbook;

pub use cell::*;
pub use file::*;
pub use workbook::*;
