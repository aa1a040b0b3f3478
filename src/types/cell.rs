use serde::Serialize;

use crate::numfmt::ExcelDateTime;

/// Cell with position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellData {
    pub r: u32, // row (0-indexed)
    pub c: u32, // col (0-indexed)
    pub value: CellValue,
}

/// A typed cell value as stored in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t", content = "v", rename_all = "camelCase")]
pub enum CellValue {
    String(String),
    Number(f64),
    Boolean(bool),
    #[serde(serialize_with = "serialize_date")]
    Date(ExcelDateTime),
    /// Error literal such as `#DIV/0!`
    Error(String),
    Empty,
}

impl CellValue {
    /// True for values that contribute nothing to the used range.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

fn serialize_date<S: serde::Serializer>(
    value: &ExcelDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
