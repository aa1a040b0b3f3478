//! Workbook decoder
//!
//! Sniffs the container from the leading bytes and hands off to the matching
//! reader. The file extension is never trusted.

mod relationships;
mod styles;
mod worksheet;
mod xls;

use std::io::Cursor;
use zip::ZipArchive;

use crate::error::{Result, XlcsvError};
use crate::types::Workbook;

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use styles::parse_date_styles;
use worksheet::parse_sheet;

/// Local file header signature of a ZIP archive (Office Open XML).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE compound document signature (legacy BIFF `.xls`).
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Spreadsheet container formats this crate can decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// Office Open XML package (`.xlsx`).
    Xlsx,
    /// BIFF compound document (`.xls`).
    Xls,
}

/// Identify the container from its signature bytes.
pub fn sniff(data: &[u8]) -> Option<Container> {
    if data.starts_with(ZIP_MAGIC) {
        Some(Container::Xlsx)
    } else if data.starts_with(CFB_MAGIC) {
        Some(Container::Xls)
    } else {
        None
    }
}

/// Parse a workbook from bytes.
///
/// # Errors
/// Fails when the bytes are not a recognised spreadsheet container, when the
/// container is corrupt, or when it holds no worksheets.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let workbook = match sniff(data) {
        Some(Container::Xlsx) => parse_xlsx(data)?,
        Some(Container::Xls) => xls::parse_xls(data)?,
        None => {
            return Err(XlcsvError::Parse(
                "not a spreadsheet file (unrecognised format)".to_string(),
            ))
        }
    };

    if workbook.sheets.is_empty() {
        return Err(XlcsvError::Parse("workbook contains no sheets".to_string()));
    }
    Ok(workbook)
}

fn parse_xlsx(data: &[u8]) -> Result<Workbook> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    if archive.by_name("xl/workbook.xml").is_err() {
        return Err(XlcsvError::Parse(
            "ZIP file is not an Excel workbook (missing xl/workbook.xml)".to_string(),
        ));
    }

    // Parse workbook relationships first to get actual file paths
    let relationships = parse_workbook_relationships(&mut archive)?;

    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;

    let date_styles = parse_date_styles(&mut archive, relationships.styles.as_deref())?;

    // Get sheet names, paths, states, and date1904 flag from workbook.xml
    let (sheet_info, date1904) = get_sheet_info(&mut archive, &relationships.worksheets)?;

    let mut sheets = Vec::with_capacity(sheet_info.len());
    for info in &sheet_info {
        let sheet = parse_sheet(&mut archive, info, &shared_strings, &date_styles, date1904)?;
        log::debug!(
            "parsed sheet {:?} ({} cells) from {}",
            sheet.name,
            sheet.cells.len(),
            info.path
        );
        sheets.push(sheet);
    }

    Ok(Workbook { sheets, date1904 })
}
