//! Legacy BIFF (`.xls`) workbooks, read through calamine.

use std::io::Cursor;

use calamine::{Data, Reader, SheetType, SheetVisible, Xls};
use chrono::{Datelike, Timelike};

use crate::cell_ref::in_grid;
use crate::error::{Result, XlcsvError};
use crate::numfmt::ExcelDateTime;
use crate::types::{CellValue, Sheet, SheetState, Workbook};

pub(super) fn parse_xls(data: &[u8]) -> Result<Workbook> {
    let mut workbook = Xls::new(Cursor::new(data))?;

    let metadata: Vec<(String, SheetState)> = workbook
        .sheets_metadata()
        .iter()
        .filter(|meta| {
            let keep = meta.typ == SheetType::WorkSheet;
            if !keep {
                log::debug!("skipping non-worksheet sheet {:?}", meta.name);
            }
            keep
        })
        .map(|meta| {
            let state = match meta.visible {
                SheetVisible::Visible => SheetState::Visible,
                SheetVisible::Hidden => SheetState::Hidden,
                SheetVisible::VeryHidden => SheetState::VeryHidden,
            };
            (meta.name.clone(), state)
        })
        .collect();

    let mut sheets = Vec::with_capacity(metadata.len());
    for (name, state) in metadata {
        let range = workbook.worksheet_range(&name)?;
        // used_cells() yields coordinates relative to start()
        let (row0, col0) = range.start().unwrap_or((0, 0));

        let mut sheet = Sheet::new(name);
        sheet.state = state;
        for (row, col, value) in range.used_cells() {
            let (r, c) = grid_position(row0, col0, row, col).ok_or_else(|| {
                XlcsvError::Parse(format!(
                    "cell outside the worksheet grid in sheet {:?}",
                    sheet.name
                ))
            })?;
            sheet.push(r, c, convert_value(value));
        }
        log::debug!("parsed xls sheet {:?} ({} cells)", sheet.name, sheet.cells.len());
        sheets.push(sheet);
    }

    Ok(Workbook {
        sheets,
        date1904: false,
    })
}

/// Absolute 0-indexed (row, col) of a cell yielded relative to the range start.
fn grid_position(row0: u32, col0: u32, row: usize, col: usize) -> Option<(u32, u32)> {
    let r = row0.checked_add(u32::try_from(row).ok()?)?;
    let c = col0.checked_add(u32::try_from(col).ok()?)?;
    in_grid(c, r).then_some((r, c))
}

#[allow(clippy::cast_precision_loss)]
fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match dt.as_datetime() {
                Some(ndt) if !dt.is_duration() => CellValue::Date(ExcelDateTime {
                    year: ndt.year(),
                    month: ndt.month(),
                    day: ndt.day(),
                    hour: ndt.hour(),
                    minute: ndt.minute(),
                    second: ndt.second(),
                    time_only: (0.0..1.0).contains(&serial),
                }),
                _ => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}
