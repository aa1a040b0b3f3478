//! Minimal CSV writer that turns one [`Sheet`] into delimited text.

use crate::options::CsvOptions;
use crate::types::{CellData, CellValue, Sheet};

/// Serialize a sheet to CSV.
///
/// Rows run from 1 to the last used row and columns from A to the last used
/// column; every row, including the last, ends with the configured terminator.
/// A sheet with no values yields an empty string.
pub fn sheet_to_csv(sheet: &Sheet, options: &CsvOptions) -> String {
    let Some((last_row, last_col)) = sheet.used_range() else {
        return String::new();
    };

    let mut cells: Vec<&CellData> = sheet
        .cells
        .iter()
        .filter(|cd| !cd.value.is_empty())
        .collect();
    // Stable, so a later duplicate of the same position wins below
    cells.sort_by_key(|cd| (cd.r, cd.c));
    let mut cells = cells.into_iter().peekable();

    let width = last_col as usize + 1;
    let terminator = options.line_terminator.as_str();
    let mut out = String::new();
    let mut row_values: Vec<Option<&CellValue>> = vec![None; width];
    let mut field = String::new();

    for row in 0..=last_row {
        row_values.iter_mut().for_each(|slot| *slot = None);
        while let Some(cd) = cells.next_if(|cd| cd.r == row) {
            if let Some(slot) = row_values.get_mut(cd.c as usize) {
                *slot = Some(&cd.value);
            }
        }

        for (col, value) in row_values.iter().enumerate() {
            if col > 0 {
                out.push(options.delimiter);
            }
            if let Some(value) = value {
                field.clear();
                display_text(value, &mut field);
                push_field(&mut out, &field, options.delimiter);
            }
        }
        out.push_str(terminator);
    }

    out
}

/// Render a value as CSV display text.
pub fn display_text(value: &CellValue, out: &mut String) {
    use std::fmt::Write;

    match value {
        CellValue::String(s) | CellValue::Error(s) => out.push_str(s),
        CellValue::Number(n) => push_number(*n, out),
        CellValue::Boolean(true) => out.push_str("TRUE"),
        CellValue::Boolean(false) => out.push_str("FALSE"),
        CellValue::Date(dt) => {
            let _ = write!(out, "{dt}");
        }
        CellValue::Empty => {}
    }
}

/// Shortest round-trip decimal form, no exponent, no grouping.
fn push_number(n: f64, out: &mut String) {
    use std::fmt::Write;

    if n == 0.0 {
        // Covers -0.0
        out.push('0');
    } else {
        let _ = write!(out, "{n}");
    }
}

/// Append a field, quoting it when it holds the delimiter, a quote, or a line break.
fn push_field(out: &mut String, field: &str, delimiter: char) {
    let needs_quotes = field
        .chars()
        .any(|ch| ch == delimiter || matches!(ch, '"' | '\r' | '\n'));

    if !needs_quotes {
        out.push_str(field);
        return;
    }

    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            // Escaped quote
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::numfmt::ExcelDateTime;
    use crate::options::LineTerminator;
    use test_case::test_case;

    fn sheet_with(cells: &[(u32, u32, CellValue)]) -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        for (r, c, v) in cells {
            sheet.push(*r, *c, v.clone());
        }
        sheet
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_basic_grid() {
        let sheet = sheet_with(&[
            (0, 0, text("Name")),
            (0, 1, text("Age")),
            (1, 0, text("Alice")),
            (1, 1, CellValue::Number(30.0)),
        ]);
        assert_eq!(
            sheet_to_csv(&sheet, &CsvOptions::default()),
            "Name,Age\nAlice,30\n"
        );
    }

    #[test_case("a,b", "\"a,b\"" ; "comma")]
    #[test_case("He said \"hi\"", "\"He said \"\"hi\"\"\"" ; "quotes")]
    #[test_case("line1\nline2", "\"line1\nline2\"" ; "newline")]
    #[test_case("cr\rhere", "\"cr\rhere\"" ; "carriage return")]
    #[test_case("plain text", "plain text" ; "unquoted")]
    #[test_case("semi;colon", "semi;colon" ; "other punctuation")]
    fn test_quoting(input: &str, expected: &str) {
        let sheet = sheet_with(&[(0, 0, text(input))]);
        assert_eq!(
            sheet_to_csv(&sheet, &CsvOptions::default()),
            format!("{expected}\n")
        );
    }

    #[test_case(42.0, "42")]
    #[test_case(-3.5, "-3.5")]
    #[test_case(1234567.891, "1234567.891")]
    #[test_case(0.1 + 0.2, "0.30000000000000004")]
    #[test_case(-0.0, "0")]
    #[test_case(1e21, "1000000000000000000000")]
    fn test_number_text(value: f64, expected: &str) {
        let mut out = String::new();
        display_text(&CellValue::Number(value), &mut out);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_booleans_errors_and_dates() {
        let sheet = sheet_with(&[
            (0, 0, CellValue::Boolean(true)),
            (0, 1, CellValue::Boolean(false)),
            (0, 2, CellValue::Error("#DIV/0!".to_string())),
            (
                0,
                3,
                CellValue::Date(ExcelDateTime::from_serial(45_306.0, false)),
            ),
        ]);
        assert_eq!(
            sheet_to_csv(&sheet, &CsvOptions::default()),
            "TRUE,FALSE,#DIV/0!,2024-01-15\n"
        );
    }

    #[test]
    fn test_gaps_are_padded_to_used_range() {
        // B2 and D4 used: rows 1-4, columns A-D
        let sheet = sheet_with(&[(1, 1, text("x")), (3, 3, text("y"))]);
        assert_eq!(
            sheet_to_csv(&sheet, &CsvOptions::default()),
            ",,,\n,x,,\n,,,\n,,,y\n"
        );
    }

    #[test]
    fn test_single_column_blank_row_is_empty_line() {
        let sheet = sheet_with(&[(0, 0, text("a")), (2, 0, text("b"))]);
        assert_eq!(sheet_to_csv(&sheet, &CsvOptions::default()), "a\n\nb\n");
    }

    #[test]
    fn test_cells_out_of_order_are_sorted() {
        let sheet = sheet_with(&[(1, 0, text("second")), (0, 0, text("first"))]);
        assert_eq!(
            sheet_to_csv(&sheet, &CsvOptions::default()),
            "first\nsecond\n"
        );
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::new("Empty");
        assert_eq!(sheet_to_csv(&sheet, &CsvOptions::default()), "");
    }

    #[test]
    fn test_custom_dialect() {
        let sheet = sheet_with(&[(0, 0, text("a;b")), (0, 1, text("c,d"))]);
        let options = CsvOptions {
            delimiter: ';',
            line_terminator: LineTerminator::CrLf,
        };
        assert_eq!(sheet_to_csv(&sheet, &options), "\"a;b\";c,d\r\n");
    }
}
