//! Worksheet parsing - parses individual sheet XML into Sheet structs.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{in_grid, parse_cell_ref_bytes, MAX_ROWS};
use crate::error::{Result, XlcsvError};
use crate::numfmt::ExcelDateTime;
use crate::types::{CellValue, Sheet, SheetState};

/// Sheet metadata from workbook.xml
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
    pub state: SheetState,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    IsoDate,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        b"d" => CellTypeTag::IsoDate,
        _ => CellTypeTag::Default,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}

/// Shared lookups every cell of a workbook resolves against.
pub(super) struct CellContext<'a> {
    pub shared_strings: &'a [String],
    pub date_styles: &'a [bool],
    pub date1904: bool,
}

/// Parse a single worksheet
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
    date_styles: &[bool],
    date1904: bool,
) -> Result<Sheet> {
    let file = archive.by_name(&info.path)?;

    let ctx = CellContext {
        shared_strings,
        date_styles,
        date1904,
    };
    let mut sheet = read_sheet_data(BufReader::new(file), &info.name, &ctx)?;
    sheet.state = info.state;
    Ok(sheet)
}

/// Read `<sheetData>` from worksheet XML.
pub(super) fn read_sheet_data<R: BufRead>(
    reader: R,
    name: &str,
    ctx: &CellContext<'_>,
) -> Result<Sheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Sheet::new(name);

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    // 0-indexed row of the current <row>, and the column a cell without `r` lands in
    let mut current_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut rows_seen: u32 = 0;

    loop {
        buf.clear();
        let event = xml.read_event_into(&mut buf)?;
        let is_start_event = matches!(event, Event::Start(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"row" => {
                    let explicit = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"r")
                        .and_then(|attr| parse_u32_bytes(&attr.value));
                    current_row = match explicit {
                        Some(r) => r.saturating_sub(1),
                        None if rows_seen == 0 => 0,
                        None => current_row.saturating_add(1),
                    };
                    if current_row >= MAX_ROWS {
                        return Err(XlcsvError::Parse(format!(
                            "row {} is outside the worksheet grid in sheet {name:?}",
                            u64::from(current_row) + 1
                        )));
                    }
                    rows_seen = rows_seen.saturating_add(1);
                    next_col = 0;
                }

                b"c" => {
                    // Cell element - parse cell attributes first
                    let mut position: Option<(u32, u32)> = None;
                    let mut cell_type = CellTypeTag::Default;
                    let mut style_idx: Option<u32> = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => position = parse_cell_ref_bytes(&attr.value),
                            b"t" => cell_type = parse_cell_type_tag(&attr.value),
                            b"s" => style_idx = parse_u32_bytes(&attr.value),
                            _ => {}
                        }
                    }

                    let (col, row) = position.unwrap_or((next_col, current_row));
                    if !in_grid(col, row) {
                        return Err(XlcsvError::Parse(format!(
                            "cell at row {}, column {} is outside the worksheet grid in sheet {name:?}",
                            u64::from(row) + 1,
                            u64::from(col) + 1
                        )));
                    }
                    next_col = col.saturating_add(1);

                    // Self-closing cells like <c r="A1"/> have no child elements
                    if is_start_event {
                        let raw = read_cell_text(&mut xml, &mut cell_buf)?;
                        let value = resolve_cell_value(raw.as_deref(), cell_type, style_idx, ctx);
                        sheet.push(row, col, value);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheet)
}

/// Read a cell's children up to `</c>`, returning the text of `<v>` or the
/// concatenated `<t>` runs of an inline string. Formula text is skipped.
fn read_cell_text<R: BufRead>(xml: &mut Reader<R>, buf: &mut Vec<u8>) -> Result<Option<String>> {
    let mut value: Option<String> = None;
    let mut capture = false;
    let mut in_rph = false;

    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(ref inner) => match inner.local_name().as_ref() {
                b"v" => {
                    capture = true;
                    value.get_or_insert_with(String::new);
                }
                b"t" if !in_rph => {
                    capture = true;
                    value.get_or_insert_with(String::new);
                }
                b"rPh" => in_rph = true,
                _ => {}
            },
            Event::Text(ref text) if capture => {
                let text = text.unescape()?;
                value.get_or_insert_with(String::new).push_str(&text);
            }
            Event::CData(ref data) if capture => {
                let text = String::from_utf8_lossy(data);
                value.get_or_insert_with(String::new).push_str(&text);
            }
            Event::End(ref inner) => match inner.local_name().as_ref() {
                b"c" => break,
                b"v" | b"t" => capture = false,
                b"rPh" => in_rph = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(value)
}

/// Turn a raw cell value and its type tag into a typed value.
pub(super) fn resolve_cell_value(
    raw_value: Option<&str>,
    cell_type: CellTypeTag,
    style_idx: Option<u32>,
    ctx: &CellContext<'_>,
) -> CellValue {
    let Some(v) = raw_value else {
        return CellValue::Empty;
    };

    match cell_type {
        CellTypeTag::Shared => {
            let text = v
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| ctx.shared_strings.get(idx));
            match text {
                Some(s) => CellValue::String(s.clone()),
                None => {
                    log::warn!("shared string index {v:?} out of range");
                    CellValue::Empty
                }
            }
        }
        CellTypeTag::Str | CellTypeTag::Inline | CellTypeTag::IsoDate => {
            CellValue::String(v.to_string())
        }
        CellTypeTag::Bool => match v.trim() {
            "1" | "true" => CellValue::Boolean(true),
            "0" | "false" => CellValue::Boolean(false),
            other => CellValue::String(other.to_string()),
        },
        CellTypeTag::Error => CellValue::Error(v.to_string()),
        CellTypeTag::Default => {
            let Ok(num) = v.trim().parse::<f64>() else {
                return CellValue::String(v.to_string());
            };
            let is_date = style_idx
                .and_then(|idx| ctx.date_styles.get(idx as usize))
                .copied()
                .unwrap_or(false);
            if is_date {
                CellValue::Date(ExcelDateTime::from_serial(num, ctx.date1904))
            } else {
                CellValue::Number(num)
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    fn parse_xml(xml: &str, shared: &[String], date_styles: &[bool]) -> Sheet {
        let ctx = CellContext {
            shared_strings: shared,
            date_styles,
            date1904: false,
        };
        read_sheet_data(xml.as_bytes(), "Sheet1", &ctx).unwrap()
    }

    fn value_at(sheet: &Sheet, r: u32, c: u32) -> Option<&CellValue> {
        sheet
            .cells
            .iter()
            .find(|cd| cd.r == r && cd.c == c)
            .map(|cd| &cd.value)
    }

    #[test]
    fn test_typed_cells() {
        let shared = vec!["hello".to_string()];
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="s"><v>0</v></c>
                <c r="B1"><v>42.5</v></c>
                <c r="C1" t="b"><v>1</v></c>
                <c r="D1" t="e"><v>#N/A</v></c>
                <c r="E1" t="str"><f>CONCAT("a","b")</f><v>ab</v></c>
                <c r="F1" t="inlineStr"><is><t xml:space="preserve"> padded </t></is></c>
                <c r="G1" s="1"><v>45306</v></c>
            </row>
        </sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &shared, &[false, true]);

        assert_eq!(value_at(&sheet, 0, 0), Some(&CellValue::String("hello".into())));
        assert_eq!(value_at(&sheet, 0, 1), Some(&CellValue::Number(42.5)));
        assert_eq!(value_at(&sheet, 0, 2), Some(&CellValue::Boolean(true)));
        assert_eq!(value_at(&sheet, 0, 3), Some(&CellValue::Error("#N/A".into())));
        assert_eq!(value_at(&sheet, 0, 4), Some(&CellValue::String("ab".into())));
        assert_eq!(
            value_at(&sheet, 0, 5),
            Some(&CellValue::String(" padded ".into()))
        );
        assert_eq!(
            value_at(&sheet, 0, 6),
            Some(&CellValue::Date(ExcelDateTime::from_serial(45_306.0, false)))
        );
    }

    #[test]
    fn test_rich_inline_string_runs_concatenate() {
        let xml = r#"<worksheet><sheetData><row r="1">
            <c r="A1" t="inlineStr"><is><r><t>Bold</t></r><r><t> plain</t></r></is></c>
        </row></sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &[], &[]);
        assert_eq!(
            value_at(&sheet, 0, 0),
            Some(&CellValue::String("Bold plain".into()))
        );
    }

    #[test]
    fn test_escaped_text() {
        let xml = r#"<worksheet><sheetData><row r="1">
            <c r="A1" t="str"><v>a &amp; b &lt;c&gt;</v></c>
        </row></sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &[], &[]);
        assert_eq!(
            value_at(&sheet, 0, 0),
            Some(&CellValue::String("a & b <c>".into()))
        );
    }

    #[test]
    fn test_cells_without_refs_follow_position() {
        let xml = r#"<worksheet><sheetData>
            <row><c><v>1</v></c><c><v>2</v></c></row>
            <row><c><v>3</v></c></row>
            <row r="5"><c><v>4</v></c></row>
        </sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &[], &[]);
        assert_eq!(value_at(&sheet, 0, 1), Some(&CellValue::Number(2.0)));
        assert_eq!(value_at(&sheet, 1, 0), Some(&CellValue::Number(3.0)));
        assert_eq!(value_at(&sheet, 4, 0), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn test_empty_and_self_closing_cells_dropped() {
        let xml = r#"<worksheet><sheetData><row r="1">
            <c r="A1" s="3"/>
            <c r="B1"></c>
            <c r="C1"><v>7</v></c>
        </row></sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &[], &[]);
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].c, 2);
    }

    #[test]
    fn test_cell_outside_grid_is_error() {
        let ctx = CellContext {
            shared_strings: &[],
            date_styles: &[],
            date1904: false,
        };
        let xml = r#"<worksheet><sheetData><row r="1">
            <c r="A1"><v>1</v></c>
            <c r="ZZZZ3000000"><v>2</v></c>
        </row></sheetData></worksheet>"#;
        let err = read_sheet_data(xml.as_bytes(), "Big", &ctx).unwrap_err();
        assert!(matches!(err, XlcsvError::Parse(_)));
    }

    #[test]
    fn test_row_outside_grid_is_error() {
        let ctx = CellContext {
            shared_strings: &[],
            date_styles: &[],
            date1904: false,
        };
        let xml = r#"<worksheet><sheetData>
            <row r="1048577"><c><v>1</v></c></row>
        </sheetData></worksheet>"#;
        assert!(read_sheet_data(xml.as_bytes(), "Tall", &ctx).is_err());
    }

    #[test]
    fn test_unreferenced_cells_past_last_column_are_error() {
        let ctx = CellContext {
            shared_strings: &[],
            date_styles: &[],
            date1904: false,
        };
        let xml = r#"<worksheet><sheetData><row r="1">
            <c r="XFD1"><v>1</v></c><c><v>2</v></c>
        </row></sheetData></worksheet>"#;
        assert!(read_sheet_data(xml.as_bytes(), "Wide", &ctx).is_err());
    }

    #[test]
    fn test_last_grid_cell_is_accepted() {
        let xml = r#"<worksheet><sheetData><row r="1048576">
            <c r="XFD1048576"><v>1</v></c>
        </row></sheetData></worksheet>"#;
        let sheet = parse_xml(xml, &[], &[]);
        assert_eq!(sheet.used_range(), Some((1_048_575, 16_383)));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let ctx = CellContext {
            shared_strings: &[],
            date_styles: &[],
            date1904: false,
        };
        let xml = "<worksheet><sheetData><row r=\"1\"><c r=\"A1\"><v>1</x></c>";
        assert!(read_sheet_data(xml.as_bytes(), "Bad", &ctx).is_err());
    }
}
