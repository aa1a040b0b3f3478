//! Test fixtures for generating valid XLSX files in memory.
//!
//! # Example
//!
//! ```rust
//! use fixtures::XlsxBuilder;
//!
//! let xlsx = XlsxBuilder::new()
//!     .add_sheet("Sheet1")
//!     .add_cell("A1", "Hello")
//!     .add_cell("B1", 42.0)
//!     .build();
//!
//! let workbook = xlcsv::parser::parse(&xlsx).unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

// ============================================================================
// Cell values
// ============================================================================

/// Represents a cell value that can be added to a sheet.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// A shared string.
    String(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// An error value (e.g., "#DIV/0!").
    Error(String),
    /// An inline string (not shared).
    InlineString(String),
    /// A cached formula string result (`t="str"`).
    FormulaString { formula: String, value: String },
    /// A date serial in a cell styled `yyyy-mm-dd`.
    Date(f64),
    /// A date serial in a cell styled `m/d/yy h:mm`.
    DateTime(f64),
    /// A serial in a cell styled `h:mm:ss`.
    Time(f64),
    /// A number in a cell styled with the workbook's custom format.
    Formatted(f64),
    /// A styled cell with no value.
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// cellXfs indices written by `generate_styles`
const XF_DATE: u32 = 1;
const XF_DATETIME: u32 = 2;
const XF_TIME: u32 = 3;
const XF_CUSTOM: u32 = 4;

// ============================================================================
// Sheet Builder
// ============================================================================

/// A cell in the sheet.
#[derive(Debug, Clone)]
pub struct CellEntry {
    pub cell_ref: String,
    pub value: CellValue,
}

/// Builder for a single worksheet.
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    pub name: String,
    pub state: Option<&'static str>,
    pub cells: Vec<CellEntry>,
}

impl SheetBuilder {
    /// Create a new sheet builder with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: None,
            cells: Vec::new(),
        }
    }

    /// Add a cell with a value.
    #[must_use]
    pub fn cell<V: Into<CellValue>>(mut self, cell_ref: &str, value: V) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: value.into(),
        });
        self
    }

    /// Mark the sheet `state="hidden"`.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.state = Some("hidden");
        self
    }

    /// Mark the sheet `state="veryHidden"`.
    #[must_use]
    pub fn very_hidden(mut self) -> Self {
        self.state = Some("veryHidden");
        self
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

/// Builder for a whole workbook.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    date1904: bool,
    custom_format: Option<String>,
    overrides: Vec<(String, String)>,
}

impl XlsxBuilder {
    /// Create a new XLSX builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished sheet.
    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Add a simple sheet by name (returns a builder for chaining).
    #[must_use]
    pub fn add_sheet(self, name: &str) -> XlsxSheetAdder {
        XlsxSheetAdder {
            builder: self,
            sheet: SheetBuilder::new(name),
        }
    }

    /// Use the 1904 date system.
    #[must_use]
    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Format code behind [`CellValue::Formatted`] cells (default `0.00`).
    #[must_use]
    pub fn number_format(mut self, code: &str) -> Self {
        self.custom_format = Some(code.to_string());
        self
    }

    /// Write `body` in place of the generated part at `path`.
    #[must_use]
    pub fn replace_part(mut self, path: &str, body: &str) -> Self {
        self.overrides.push((path.to_string(), body.to_string()));
        self
    }

    /// Build the XLSX file as bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut shared_strings: Vec<String> = Vec::new();
        for cell in self.sheets.iter().flat_map(|s| &s.cells) {
            if let CellValue::String(ref s) = cell.value {
                if !shared_strings.contains(s) {
                    shared_strings.push(s.clone());
                }
            }
        }

        let overrides = &self.overrides;
        let mut put = |path: &str, body: String| {
            let body = overrides
                .iter()
                .find(|(p, _)| p == path)
                .map_or(body, |(_, b)| b.clone());
            zip.start_file(path, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", generate_content_types(self.sheets.len()));
        put("_rels/.rels", generate_rels());
        put(
            "xl/_rels/workbook.xml.rels",
            generate_workbook_rels(self.sheets.len()),
        );
        put("xl/workbook.xml", generate_workbook(&self.sheets, self.date1904));
        let custom_format = self.custom_format.as_deref().unwrap_or("0.00");
        put("xl/styles.xml", generate_styles(custom_format));
        if !shared_strings.is_empty() {
            put("xl/sharedStrings.xml", generate_shared_strings(&shared_strings));
        }
        for (i, sheet) in self.sheets.iter().enumerate() {
            put(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                generate_sheet_xml(sheet, &shared_strings),
            );
        }

        zip.finish().expect("Failed to finish ZIP").into_inner()
    }
}

/// Helper for fluent sheet building within `XlsxBuilder`.
pub struct XlsxSheetAdder {
    builder: XlsxBuilder,
    sheet: SheetBuilder,
}

impl XlsxSheetAdder {
    /// Add a cell to the current sheet.
    #[must_use]
    pub fn add_cell<V: Into<CellValue>>(mut self, cell_ref: &str, value: V) -> Self {
        self.sheet = self.sheet.cell(cell_ref, value);
        self
    }

    /// Hide the current sheet.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.sheet = self.sheet.hidden();
        self
    }

    /// Finish the current sheet and return the builder.
    #[must_use]
    pub fn done(mut self) -> XlsxBuilder {
        self.builder.sheets.push(self.sheet);
        self.builder
    }

    /// Build the XLSX directly (finishes the current sheet automatically).
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.done().build()
    }
}

// ============================================================================
// XML generation
// ============================================================================

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Generate [Content_Types].xml
fn generate_content_types(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// Generate _rels/.rels
fn generate_rels() -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#);
    xml.push_str("</Relationships>");
    xml
}

/// Generate xl/_rels/workbook.xml.rels
fn generate_workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    let rid = sheet_count + 1;
    xml.push_str(&format!(
        r#"<Relationship Id="rId{rid}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    ));
    let rid = rid + 1;
    xml.push_str(&format!(
        r#"<Relationship Id="rId{rid}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

/// Generate xl/workbook.xml
fn generate_workbook(sheets: &[SheetBuilder], date1904: bool) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    if date1904 {
        xml.push_str(r#"<workbookPr date1904="1"/>"#);
    }
    xml.push_str("<sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        let state = sheet
            .state
            .map(|s| format!(r#" state="{s}""#))
            .unwrap_or_default();
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}"{state} r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets>");
    xml.push_str("</workbook>");
    xml
}

/// Generate xl/styles.xml with fixed date, date-time and time formats plus
/// one custom format.
fn generate_styles(custom_format: &str) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    xml.push_str(r#"<numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>"#);
    xml.push_str(&format!(
        r#"<numFmt numFmtId="165" formatCode="{}"/></numFmts>"#,
        escape_xml(custom_format)
    ));
    xml.push_str(r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#);
    xml.push_str(r#"<fills count="1"><fill><patternFill patternType="none"/></fill></fills>"#);
    xml.push_str(r#"<borders count="1"><border/></borders>"#);
    xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);
    xml.push_str(r#"<cellXfs count="5">"#);
    xml.push_str(r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#);
    xml.push_str(r#"<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#);
    xml.push_str(r#"<xf numFmtId="22" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#);
    xml.push_str(r#"<xf numFmtId="21" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#);
    xml.push_str(r#"<xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#);
    xml.push_str("</cellXfs>");
    xml.push_str("</styleSheet>");
    xml
}

/// Generate xl/sharedStrings.xml
fn generate_shared_strings(strings: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        strings.len(),
        strings.len()
    ));
    for s in strings {
        // Add xml:space="preserve" to preserve leading/trailing whitespace
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape_xml(s)
        ));
    }
    xml.push_str("</sst>");
    xml
}

/// Generate a sheet XML file
fn generate_sheet_xml(sheet: &SheetBuilder, shared_strings: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    xml.push_str("<sheetData>");

    // Group cells by row
    let mut rows: BTreeMap<u32, Vec<&CellEntry>> = BTreeMap::new();
    for cell in &sheet.cells {
        rows.entry(row_of(&cell.cell_ref)).or_default().push(cell);
    }

    for (row_num, cells) in rows {
        xml.push_str(&format!(r#"<row r="{row_num}">"#));
        for cell in cells {
            let r = &cell.cell_ref;
            match &cell.value {
                CellValue::String(s) => {
                    let idx = shared_strings.iter().position(|x| x == s).unwrap_or(0);
                    xml.push_str(&format!(r#"<c r="{r}" t="s"><v>{idx}</v></c>"#));
                }
                CellValue::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{r}"><v>{n}</v></c>"#));
                }
                CellValue::Boolean(b) => {
                    let v = if *b { "1" } else { "0" };
                    xml.push_str(&format!(r#"<c r="{r}" t="b"><v>{v}</v></c>"#));
                }
                CellValue::Error(e) => {
                    xml.push_str(&format!(r#"<c r="{r}" t="e"><v>{}</v></c>"#, escape_xml(e)));
                }
                CellValue::InlineString(s) => {
                    xml.push_str(&format!(
                        r#"<c r="{r}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        escape_xml(s)
                    ));
                }
                CellValue::FormulaString { formula, value } => {
                    xml.push_str(&format!(
                        r#"<c r="{r}" t="str"><f>{}</f><v>{}</v></c>"#,
                        escape_xml(formula),
                        escape_xml(value)
                    ));
                }
                CellValue::Date(n) => {
                    xml.push_str(&format!(r#"<c r="{r}" s="{XF_DATE}"><v>{n}</v></c>"#));
                }
                CellValue::DateTime(n) => {
                    xml.push_str(&format!(r#"<c r="{r}" s="{XF_DATETIME}"><v>{n}</v></c>"#));
                }
                CellValue::Time(n) => {
                    xml.push_str(&format!(r#"<c r="{r}" s="{XF_TIME}"><v>{n}</v></c>"#));
                }
                CellValue::Formatted(n) => {
                    xml.push_str(&format!(r#"<c r="{r}" s="{XF_CUSTOM}"><v>{n}</v></c>"#));
                }
                CellValue::Empty => {
                    xml.push_str(&format!(r#"<c r="{r}" s="{XF_DATE}"/>"#));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData>");
    xml.push_str("</worksheet>");
    xml
}

/// 1-indexed row of a cell reference like "B12".
fn row_of(cell_ref: &str) -> u32 {
    cell_ref
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap()
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Create a valid XLSX with a single empty sheet.
#[must_use]
pub fn minimal_xlsx() -> Vec<u8> {
    XlsxBuilder::new().add_sheet("Sheet1").build()
}

/// Create an XLSX whose sheets each hold their own name in A1.
#[must_use]
pub fn xlsx_with_sheets(names: &[&str]) -> Vec<u8> {
    names
        .iter()
        .fold(XlsxBuilder::new(), |builder, name| {
            builder.add_sheet(name).add_cell("A1", *name).done()
        })
        .build()
}

/// Create an XLSX with a single cell containing text.
#[must_use]
pub fn xlsx_with_text(text: &str) -> Vec<u8> {
    XlsxBuilder::new()
        .add_sheet("Sheet1")
        .add_cell("A1", text)
        .build()
}
