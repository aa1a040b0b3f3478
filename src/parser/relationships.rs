//! Relationship parsing - workbook relationships, sheet list, shared strings.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{Result, XlcsvError};
use crate::types::SheetState;

use super::worksheet::SheetInfo;

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels
///
/// Paths are resolved relative to the xl/ directory and stored as full paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// Map of rId -> full path for worksheet relationships
    /// e.g., "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    /// Path to shared strings file (e.g., "xl/sharedStrings.xml")
    pub shared_strings: Option<String>,
    /// Path to styles file (e.g., "xl/styles.xml")
    pub styles: Option<String>,
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels
///
/// A missing part yields empty relationships; a malformed one is an error.
pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<WorkbookRelationships> {
    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return Ok(WorkbookRelationships::default()); // Relationships file is optional
    };
    read_workbook_relationships(BufReader::new(file))
}

fn read_workbook_relationships<R: BufRead>(reader: R) -> Result<WorkbookRelationships> {
    let mut rels = WorkbookRelationships::default();
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    // Elements still open; quick-xml reports a part cut off mid-tag as a plain Eof
    let mut depth = 0usize;

    loop {
        buf.clear();
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        match event {
            Event::Empty(ref e) | Event::Start(ref e) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut rel_type = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Target" => {
                                target = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Type" => {
                                rel_type =
                                    std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    let full_path = resolve_target(&target);

                    // Categorize by relationship type
                    if rel_type.ends_with("/worksheet") && !id.is_empty() && !target.is_empty() {
                        rels.worksheets.insert(id, full_path);
                    } else if rel_type.ends_with("/sharedStrings") {
                        rels.shared_strings = Some(full_path);
                    } else if rel_type.ends_with("/styles") {
                        rels.styles = Some(full_path);
                    }
                }
            }
            Event::Eof if depth > 0 => {
                return Err(XlcsvError::Parse(
                    "xl/_rels/workbook.xml.rels ends inside an open element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rels)
}

/// Resolve a relationship target relative to xl/, folding `..` segments.
fn resolve_target(target: &str) -> String {
    let joined = if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("xl/{target}")
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Get sheet names, paths, and states from xl/workbook.xml
/// Also returns the date1904 flag
pub(super) fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<(Vec<SheetInfo>, bool)> {
    let file = archive.by_name("xl/workbook.xml")?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut buf = Vec::new();
    let mut position = 0usize;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => {
                let local_name = e.local_name();
                let name_bytes = local_name.as_ref();

                if name_bytes == b"workbookPr" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"date1904" {
                            let val = std::str::from_utf8(&attr.value).unwrap_or("0");
                            date1904 = val == "1" || val.eq_ignore_ascii_case("true");
                        }
                    }
                } else if name_bytes == b"sheet" {
                    position += 1;
                    let mut name = String::new();
                    let mut r_id = String::new();
                    let mut state = SheetState::Visible;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_default();
                            }
                            b"state" => {
                                state = match attr.value.as_ref() {
                                    b"hidden" => SheetState::Hidden,
                                    b"veryHidden" => SheetState::VeryHidden,
                                    _ => SheetState::Visible,
                                };
                            }
                            // r:id attribute (namespace prefixed)
                            key if key.ends_with(b":id") || key == b"id" => {
                                r_id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    let path = if name.is_empty() {
                        None
                    } else if relationships.is_empty() {
                        // No relationships part: assume the conventional layout
                        Some(format!("xl/worksheets/sheet{position}.xml"))
                    } else {
                        // Chartsheets and dialog sheets carry no cell grid
                        let path = relationships.get(&r_id).cloned();
                        if path.is_none() {
                            log::debug!("skipping non-worksheet sheet {name:?}");
                        }
                        path
                    };

                    if let Some(path) = path {
                        sheets.push(SheetInfo { name, path, state });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

/// Parse shared strings from the shared strings part.
///
/// Rich text runs are concatenated; phonetic runs (`rPh`) are dropped.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<Vec<String>> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Ok(Vec::new()); // SharedStrings is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current_string = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_rph = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current_string.clear();
                }
                b"rPh" => in_rph = true,
                b"t" if in_si && !in_rph => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                // <si/> is a valid empty string
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Event::Text(ref e) if in_t => {
                current_string.push_str(&e.unescape()?);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current_string));
                    in_si = false;
                }
                b"rPh" => in_rph = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}
