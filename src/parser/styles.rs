//! Parsing of the number-format half of xl/styles.xml
//!
//! Cell styles only matter here for one question: does a numeric cell render
//! as a date? The answer is precomputed per `cellXfs` index.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::numfmt::is_date_format_id;

/// Parse styles and return, per cell format index, whether it formats dates.
pub(super) fn parse_date_styles<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<Vec<bool>> {
    let styles_path = path.unwrap_or("xl/styles.xml");
    let Ok(file) = archive.by_name(styles_path) else {
        return Ok(Vec::new());
    };

    read_date_styles(BufReader::new(file))
}

/// Parse styles.xml content
pub(super) fn read_date_styles<R: BufRead>(reader: R) -> Result<Vec<bool>> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    let mut num_fmts: HashMap<u32, String> = HashMap::new();
    let mut xf_fmt_ids: Vec<u32> = Vec::new();

    // State tracking
    let mut in_num_fmts = false;
    let mut in_cell_xfs = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" if in_num_fmts => {
                    let mut id = None;
                    let mut code = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = std::str::from_utf8(&attr.value)
                                    .ok()
                                    .and_then(|s| s.parse().ok());
                            }
                            b"formatCode" => {
                                code = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_default();
                            }
                            _ => {}
                        }
                    }
                    if let Some(id) = id {
                        num_fmts.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"numFmtId")
                        .and_then(|attr| {
                            std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok())
                        })
                        .unwrap_or(0);
                    xf_fmt_ids.push(num_fmt_id);
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(xf_fmt_ids
        .into_iter()
        .map(|id| is_date_format_id(id, num_fmts.get(&id).map(String::as_str)))
        .collect())
}
