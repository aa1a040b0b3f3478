//! Number format inspection and Excel date serial conversion.
//!
//! CSV output only needs to know whether a numeric cell is a date, and if so
//! which calendar instant its serial value names. Everything else in a
//! format code is ignored, so numbers come out locale-invariant.

use std::fmt;

/// Get the built-in format code for a format ID.
///
/// Only the IDs the ECMA-376 table pins to a fixed code are listed.
/// See: ECMA-376 Part 1, Section 18.8.30
pub const fn get_builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

/// Locale-dependent built-in IDs that Excel always renders as dates.
const fn is_locale_date_id(id: u32) -> bool {
    matches!(id, 27..=36 | 50..=58)
}

/// Check if a format code is a date/time format
pub fn is_date_format(format_code: &str) -> bool {
    let lower = format_code.to_lowercase();

    // Skip text in quotes and brackets, escaped literals, padding and fill
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut cleaned = String::new();

    let mut chars = lower.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            // `\x` is a literal, `_x` pads by the width of x, `*x` fills with x
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if !in_brackets => cleaned.push(c),
            _ => {}
        }
    }

    if cleaned == "general" {
        return false;
    }

    // Check for date/time tokens
    cleaned.contains('y') ||
    cleaned.contains('m') && !cleaned.contains('#') ||  // m is month if no # (number format)
    cleaned.contains('d') ||
    cleaned.contains('h') ||
    cleaned.contains('s') && cleaned.contains(':') // s is seconds if with colon
}

/// Decide whether a cell format (by `numFmtId`) renders numbers as dates.
///
/// `custom_code` is the workbook's own code for that ID, if it declares one.
pub fn is_date_format_id(id: u32, custom_code: Option<&str>) -> bool {
    if let Some(code) = custom_code {
        return is_date_format(code);
    }
    if is_locale_date_id(id) {
        return true;
    }
    get_builtin_format(id).is_some_and(is_date_format)
}

/// A calendar instant decoded from an Excel date serial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExcelDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Serial was below one day: a bare time of day with no date part.
    pub time_only: bool,
}

impl ExcelDateTime {
    /// Convert an Excel serial (days since the workbook epoch) to calendar parts.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_serial(serial: f64, date1904: bool) -> Self {
        let time_only = (0.0..1.0).contains(&serial);

        // Round once on the whole serial so 23:59:59.9 carries into the next day
        let total_seconds = (serial * 86_400.0).round() as i64;
        let days = total_seconds.div_euclid(86_400);
        let secs = total_seconds.rem_euclid(86_400);

        let (year, month, day) = serial_days_to_ymd(days, date1904);

        #[allow(clippy::cast_sign_loss)]
        let secs = secs as u32;
        Self {
            year,
            month,
            day,
            hour: secs / 3600,
            minute: (secs % 3600) / 60,
            second: secs % 60,
            time_only,
        }
    }

    fn has_time(&self) -> bool {
        self.hour != 0 || self.minute != 0 || self.second != 0
    }
}

impl fmt::Display for ExcelDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time_only {
            return write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        }
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.has_time() {
            write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        }
        Ok(())
    }
}

/// Convert whole days since the epoch to (year, month, day).
#[allow(clippy::cast_possible_truncation)]
fn serial_days_to_ymd(days: i64, date1904: bool) -> (i32, u32, u32) {
    // Excel 1900 system: serial 1 = Jan 1, 1900 = JDN 2415021
    // Excel 1904 system: serial 0 = Jan 1, 1904 = JDN 2416481
    let jdn = if date1904 {
        days + 2_416_481
    } else if days <= 60 {
        // Serial 60 is Excel's phantom Feb 29, 1900
        days + 2_415_020
    } else {
        days + 2_415_019
    };
    jdn_to_ymd(jdn)
}

/// Convert Julian Day Number to (year, month, day) in proleptic Gregorian calendar
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn jdn_to_ymd(jdn: i64) -> (i32, u32, u32) {
    // Algorithm from: https://en.wikipedia.org/wiki/Julian_day#Julian_or_Gregorian_calendar_from_Julian_day_number
    let y = 4716;
    let j = 1401;
    let m = 2;
    let n = 12;
    let r = 4;
    let p = 1461;
    let v = 3;
    let u = 5;
    let s = 153;
    let w = 2;
    let b = 274_277;
    let c = -38;

    let f = jdn + j + (((4 * jdn + b) / 146_097) * 3) / 4 + c;
    let e = r * f + v;
    let g = (e % p) / r;
    let h = u * g + w;

    let day = (h % s) / u + 1;
    let month = ((h / s + m) % n) + 1;
    let year = (e / p) - y + (n + m - month) / n;

    (year as i32, month as u32, day as u32)
}
