use serde::Serialize;

use super::{CellData, CellValue};

/// A parsed workbook: every sheet in source order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Whether the workbook uses the 1904 date system (Mac default)
    /// If false, uses the 1900 date system (Windows default)
    #[serde(skip_serializing_if = "is_false")]
    pub date1904: bool,
}

/// Helper function for serde skip_serializing_if
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl Workbook {
    /// Sheet names in source order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

/// Sheet visibility state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

/// A named grid of cells. Cells are sparse; anything not listed is empty.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    pub state: SheetState,
    pub cells: Vec<CellData>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: SheetState::Visible,
            cells: Vec::new(),
        }
    }

    /// Append a cell. Empty values are dropped.
    pub fn push(&mut self, r: u32, c: u32, value: CellValue) {
        if !value.is_empty() {
            self.cells.push(CellData { r, c, value });
        }
    }

    /// Inclusive (last_row, last_col) of the used range, anchored at A1.
    ///
    /// `None` when the sheet holds no non-empty cell.
    pub fn used_range(&self) -> Option<(u32, u32)> {
        self.cells
            .iter()
            .filter(|cd| !cd.value.is_empty())
            .fold(None, |acc, cd| match acc {
                None => Some((cd.r, cd.c)),
                Some((r, c)) => Some((r.max(cd.r), c.max(cd.c))),
            })
    }

    pub fn is_hidden(&self) -> bool {
        self.state != SheetState::Visible
    }
}
