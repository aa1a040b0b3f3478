//! Archive path construction.
//!
//! Output paths keep the selected folder's layout but swap its top-level name
//! for the user's root name and the workbook's file name for a `.csv` leaf.

/// Replace the first segment of `relative_path` with `new_root` and the last
/// with `new_leaf`. Middle segments are kept verbatim.
///
/// A path with a single segment has no root folder to replace, so the result
/// is `<new_root>/<new_leaf>`.
pub fn rewrite(relative_path: &str, new_root: &str, new_leaf: &str) -> String {
    let root = new_root.trim();
    let segments: Vec<&str> = relative_path.split('/').collect();

    let middle = match segments.len() {
        0..=2 => &[][..],
        n => segments.get(1..n - 1).unwrap_or(&[]),
    };

    let mut out = String::with_capacity(relative_path.len() + root.len() + new_leaf.len());
    out.push_str(root);
    for segment in middle {
        out.push('/');
        out.push_str(segment);
    }
    out.push('/');
    out.push_str(new_leaf);
    out
}

/// File name without its final extension. Dotfiles keep their name.
fn stem(leaf: &str) -> &str {
    match leaf.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => leaf,
    }
}

/// Leaf for a workbook that has exactly one sheet: `report.xlsx` -> `report.csv`.
pub fn single_sheet_leaf(leaf: &str) -> String {
    format!("{}.csv", stem(leaf))
}

/// Leaf for one sheet of a multi-sheet workbook: `data.xlsx` + `Q1` -> `data_Q1.csv`.
///
/// The sheet name is not sanitized; a `/` in it adds a directory level.
pub fn sheet_leaf(leaf: &str, sheet_name: &str) -> String {
    format!("{}_{sheet_name}.csv", stem(leaf))
}

/// Last `/`-separated segment of a relative path.
pub fn leaf_of(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}
