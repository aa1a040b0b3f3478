//! Spreadsheet discovery.
//!
//! The filter is shared by every front end. The directory walker is native
//! only; in the browser the folder picker supplies the files.

use crate::types::SelectedFile;

/// Extensions accepted as spreadsheets, compared case-insensitively.
const SPREADSHEET_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Whether a path names a spreadsheet workbook.
pub fn is_spreadsheet_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    SPREADSHEET_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Keep only spreadsheet files, preserving order.
pub fn filter_spreadsheets(files: Vec<SelectedFile>) -> Vec<SelectedFile> {
    files
        .into_iter()
        .filter(|f| is_spreadsheet_path(f.relative_path()))
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::discover_dir;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;
    use walkdir::WalkDir;

    use super::is_spreadsheet_path;
    use crate::error::{Result, XlcsvError};
    use crate::types::SelectedFile;

    /// Walk `root` and read every spreadsheet under it.
    ///
    /// Relative paths start with the directory's own name and use `/` on every
    /// platform. Entries are sorted by file name at each level.
    ///
    /// # Errors
    /// Fails if `root` is not a directory or any entry cannot be read.
    pub fn discover_dir(root: &Path) -> Result<Vec<SelectedFile>> {
        if !root.is_dir() {
            return Err(XlcsvError::Validation(format!(
                "{} is not a directory.",
                root.display()
            )));
        }

        let root_name = root
            .canonicalize()?
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| XlcsvError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            let mut relative_path = root_name.clone();
            for component in rel.components() {
                relative_path.push('/');
                relative_path.push_str(&component.as_os_str().to_string_lossy());
            }

            if !is_spreadsheet_path(&relative_path) {
                log::debug!("skipping {relative_path}");
                continue;
            }

            let bytes = std::fs::read(entry.path())?;
            files.push(SelectedFile::new(relative_path, bytes));
        }

        log::debug!("discovered {} spreadsheet(s) under {}", files.len(), root.display());
        Ok(files)
    }
}
