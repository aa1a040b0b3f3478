//! Conversion orchestrator.
//!
//! A [`ConversionRun`] is created by [`ConversionRun::start`] (Idle -> Running)
//! and advanced one file at a time with [`ConversionRun::step`]. The first file
//! that fails to decode ends the run; [`ConversionRun::finish`] then reports
//! `Failed` and no archive is built. Otherwise `finish` finalizes the archive
//! and reports `Success`.
//!
//! [`convert`] and [`convert_async`] are the drivers front ends call.

use std::future::Future;

use serde::Serialize;

use crate::archive::ArchiveBuilder;
use crate::csv::sheet_to_csv;
use crate::discovery::filter_spreadsheets;
use crate::error::{ErrorKind, Result, XlcsvError};
use crate::options::ConvertOptions;
use crate::parser;
use crate::path_rewrite::{leaf_of, rewrite, sheet_leaf, single_sheet_leaf};
use crate::types::{SelectedFile, Sheet};

/// Message reported when a failure carries no description of its own.
pub const GENERIC_FAILURE: &str = "Conversion failed.";

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunStatus {
    /// The run was never started.
    ValidationError(String),
    /// The run was aborted; no archive exists.
    Failed {
        message: String,
        kind: ErrorKind,
        /// Relative path of the file that could not be converted, if any.
        file: Option<String>,
    },
    Success(ConversionOutput),
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The user-facing message of a validation or run error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::ValidationError(message) | Self::Failed { message, .. } => Some(message),
            Self::Success(_) => None,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutput {
    /// Suggested download name, `<root>.zip`.
    pub file_name: String,
    pub files_converted: usize,
    /// Archive paths in archive order.
    pub entries: Vec<String>,
    #[serde(skip)]
    pub archive: Vec<u8>,
}

struct RunFailure {
    error: XlcsvError,
    file: Option<String>,
}

/// State of one conversion run.
pub struct ConversionRun {
    files: Vec<SelectedFile>,
    root: String,
    options: ConvertOptions,
    builder: ArchiveBuilder,
    completed: usize,
    failure: Option<RunFailure>,
}

impl ConversionRun {
    /// Validate the inputs and enter the Running state.
    ///
    /// Non-spreadsheet files are dropped first.
    ///
    /// # Errors
    /// [`XlcsvError::Validation`] when no spreadsheet remains, when `root` is
    /// blank, or when the options are unusable.
    pub fn start(files: Vec<SelectedFile>, root: &str, options: ConvertOptions) -> Result<Self> {
        let selected = files.len();
        let files = filter_spreadsheets(files);
        if files.is_empty() {
            let message = if selected == 0 {
                "Choose a folder to convert first."
            } else {
                "The selected folder contains no .xlsx or .xls files."
            };
            return Err(XlcsvError::Validation(message.to_string()));
        }

        let root = root.trim();
        if root.is_empty() {
            return Err(XlcsvError::Validation(
                "Enter a name for the output folder.".to_string(),
            ));
        }
        options.validate()?;

        log::debug!(
            "starting run: {} spreadsheet(s) of {selected} selected, root {root:?}",
            files.len()
        );
        Ok(Self {
            files,
            root: root.to_string(),
            options,
            builder: ArchiveBuilder::new(),
            completed: 0,
            failure: None,
        })
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Download name of the archive this run builds.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.root)
    }

    pub fn is_done(&self) -> bool {
        self.failure.is_some() || self.completed >= self.files.len()
    }

    /// Convert the next file and report progress.
    ///
    /// Returns `true` while files remain. Progress is only reported for files
    /// that converted successfully.
    pub fn step(&mut self, progress: &mut impl FnMut(u8)) -> bool {
        if self.is_done() {
            return false;
        }
        let Some(file) = self.files.get(self.completed) else {
            return false;
        };

        match convert_file(file, &self.root, &self.options, &mut self.builder) {
            Ok(count) => {
                log::debug!("{} -> {count} csv file(s)", file.relative_path());
                self.completed += 1;
                progress(percent(self.completed, self.files.len()));
            }
            Err(error) => {
                log::debug!("{} failed: {error}", file.relative_path());
                self.failure = Some(RunFailure {
                    error,
                    file: Some(file.relative_path().to_string()),
                });
            }
        }
        !self.is_done()
    }

    /// Leave the Running state. Remaining files are converted first without
    /// progress reporting.
    pub fn finish(mut self) -> RunStatus {
        while self.step(&mut |_: u8| {}) {}

        if let Some(RunFailure { error, file }) = self.failure.take() {
            return failed(&error, file);
        }

        match self.builder.finalize() {
            Ok(archive) => {
                let output = ConversionOutput {
                    file_name: self.archive_name(),
                    files_converted: self.completed,
                    entries: self.builder.paths().map(str::to_string).collect(),
                    archive,
                };
                log::info!(
                    "converted {} file(s) into {} ({} entries, {} bytes)",
                    output.files_converted,
                    output.file_name,
                    output.entries.len(),
                    output.archive.len()
                );
                RunStatus::Success(output)
            }
            Err(error) => failed(&error, None),
        }
    }
}

fn failed(error: &XlcsvError, file: Option<String>) -> RunStatus {
    let message = failure_message(error);
    match &file {
        Some(path) => log::warn!("conversion failed on {path}: {message}"),
        None => log::warn!("conversion failed: {message}"),
    }
    RunStatus::Failed {
        message,
        kind: error.kind(),
        file,
    }
}

/// The error's own description, or [`GENERIC_FAILURE`] when it has none.
fn failure_message(error: &XlcsvError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}

/// `round(100 * completed / total)`, halves rounding up.
fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    let value = (200 * completed + total) / (2 * total);
    u8::try_from(value).unwrap_or(100)
}

/// Decode one workbook and add its CSV entries. Returns the entry count.
fn convert_file(
    file: &SelectedFile,
    root: &str,
    options: &ConvertOptions,
    builder: &mut ArchiveBuilder,
) -> Result<usize> {
    let workbook = parser::parse(file.bytes())?;

    let sheets: Vec<&Sheet> = workbook
        .sheets
        .iter()
        .filter(|sheet| {
            let skip = options.skip_hidden_sheets && sheet.is_hidden();
            if skip {
                log::debug!("skipping hidden sheet {:?}", sheet.name);
            }
            !skip
        })
        .collect();

    let leaf = leaf_of(file.relative_path());
    match sheets.as_slice() {
        [] => {
            log::warn!("{}: every sheet is hidden, nothing written", file.relative_path());
        }
        [sheet] => {
            let path = rewrite(file.relative_path(), root, &single_sheet_leaf(leaf));
            builder.add_entry(path, sheet_to_csv(sheet, &options.csv));
        }
        many => {
            for sheet in many {
                let path = rewrite(file.relative_path(), root, &sheet_leaf(leaf, &sheet.name));
                builder.add_entry(path, sheet_to_csv(sheet, &options.csv));
            }
        }
    }
    Ok(sheets.len())
}

/// Run a whole conversion synchronously.
pub fn convert(
    files: Vec<SelectedFile>,
    root: &str,
    options: ConvertOptions,
    mut on_progress: impl FnMut(u8),
) -> RunStatus {
    let mut run = match ConversionRun::start(files, root, options) {
        Ok(run) => run,
        Err(error) => return RunStatus::ValidationError(failure_message(&error)),
    };
    while run.step(&mut on_progress) {}
    run.finish()
}

/// Run a whole conversion, awaiting `yield_now()` between files so the host
/// event loop can render progress.
pub async fn convert_async<P, Y, F>(
    files: Vec<SelectedFile>,
    root: &str,
    options: ConvertOptions,
    mut on_progress: P,
    mut yield_now: Y,
) -> RunStatus
where
    P: FnMut(u8),
    Y: FnMut() -> F,
    F: Future<Output = ()>,
{
    let mut run = match ConversionRun::start(files, root, options) {
        Ok(run) => run,
        Err(error) => return RunStatus::ValidationError(failure_message(&error)),
    };
    while run.step(&mut on_progress) {
        yield_now().await;
    }
    run.finish()
}
