//! JavaScript-facing conversion API.

use js_sys::{Function, Promise, Uint8Array};
use log::LevelFilter;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::convert::{convert_async, RunStatus, GENERIC_FAILURE};
use crate::discovery::is_spreadsheet_path;
use crate::options::ConvertOptions;
use crate::types::SelectedFile;

/// Collects the files of a selected folder and converts them to a ZIP of CSVs.
///
/// ```javascript
/// const converter = new Converter();
/// for (const file of input.files) {
///   converter.add_file(file.webkitRelativePath, new Uint8Array(await file.arrayBuffer()));
/// }
/// const zip = await converter.run("Export", (pct) => bar.value = pct);
/// download_archive(zip, "Export.zip");
/// ```
#[wasm_bindgen]
pub struct Converter {
    files: Vec<SelectedFile>,
    options: ConvertOptions,
}

#[wasm_bindgen]
impl Converter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Converter {
        crate::logging::init(LevelFilter::Info);
        Converter {
            files: Vec::new(),
            options: ConvertOptions::default(),
        }
    }

    /// Queue a file. Returns `false` (and drops the file) when it is not a
    /// spreadsheet.
    pub fn add_file(&mut self, relative_path: String, bytes: Vec<u8>) -> bool {
        let file = SelectedFile::new(relative_path, bytes);
        if !is_spreadsheet_path(file.relative_path()) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Drop every queued file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Replace the run options with a plain object such as
    /// `{ csv: { delimiter: ";" }, skipHiddenSheets: true }`.
    ///
    /// # Errors
    /// Rejects objects that do not deserialize or name an unusable delimiter.
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: ConvertOptions = if options.is_undefined() || options.is_null() {
            ConvertOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid options: {e}")))?
        };
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Convert the queued files. Resolves to the ZIP bytes, or rejects with a
    /// message. The queue is consumed either way.
    ///
    /// `on_progress` is called with a whole percentage after each file.
    pub fn run(&mut self, root_name: String, on_progress: Option<Function>) -> Promise {
        let files = std::mem::take(&mut self.files);
        let options = self.options.clone();

        future_to_promise(async move {
            let report = |pct: u8| {
                if let Some(callback) = &on_progress {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(pct)) {
                        log::warn!("progress callback threw: {e:?}");
                    }
                }
            };

            match convert_async(files, &root_name, options, report, yield_to_event_loop).await {
                RunStatus::Success(output) => Ok(Uint8Array::from(output.archive.as_slice()).into()),
                status => Err(JsValue::from_str(
                    status.error_message().unwrap_or(GENERIC_FAILURE),
                )),
            }
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on the next macrotask so the page can repaint between files.
async fn yield_to_event_loop() {
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().is_some_and(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
                .is_ok()
        });
        if !scheduled {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
