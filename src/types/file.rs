use serde::Serialize;

/// A file picked by the user, addressed by its path inside the chosen folder.
///
/// The first `/`-separated segment of `relative_path` is the name of the
/// folder that was selected.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    relative_path: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    /// Build a record; `\` separators are normalised to `/`.
    pub fn new(relative_path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let relative_path: String = relative_path.into();
        let relative_path = if relative_path.contains('\\') {
            relative_path.replace('\\', "/")
        } else {
            relative_path
        };
        Self {
            relative_path,
            bytes,
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// One CSV destined for the output archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: String,
}
