//! File attachment staging.
//!
//! Files can be staged, listed and removed; uploading is not wired to the
//! server and only closes the attachment dialog.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::markdown::escape_html;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub path: Option<PathBuf>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: None,
        }
    }

    /// Stat a file on disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            size: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// Human-readable size: base 1024, at most two decimals, trailing zeros
/// dropped (`1.5 KB`, `2 MB`, `0 Bytes`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent < UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    let mut number = format!("{:.2}", rounded);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", number, UNITS[exponent])
}

/// The attachment dialog.
#[derive(Debug, Clone, Default)]
pub struct FileStaging {
    files: Vec<StagedFile>,
    open: bool,
}

impl FileStaging {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Replace the staged list, as a new pick or drop does.
    pub fn stage(&mut self, files: Vec<StagedFile>) {
        self.open = true;
        self.files = files;
    }

    /// Remove one staged file; out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Close the dialog and drop the staged list.
    pub fn close(&mut self) {
        self.open = false;
        self.files.clear();
    }

    /// Upload is not wired to the server: clears the staged files and
    /// returns how many were dropped.
    pub fn upload(&mut self) -> usize {
        let count = self.files.len();
        info!("Upload not supported; discarding {} staged file(s)", count);
        self.close();
        count
    }

    pub fn render_html(&self) -> String {
        let mut html = String::new();
        for (index, file) in self.files.iter().enumerate() {
            html.push_str(&format!(
                r#"<div class="file-item" data-index="{index}">
    <div class="file-item-info">
        <i class="fas fa-file"></i>
        <div>
            <div class="file-item-name">{name}</div>
            <div class="file-item-size">{size}</div>
        </div>
    </div>
    <button class="btn-icon" data-remove="{index}">
        <i class="fas fa-times"></i>
    </button>
</div>
"#,
                index = index,
                name = escape_html(&file.name),
                size = format_file_size(file.size),
            ));
        }
        html
    }

    pub fn render_text(&self) -> String {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}. {} ({})", i + 1, f.name, format_file_size(f.size)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
