use std::path::PathBuf;

use crate::crop::CropError;

#[derive(Debug, thiserror::Error)]
pub enum GleanError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    ToolNotFound { tool: &'static str },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("{tool} produced no output at {}", .path.display())]
    MissingOutput { tool: &'static str, path: PathBuf },

    #[error("invalid PDF structure: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("invalid layout XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
