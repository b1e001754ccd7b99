pub mod images;
pub mod pdftoppm;
pub mod pdftotext;
pub mod poppler;

use crate::error::GleanError;
use crate::model::{BBox, PageLayout};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Trait for PDF extraction backends.
pub trait PdfBackend: Send + Sync {
    /// Lay out every page of the PDF: text lines, words and image placements.
    fn load_pages(&self, pdf_path: &Path) -> Result<Vec<PageLayout>, GleanError>;

    /// Render `bbox` of the 0-indexed page at `dpi` and write it as a PNG to `dest`.
    fn render_region(
        &self,
        pdf_path: &Path,
        page_index: usize,
        bbox: &BBox,
        dpi: u32,
        dest: &Path,
    ) -> Result<(), GleanError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Run a poppler command-line tool and return its stdout.
///
/// stderr is kept out of the process's own stderr: it is reported in the
/// error when the tool fails and only logged at debug level otherwise.
pub(crate) fn run_tool(tool: &'static str, args: &[OsString]) -> Result<Vec<u8>, GleanError> {
    let output = Command::new(tool).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GleanError::ToolNotFound { tool }
        } else {
            GleanError::Extraction(format!("{tool} failed: {e}"))
        }
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if !output.status.success() {
        return Err(GleanError::ToolFailed {
            tool,
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.to_string(),
        });
    }

    if !stderr.is_empty() {
        tracing::debug!(tool, stderr, "tool reported warnings");
    }

    Ok(output.stdout)
}

/// Check if a poppler tool answers `-v`.
pub(crate) fn tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-v")
        .output()
        .map(|o| o.status.success() || !o.stderr.is_empty())
        .unwrap_or(false)
}
