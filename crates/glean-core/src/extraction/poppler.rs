use crate::crop;
use crate::error::GleanError;
use crate::extraction::{images, pdftoppm, pdftotext, tool_available, PdfBackend};
use crate::model::{BBox, PageLayout};
use std::path::Path;

/// Default backend: poppler-utils for text layout and rendering, lopdf for
/// locating images.
///
/// - `pdftotext -bbox-layout` supplies lines and word boxes.
/// - the page tree and content streams (via lopdf) supply page sizes and
///   image placements.
/// - `pdftoppm` renders cropped regions.
pub struct PopplerBackend;

impl PopplerBackend {
    pub fn new() -> Self {
        PopplerBackend
    }

    /// Check if pdftotext and pdftoppm are available on the system.
    pub fn is_available() -> bool {
        tool_available("pdftotext") && tool_available("pdftoppm")
    }
}

impl Default for PopplerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for PopplerBackend {
    fn load_pages(&self, pdf_path: &Path) -> Result<Vec<PageLayout>, GleanError> {
        // The page tree decides the page count; a corrupt file fails here
        // before any external tool runs.
        let geometry = images::scan_file(pdf_path)?;
        let mut text_pages = pdftotext::extract_text_pages(pdf_path)?.into_iter();

        if text_pages.len() != geometry.len() {
            tracing::debug!(
                text_pages = text_pages.len(),
                tree_pages = geometry.len(),
                "page count mismatch between pdftotext and page tree"
            );
        }

        Ok(geometry
            .into_iter()
            .map(|page| {
                let text = text_pages.next().unwrap_or_default();
                PageLayout {
                    width: page.width,
                    height: page.height,
                    lines: text.lines,
                    words: text.words,
                    images: page.images,
                }
            })
            .collect())
    }

    fn render_region(
        &self,
        pdf_path: &Path,
        page_index: usize,
        bbox: &BBox,
        dpi: u32,
        dest: &Path,
    ) -> Result<(), GleanError> {
        let window = crop::pixel_window(bbox, dpi);
        pdftoppm::render_png(pdf_path, page_index + 1, &window, dpi, dest)
    }

    fn backend_name(&self) -> &str {
        "poppler"
    }
}
