pub mod crop;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod model;

use error::GleanError;
use extraction::PdfBackend;
use model::{BBox, ExtractedData, ExtractionResult, ImageRef, PageLayout};
use std::path::{Path, PathBuf};

/// Where images go and how they are addressed.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory that holds one sub-directory per report.
    pub output_root: PathBuf,
    /// URL path under which `output_root` is served.
    pub url_prefix: String,
    /// Rasterization density for cropped images, in dots per inch.
    pub resolution: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            output_root: PathBuf::from("public/pdf-images"),
            url_prefix: "/pdf-images".into(),
            resolution: 150,
        }
    }
}

impl ExtractOptions {
    /// Absolute directory for the images of `report_id`.
    pub fn image_dir(&self, report_id: &str) -> Result<PathBuf, GleanError> {
        Ok(std::path::absolute(self.output_root.join(report_id))?)
    }

    /// Public URL path of an image file of `report_id`.
    pub fn image_src(&self, report_id: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url_prefix.trim_end_matches('/'),
            report_id,
            file_name
        )
    }
}

/// File name of the `image_index`-th image on the `page_index`-th page
/// (both 0-indexed; the name is 1-indexed).
pub fn image_file_name(page_index: usize, image_index: usize) -> String {
    format!("page{}_img{}.png", page_index + 1, image_index + 1)
}

/// Main API entry point: extract a PDF into the printable result document.
///
/// Never fails; every error is folded into `{success: false, error}`.
pub fn process(
    pdf_path: &Path,
    report_id: &str,
    backend: &dyn PdfBackend,
    options: &ExtractOptions,
) -> ExtractionResult {
    match extract(pdf_path, report_id, backend, options) {
        Ok(data) => ExtractionResult::ok(data),
        Err(e @ GleanError::FileNotFound(_)) => ExtractionResult::failure(e.to_string()),
        Err(e) => {
            let name = pdf_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::debug!(error = %e, backend = backend.backend_name(), "PDF processing failed");
            ExtractionResult::failure(format!("Error processing PDF '{name}': {e}"))
        }
    }
}

/// Extract text lines and images, saving each image as a PNG.
///
/// A failure on a single image only drops that image. Any other failure
/// aborts the whole document and discards what was gathered so far.
pub fn extract(
    pdf_path: &Path,
    report_id: &str,
    backend: &dyn PdfBackend,
    options: &ExtractOptions,
) -> Result<ExtractedData, GleanError> {
    if !pdf_path.exists() {
        return Err(GleanError::FileNotFound(pdf_path.to_path_buf()));
    }

    let image_dir = options.image_dir(report_id)?;
    std::fs::create_dir_all(&image_dir)?;

    let pages = backend.load_pages(pdf_path)?;

    let mut data = ExtractedData::default();
    for (page_index, page) in pages.iter().enumerate() {
        data.texts.extend(layout::page_text_lines(page_index, page));

        for (image_index, placement) in page.images.iter().enumerate() {
            let bbox = placement.rounded();
            let file_name = image_file_name(page_index, image_index);
            let dest = image_dir.join(&file_name);

            match save_image(backend, pdf_path, page_index, page, &bbox, options, &dest) {
                Ok(()) => data.images.push(ImageRef {
                    src: options.image_src(report_id, &file_name),
                    page: page_index,
                    bbox,
                }),
                Err(e) => {
                    tracing::debug!(
                        page = page_index + 1,
                        image = image_index + 1,
                        error = %e,
                        "skipping image"
                    );
                }
            }
        }
    }

    tracing::info!(
        pages = pages.len(),
        texts = data.texts.len(),
        images = data.images.len(),
        "extracted PDF"
    );

    Ok(data)
}

fn save_image(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    page_index: usize,
    page: &PageLayout,
    bbox: &BBox,
    options: &ExtractOptions,
    dest: &Path,
) -> Result<(), GleanError> {
    crop::validate(bbox, &page.bbox())?;
    backend.render_region(pdf_path, page_index, bbox, options.resolution, dest)
}
