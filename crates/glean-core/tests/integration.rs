//! Integration tests for the process() end-to-end pipeline.
//!
//! Uses a MockBackend that returns pre-built PageLayouts and writes a small
//! placeholder file instead of rendering, so these tests run without
//! poppler-utils.

use glean_core::error::GleanError;
use glean_core::extraction::PdfBackend;
use glean_core::model::{BBox, ExtractionResult, PageLayout, Word};
use glean_core::{process, ExtractOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct MockBackend {
    pages: Vec<PageLayout>,
    /// Renders of these boxes fail.
    broken: Vec<BBox>,
}

impl MockBackend {
    fn new(pages: Vec<PageLayout>) -> Self {
        MockBackend {
            pages,
            broken: vec![],
        }
    }
}

impl PdfBackend for MockBackend {
    fn load_pages(&self, _pdf_path: &Path) -> Result<Vec<PageLayout>, GleanError> {
        Ok(self.pages.clone())
    }

    fn render_region(
        &self,
        _pdf_path: &Path,
        page_index: usize,
        bbox: &BBox,
        dpi: u32,
        dest: &Path,
    ) -> Result<(), GleanError> {
        if self.broken.contains(bbox) {
            return Err(GleanError::ToolFailed {
                tool: "pdftoppm",
                code: 99,
                stderr: "render failed".into(),
            });
        }
        std::fs::write(dest, format!("page={page_index} dpi={dpi} bbox={bbox}"))?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct BrokenPdfBackend;

impl PdfBackend for BrokenPdfBackend {
    fn load_pages(&self, _pdf_path: &Path) -> Result<Vec<PageLayout>, GleanError> {
        Err(GleanError::Extraction("startxref not found".into()))
    }

    fn render_region(
        &self,
        _pdf_path: &Path,
        _page_index: usize,
        _bbox: &BBox,
        _dpi: u32,
        _dest: &Path,
    ) -> Result<(), GleanError> {
        unreachable!("no pages to render")
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

/// A scratch workspace: a dummy PDF file and an output root, both temporary.
struct Workspace {
    _dir: TempDir,
    pdf: PathBuf,
    options: ExtractOptions,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n%%EOF\n").unwrap();
        let options = ExtractOptions {
            output_root: dir.path().join("public").join("pdf-images"),
            ..ExtractOptions::default()
        };
        Workspace {
            _dir: dir,
            pdf,
            options,
        }
    }

    fn image_dir(&self, report_id: &str) -> PathBuf {
        self.options.output_root.join(report_id)
    }

    fn run(&self, backend: &dyn PdfBackend, report_id: &str) -> ExtractionResult {
        process(&self.pdf, report_id, backend, &self.options)
    }
}

fn word(text: &str, x0: f64, top: f64, x1: f64, bottom: f64) -> Word {
    Word {
        text: text.to_string(),
        bbox: BBox::new(x0, top, x1, bottom),
    }
}

fn page(lines: &[&str], words: Vec<Word>, images: Vec<BBox>) -> PageLayout {
    PageLayout {
        width: 612.0,
        height: 792.0,
        lines: lines.iter().map(|s| s.to_string()).collect(),
        words,
        images,
    }
}

// ---------------------------------------------------------------------------
// Missing input
// ---------------------------------------------------------------------------
#[test]
fn missing_pdf_is_reported_without_creating_output() {
    let ws = Workspace::new();
    let missing = ws.pdf.with_file_name("nope.pdf");
    let backend = MockBackend::new(vec![]);

    let result = process(&missing, "r1", &backend, &ws.options);

    assert_eq!(
        result,
        ExtractionResult::failure(format!("File not found: {}", missing.display()))
    );
    assert!(!ws.options.output_root.exists());
}

// ---------------------------------------------------------------------------
// Text lines
// ---------------------------------------------------------------------------
#[test]
fn hello_world_line_spans_both_words() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![page(
        &["Hello World"],
        vec![
            word("Hello", 72.04, 100.26, 98.5, 112.0),
            word("World", 101.0, 100.3, 130.96, 112.44),
        ],
        vec![],
    )]);

    let result = ws.run(&backend, "r1");

    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data.texts.len(), 1);
    assert_eq!(data.texts[0].text, "Hello World");
    assert_eq!(data.texts[0].page, 0);
    assert_eq!(data.texts[0].bbox, BBox::new(72.0, 100.3, 131.0, 112.4));
}

#[test]
fn text_only_pdf_writes_no_images() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![
        page(&["First page"], vec![word("First", 10.0, 10.0, 40.0, 20.0)], vec![]),
        page(&["Second page"], vec![word("Second", 10.0, 10.0, 50.0, 20.0)], vec![]),
        page(&[], vec![], vec![]),
    ]);

    let result = ws.run(&backend, "r1");

    let data = result.data.unwrap();
    assert!(data.images.is_empty());
    assert_eq!(data.texts.len(), 2);
    assert_eq!(data.texts[1].page, 1);
    // The report directory exists but holds nothing.
    let entries = std::fs::read_dir(ws.image_dir("r1")).unwrap().count();
    assert_eq!(entries, 0);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------
#[test]
fn single_image_is_saved_and_referenced() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![page(
        &[],
        vec![],
        vec![BBox::new(72.04, 92.0, 272.0, 191.96)],
    )]);

    let result = ws.run(&backend, "report-42");

    let data = result.data.unwrap();
    assert_eq!(data.images.len(), 1);
    let image = &data.images[0];
    assert_eq!(image.page, 0);
    assert_eq!(image.src, "/pdf-images/report-42/page1_img1.png");
    assert_eq!(image.bbox, BBox::new(72.0, 92.0, 272.0, 192.0));

    let saved = ws.image_dir("report-42").join("page1_img1.png");
    let content = std::fs::read_to_string(saved).unwrap();
    // Rendered at 150 dpi from the rounded box.
    assert_eq!(content, "page=0 dpi=150 bbox=(72, 92, 272, 192)");
}

#[test]
fn inverted_image_is_skipped_and_the_rest_kept() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![page(
        &["Figure 1"],
        vec![word("Figure", 10.0, 10.0, 40.0, 20.0), word("1", 42.0, 10.0, 46.0, 20.0)],
        vec![
            BBox::new(300.0, 100.0, 200.0, 200.0),
            BBox::new(100.0, 100.0, 200.0, 200.0),
        ],
    )]);

    let result = ws.run(&backend, "r1");

    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data.texts.len(), 1);
    assert_eq!(data.images.len(), 1);
    // Numbering follows the page's image order, gaps included.
    assert_eq!(data.images[0].src, "/pdf-images/r1/page1_img2.png");
    assert!(!ws.image_dir("r1").join("page1_img1.png").exists());
}

#[test]
fn images_outside_the_page_or_failing_to_render_are_skipped() {
    let ws = Workspace::new();
    let broken = BBox::new(10.0, 10.0, 20.0, 20.0);
    let backend = MockBackend {
        pages: vec![page(
            &[],
            vec![],
            vec![
                BBox::new(600.0, 700.0, 650.0, 800.0),
                broken,
                BBox::new(0.0, 0.0, 0.0, 50.0),
                BBox::new(30.0, 30.0, 60.0, 60.0),
            ],
        )],
        broken: vec![broken],
    };

    let result = ws.run(&backend, "r1");

    let data = result.data.unwrap();
    let srcs: Vec<&str> = data.images.iter().map(|i| i.src.as_str()).collect();
    assert_eq!(srcs, vec!["/pdf-images/r1/page1_img4.png"]);
}

#[test]
fn results_keep_page_then_encounter_order() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![
        page(
            &["Alpha", "Beta"],
            vec![word("Alpha", 10.0, 10.0, 40.0, 20.0), word("Beta", 10.0, 30.0, 40.0, 40.0)],
            vec![BBox::new(10.0, 100.0, 50.0, 150.0)],
        ),
        page(
            &["Gamma"],
            vec![word("Gamma", 10.0, 10.0, 40.0, 20.0)],
            vec![
                BBox::new(10.0, 100.0, 50.0, 150.0),
                BBox::new(10.0, 200.0, 50.0, 250.0),
            ],
        ),
    ]);

    let data = ws.run(&backend, "r1").data.unwrap();

    let texts: Vec<(&str, usize)> = data.texts.iter().map(|t| (t.text.as_str(), t.page)).collect();
    assert_eq!(texts, vec![("Alpha", 0), ("Beta", 0), ("Gamma", 1)]);
    let images: Vec<(&str, usize)> = data.images.iter().map(|i| (i.src.as_str(), i.page)).collect();
    assert_eq!(
        images,
        vec![
            ("/pdf-images/r1/page1_img1.png", 0),
            ("/pdf-images/r1/page2_img1.png", 1),
            ("/pdf-images/r1/page2_img2.png", 1),
        ]
    );
}

#[test]
fn rerun_with_same_report_id_overwrites_images() {
    let ws = Workspace::new();
    let first = MockBackend::new(vec![page(&[], vec![], vec![BBox::new(10.0, 10.0, 20.0, 20.0)])]);
    let second = MockBackend::new(vec![page(&[], vec![], vec![BBox::new(30.0, 30.0, 40.0, 40.0)])]);

    assert!(ws.run(&first, "same").success);
    let result = ws.run(&second, "same");

    assert!(result.success);
    let saved = ws.image_dir("same").join("page1_img1.png");
    let content = std::fs::read_to_string(saved).unwrap();
    assert!(content.ends_with("bbox=(30, 30, 40, 40)"));
}

// ---------------------------------------------------------------------------
// Whole-document failure
// ---------------------------------------------------------------------------
#[test]
fn unreadable_pdf_collapses_to_error_with_basename() {
    let ws = Workspace::new();

    let result = ws.run(&BrokenPdfBackend, "r1");

    assert_eq!(
        result,
        ExtractionResult::failure(
            "Error processing PDF 'report.pdf': PDF extraction failed: startxref not found"
        )
    );
    assert!(result.data.is_none());
}

#[test]
fn result_document_shape_matches_callers() {
    let ws = Workspace::new();
    let backend = MockBackend::new(vec![page(
        &["Hello"],
        vec![word("Hello", 1.0, 2.0, 3.0, 4.0)],
        vec![],
    )]);

    let json = serde_json::to_value(ws.run(&backend, "r1")).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "success": true,
            "data": {
                "texts": [{
                    "text": "Hello",
                    "page": 0,
                    "bbox": {"x0": 1.0, "top": 2.0, "x1": 3.0, "bottom": 4.0}
                }],
                "images": []
            }
        })
    );
}
