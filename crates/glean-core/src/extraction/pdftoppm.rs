use crate::crop::PixelWindow;
use crate::error::GleanError;
use crate::extraction::run_tool;
use std::path::Path;

/// Render one pixel window of a page to `dest` as PNG using `pdftoppm`.
///
/// The image is rendered into a scratch directory next to `dest` and renamed
/// into place, so an existing file of the same name is replaced whole.
pub fn render_png(
    pdf_path: &Path,
    page_number: usize,
    window: &PixelWindow,
    dpi: u32,
    dest: &Path,
) -> Result<(), GleanError> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let scratch = tempfile::Builder::new()
        .prefix(".render-")
        .tempdir_in(dir)?;
    let prefix = scratch.path().join("crop");
    let page = page_number.to_string();

    run_tool(
        "pdftoppm",
        &[
            "-f".into(),
            page.as_str().into(),
            "-l".into(),
            page.as_str().into(),
            "-r".into(),
            dpi.to_string().into(),
            "-x".into(),
            window.x.to_string().into(),
            "-y".into(),
            window.y.to_string().into(),
            "-W".into(),
            window.width.to_string().into(),
            "-H".into(),
            window.height.to_string().into(),
            "-png".into(),
            "-singlefile".into(),
            pdf_path.into(),
            prefix.as_path().into(),
        ],
    )?;

    let rendered = prefix.with_extension("png");
    if !rendered.is_file() {
        return Err(GleanError::MissingOutput {
            tool: "pdftoppm",
            path: rendered,
        });
    }
    std::fs::rename(&rendered, dest)?;
    Ok(())
}
