use glean_core::error::GleanError;
use glean_core::extraction::poppler::PopplerBackend;
use glean_core::ExtractOptions;
use std::path::PathBuf;

use crate::output;

pub fn run(pdf_path: PathBuf, report_id: &str) -> Result<(), GleanError> {
    let backend = PopplerBackend::new();
    let options = ExtractOptions::default();

    tracing::debug!(
        pdf = %pdf_path.display(),
        report_id,
        output_root = %options.output_root.display(),
        "processing PDF"
    );

    let result = glean_core::process(&pdf_path, report_id, &backend, &options);
    output::json::print(&result)
}
