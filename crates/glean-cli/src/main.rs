mod commands;
mod output;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "glean",
    version,
    about = "Extract text lines and images with their coordinates from a PDF report"
)]
struct Cli {
    /// Path to the PDF file to process
    pdf_path: PathBuf,

    /// Report ID; images are written to public/pdf-images/<REPORT_ID>/
    report_id: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Extraction failures are reported inside the JSON document; only a
    // failure to print it ends the process with a non-zero status.
    if let Err(e) = commands::extract::run(cli.pdf_path, &cli.report_id) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
