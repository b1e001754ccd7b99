use glean_core::error::GleanError;
use glean_core::model::ExtractionResult;

pub fn print(result: &ExtractionResult) -> Result<(), GleanError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
