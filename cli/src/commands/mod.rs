pub mod auth;
pub mod cli;
pub mod directory;
pub mod portal;
pub mod tasks;
pub mod workorders;

use serde::Serialize;
use workshop_core::api::CliError;

use cli::OutputFormat;

/// Prints `value` as pretty JSON, or `text()` otherwise.
pub(crate) fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(value)
                .map_err(|e| CliError::Command(format!("failed to encode output: {e}")))?;
            println!("{out}");
        }
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}
