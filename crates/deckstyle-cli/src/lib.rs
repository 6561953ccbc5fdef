//! CLI logic for the deckstyle tool.
//!
//! Reads an action file and an SVG sheet, applies the actions and writes the
//! edited sheet. Nothing is written when any step fails.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use deckstyle::{DeckstyleError, StyleConverter};

/// Run the deckstyle CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `DeckstyleError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Action file errors
/// - Document parsing and editing errors
pub fn run(args: &Args) -> Result<(), DeckstyleError> {
    info!(
        actions_path = args.actions,
        input_path = args.input,
        output_path = args.output;
        "Processing sheet"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let actions = fs::read_to_string(&args.actions)?;
    let svg = fs::read_to_string(&args.input)?;

    let converter = StyleConverter::new(app_config);
    let plan = converter.parse_actions(&actions)?;
    let (output, report) = converter.convert_with_report(&plan, &svg)?;

    fs::write(&args.output, output)?;

    info!(
        output_file = args.output,
        applied = report.applied(),
        skipped = report.skipped();
        "SVG written successfully"
    );

    Ok(())
}
