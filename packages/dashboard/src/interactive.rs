#![allow(clippy::module_name_repetitions)]

//! Interactive prompt for building the report without memorizing flags.

use std::path::PathBuf;

use crime_dash_cli_utils::MultiProgress;
use dialoguer::{Confirm, Input, Select};

use crate::data::{DataLoader, DataOptions};
use crate::definition;
use crate::paths;
use crate::pipeline;
use crate::report::write_json;

/// Prompts for the two eras to compare and an output path, then builds and
/// writes the report. Repeats on request; datasets are only loaded once.
///
/// # Errors
///
/// Returns an error if a prompt fails, a load fails, or the report cannot
/// be written.
pub async fn run(
    multi: &MultiProgress,
    options: DataOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let def = definition::chicago();
    let mut loader = DataLoader::new(options);

    let labels: Vec<String> = def
        .eras
        .iter()
        .enumerate()
        .map(|(i, era)| format!("{}. {era}", i + 1))
        .collect();

    loop {
        let [default_first, default_second] = def.default_eras;

        let first = Select::new()
            .with_prompt("Era for the first heatmap")
            .items(&labels)
            .default(default_first.saturating_sub(1))
            .interact()?;
        let second = Select::new()
            .with_prompt("Era for the second heatmap")
            .items(&labels)
            .default(default_second.saturating_sub(1))
            .interact()?;

        let output: String = Input::new()
            .with_prompt("Write report to")
            .default(paths::report_path().display().to_string())
            .interact_text()?;

        let eras = [def.era(first + 1)?, def.era(second + 1)?];
        let report = pipeline::full_report(&mut loader, multi, &def, &eras).await?;
        let output = PathBuf::from(output);
        write_json(&report, Some(&output))?;
        println!("Report written to {}", output.display());

        let again = Confirm::new()
            .with_prompt("Compare another pair of eras?")
            .default(false)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}
