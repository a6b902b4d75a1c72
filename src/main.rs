use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use docalign::cli::output_path;
use docalign::{
    align_with, detect_document_corners_with, AlignConfig, Cli, Command, CornersConfig,
    CORNER_EDGES, SKEW_EDGES,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let (response, outcome) = match &cli.command {
        Command::Align { input, output, .. } => {
            let output = output_path(input, output.as_deref());
            let config = AlignConfig {
                edges: SKEW_EDGES,
                skew: cli.command.skew_config(),
            };

            match align_with(input, &output, &config) {
                Ok(result) => (
                    json!({
                        "success": true,
                        "processed_path": output,
                        "metadata": result,
                    }),
                    Ok(()),
                ),
                Err(err) => (json!({ "success": false, "error": err.to_string() }), Err(err)),
            }
        }
        Command::Corners { input, .. } => {
            let config = CornersConfig {
                edges: CORNER_EDGES,
                corners: cli.command.corner_config(),
            };

            match detect_document_corners_with(input, &config) {
                Ok(corners) => (json!({ "success": true, "corners": corners }), Ok(())),
                Err(err) => (json!({ "success": false, "error": err.to_string() }), Err(err)),
            }
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to serialize result")?
    );

    outcome.context("Processing failed")
}
