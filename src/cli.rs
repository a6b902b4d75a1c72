use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::corners::{CornerConfig, CORNER_DETECTION};
use crate::detection::{SkewConfig, SKEW_DETECTION};

#[derive(Parser, Debug)]
#[command(name = "docalign")]
#[command(version, about = "Deskew scanned documents and locate their corners")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show detection details
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate the skew angle and write a rotated copy of the image
    Align {
        /// Input image path
        input: PathBuf,

        /// Output path [default: aligned_<input file name>]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum Hough votes for a line to count
        #[arg(long, default_value_t = SKEW_DETECTION.vote_threshold)]
        vote_threshold: u32,

        /// Number of strongest lines used for the estimate
        #[arg(long, default_value_t = SKEW_DETECTION.max_candidates)]
        max_lines: usize,
    },

    /// Find the four corners of the document outline
    Corners {
        /// Input image path
        input: PathBuf,

        /// Number of largest contours to test
        #[arg(long, default_value_t = CORNER_DETECTION.max_contours)]
        max_contours: usize,

        /// Simplification tolerance as a fraction of the contour perimeter
        #[arg(long, default_value_t = CORNER_DETECTION.epsilon_fraction, value_parser = parse_fraction)]
        epsilon: f64,
    },
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

impl Command {
    pub fn skew_config(&self) -> SkewConfig {
        match self {
            Command::Align {
                vote_threshold,
                max_lines,
                ..
            } => SkewConfig {
                vote_threshold: *vote_threshold,
                max_candidates: *max_lines,
                ..SKEW_DETECTION
            },
            Command::Corners { .. } => SKEW_DETECTION,
        }
    }

    pub fn corner_config(&self) -> CornerConfig {
        match self {
            Command::Corners {
                max_contours,
                epsilon,
                ..
            } => CornerConfig {
                max_contours: *max_contours,
                epsilon_fraction: *epsilon,
            },
            Command::Align { .. } => CORNER_DETECTION,
        }
    }
}

/// `aligned_<name>` next to the input, unless an output was given.
pub fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    output.map(Path::to_path_buf).unwrap_or_else(|| {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        let parent = input.parent().unwrap_or(Path::new("."));
        parent.join(format!("aligned_{}", name))
    })
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid tolerance value: {}", s))?;

    if !(value > 0.0 && value < 1.0) {
        return Err("Tolerance must be between 0 and 1".to_string());
    }

    Ok(value)
}
