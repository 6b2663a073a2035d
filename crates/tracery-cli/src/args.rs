//! Command-line argument definitions for the Tracery CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the simulated display surface and logging verbosity.

use clap::Parser;

use tracery::source::DiagramFormat;

/// Command-line arguments for the Tracery diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram file
    #[arg(help = "Path to the input file (.dot, .gv, .mmd, .mermaid)")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Diagram syntax; inferred from the file extension or content if omitted
    #[arg(long)]
    pub format: Option<DiagramFormat>,

    /// Width of the display surface
    #[arg(long, default_value_t = 800.0)]
    pub width: f32,

    /// Height of the display surface
    #[arg(long, default_value_t = 600.0)]
    pub height: f32,

    /// Zoom steps applied after fitting (negative zooms out)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub zoom: i32,

    /// Write the engine's markup instead of the composed surface
    #[arg(long)]
    pub raw: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
