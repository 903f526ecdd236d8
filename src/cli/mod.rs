//! Command-line parsing for the CO2 confrontation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "confront", version, about = "Confront model CO2 with the Mauna Loa record")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare a model CSV against the observation file and print the metrics.
    Run(RunArgs),
    /// Run the confrontation on synthetic observation and model data.
    Demo(DemoArgs),
}

/// Options shared by every confrontation run.
#[derive(Debug, Parser, Clone)]
pub struct ConfrontArgs {
    /// Number of near-surface layers averaged when the model reports a profile.
    #[arg(long, default_value_t = 3)]
    pub nlayers: usize,

    /// Days of padding around the observation period when requesting model data.
    #[arg(long, default_value_t = 5.0)]
    pub padding: f64,

    /// Maximum distance (days) between paired model and observation times.
    #[arg(long, default_value_t = 15.0)]
    pub tolerance: f64,

    /// Unit both series are compared in.
    #[arg(long, default_value = "1e-6")]
    pub unit: String,

    /// Print the full report as JSON instead of the summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Observation file (Mauna Loa monthly CSV layout).
    #[arg(long, env = "CONFRONT_OBS", value_name = "CSV")]
    pub obs: PathBuf,

    /// Model point-series CSV (`time,co2 [unit]` or layered `co2@k [unit]` columns).
    #[arg(long, env = "CONFRONT_MODEL", value_name = "CSV")]
    pub model: PathBuf,

    /// Lines to skip before the first data row of the observation file.
    #[arg(long, default_value_t = 57)]
    pub header_skip: usize,

    /// Zero-based column holding the fractional year.
    #[arg(long, default_value_t = 3)]
    pub time_column: usize,

    /// Zero-based column holding the CO2 concentration.
    #[arg(long, default_value_t = 4)]
    pub value_column: usize,

    /// Unit of the observation file.
    #[arg(long, default_value = "1e-6")]
    pub obs_unit: String,

    /// Site latitude (degrees north).
    #[arg(long, default_value_t = 19.4, allow_hyphen_values = true)]
    pub lat: f64,

    /// Site longitude (degrees east).
    #[arg(long, default_value_t = -155.6, allow_hyphen_values = true)]
    pub lon: f64,

    #[command(flatten)]
    pub confront: ConfrontArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// First year of synthetic data.
    #[arg(long, default_value_t = 1990)]
    pub start_year: i32,

    /// Number of years of synthetic data.
    #[arg(long, default_value_t = 10)]
    pub years: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Constant model offset (ppm).
    #[arg(long, default_value_t = 1.5, allow_hyphen_values = true)]
    pub bias: f64,

    /// Multiplier on the model's seasonal amplitude.
    #[arg(long, default_value_t = 1.2)]
    pub amplitude_scale: f64,

    /// Noise standard deviation (ppm).
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Model layers (0 = surface series).
    #[arg(long, default_value_t = 0)]
    pub layers: usize,

    /// Leading model layers masked at every time step.
    #[arg(long, default_value_t = 0)]
    pub masked_top_layers: usize,

    #[command(flatten)]
    pub confront: ConfrontArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_match_mauna_loa_layout() {
        let cli = Cli::parse_from(["confront", "run", "--obs", "mlo.csv", "--model", "m.csv"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.header_skip, 57);
        assert_eq!(args.time_column, 3);
        assert_eq!(args.value_column, 4);
        assert_eq!(args.confront.nlayers, 3);
        assert_eq!(args.confront.unit, "1e-6");
        assert!(!args.confront.json);
    }

    #[test]
    fn demo_accepts_negative_bias() {
        let cli = Cli::parse_from(["confront", "demo", "--bias", "-2.5", "--layers", "5", "--json"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.bias, -2.5);
        assert_eq!(args.layers, 5);
        assert!(args.confront.json);
    }
}
