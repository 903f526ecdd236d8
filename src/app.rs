//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs the confrontation on files or synthetic data
//! - prints the summary or the JSON report

use clap::Parser;
use log::{info, warn};

use crate::cli::{Command, ConfrontArgs, DemoArgs, RunArgs};
use crate::domain::{ConfrontSettings, DemoConfig, RunConfig, Site};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `confront` binary.
pub fn run() -> Result<(), AppError> {
    // `CONFRONT_OBS` / `CONFRONT_MODEL` and `RUST_LOG` may come from `.env`.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let out = pipeline::run_confrontation(&config)?;

    for err in &out.row_errors {
        warn!("observation line {}: {}", err.line, err.message);
    }
    print_output(&out, &config.settings, config.json)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = demo_config_from_args(&args);
    let settings = settings_from_args(&args.confront);
    info!(
        "demo: {} years from {}, seed {}, bias {}",
        config.years, config.start_year, config.seed, config.bias
    );
    let out = pipeline::run_demo(&config, &settings)?;
    print_output(&out, &settings, config.json)
}

fn print_output(
    out: &pipeline::RunOutput,
    settings: &ConfrontSettings,
    json: bool,
) -> Result<(), AppError> {
    if json {
        println!("{}", crate::report::report_json(&out.report)?);
    } else {
        println!(
            "{}",
            crate::report::format_report_summary(&out.report, &settings.name, &out.model_name)
        );
    }
    Ok(())
}

pub fn settings_from_args(args: &ConfrontArgs) -> ConfrontSettings {
    ConfrontSettings {
        output_unit: args.unit.clone(),
        padding_days: args.padding,
        alignment_tolerance: args.tolerance,
        ..ConfrontSettings::default()
    }
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        obs_path: args.obs.clone(),
        model_path: args.model.clone(),
        header_skip: args.header_skip,
        time_column: args.time_column,
        value_column: args.value_column,
        obs_unit: args.obs_unit.clone(),
        site: Site {
            lat: args.lat,
            lon: args.lon,
        },
        nlayers: args.confront.nlayers,
        settings: settings_from_args(&args.confront),
        json: args.confront.json,
    }
}

pub fn demo_config_from_args(args: &DemoArgs) -> DemoConfig {
    DemoConfig {
        start_year: args.start_year,
        years: args.years,
        seed: args.seed,
        bias: args.bias,
        amplitude_scale: args.amplitude_scale,
        noise: args.noise,
        layers: args.layers,
        masked_top_layers: args.masked_top_layers,
        nlayers: args.confront.nlayers,
        json: args.confront.json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn run_args_map_onto_config() {
        let cli = Cli::parse_from([
            "confront", "run", "--obs", "o.csv", "--model", "m.csv", "--lat", "-10.5", "--tolerance", "20",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = run_config_from_args(&args);
        assert_eq!(config.site.lat, -10.5);
        assert_eq!(config.site.lon, -155.6);
        assert_eq!(config.settings.alignment_tolerance, 20.0);
        assert_eq!(config.settings.variable, "co2");
        assert_eq!(config.settings.alternates, vec!["co2mass".to_string()]);
    }

    #[test]
    fn demo_args_carry_layer_settings() {
        let cli = Cli::parse_from(["confront", "demo", "--layers", "6", "--nlayers", "2"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let config = demo_config_from_args(&args);
        assert_eq!(config.layers, 6);
        assert_eq!(config.nlayers, 2);
    }
}
