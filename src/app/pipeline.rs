//! Shared "confrontation pipeline" used by both `run` and `demo`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations -> store -> confrontation -> report
//!
//! The commands can then focus on where the data comes from and how the
//! report is presented.

use std::sync::Arc;

use crate::confront::Confrontation;
use crate::data::generate_demo;
use crate::domain::{ConfrontSettings, DemoConfig, MetricReport, ObservationRecord, RunConfig};
use crate::error::AppError;
use crate::io::{IngestOptions, RowError, load_model_csv, load_observations};
use crate::model::ModelSource;
use crate::obs::ObservationStore;
use crate::units::ConversionTable;

/// All computed outputs of a single confrontation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: MetricReport,
    pub model_name: String,
    pub row_errors: Vec<RowError>,
}

/// Load both files and confront them.
pub fn run_confrontation(config: &RunConfig) -> Result<RunOutput, AppError> {
    let options = IngestOptions {
        header_skip: config.header_skip,
        time_column: config.time_column,
        value_column: config.value_column,
        unit: config.obs_unit.clone(),
        site: config.site,
        nlayers: config.nlayers,
    };
    let ingested = load_observations(&config.obs_path, &options)?;

    let model_name = config
        .model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let model = load_model_csv(&config.model_path, &model_name)?;

    let report = confront_record(ingested.record, &model, &config.settings)?;
    Ok(RunOutput {
        report,
        model_name,
        row_errors: ingested.row_errors,
    })
}

/// Generate synthetic data and confront it.
pub fn run_demo(config: &DemoConfig, settings: &ConfrontSettings) -> Result<RunOutput, AppError> {
    let demo = generate_demo(config)?;
    let report = confront_record(demo.record, &demo.model, settings)?;
    Ok(RunOutput {
        report,
        model_name: demo.model.name().to_string(),
        row_errors: Vec::new(),
    })
}

/// Confront `model` with an observation record.
pub fn confront_record(
    record: ObservationRecord,
    model: &dyn ModelSource,
    settings: &ConfrontSettings,
) -> Result<MetricReport, AppError> {
    let store = ObservationStore::new(record, Arc::new(ConversionTable::standard()));
    let confrontation = Confrontation::new(store, settings.clone());
    Ok(confrontation.confront(model)?)
}
