//! Reference dataset ingest.
//!
//! The Mauna Loa monthly record is a comma-separated file with a free-form
//! preamble of `header_skip` lines, then one row per month. We need two
//! columns: the fractional year and the measured concentration.
//!
//! - negative concentrations mark missing months and become masked samples
//! - unparsable rows are skipped and reported, not fatal
//! - times must come out non-decreasing

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::StringRecord;
use log::{debug, info, warn};

use crate::domain::{ObservationRecord, Site, TimeSeries};
use crate::error::AppError;
use crate::math::calendar::from_fractional_year;

/// Layout of the reference file and the metadata it does not carry.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub header_skip: usize,
    /// Zero-based column holding the fractional year.
    pub time_column: usize,
    /// Zero-based column holding the concentration.
    pub value_column: usize,
    pub unit: String,
    pub site: Site,
    pub nlayers: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            header_skip: 57,
            time_column: 3,
            value_column: 4,
            unit: "1e-6".to_string(),
            site: Site { lat: 19.4, lon: -155.6 },
            nlayers: 3,
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the record plus what happened to each row.
#[derive(Debug, Clone)]
pub struct IngestedObservations {
    pub record: ObservationRecord,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub masked: usize,
}

/// Load the reference dataset from `path`.
pub fn load_observations(path: &Path, options: &IngestOptions) -> Result<IngestedObservations, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open observation file '{}': {e}", path.display()),
        )
    })?;
    let mut reader = BufReader::new(file);

    let mut skipped = String::new();
    for _ in 0..options.header_skip {
        skipped.clear();
        let n = reader
            .read_line(&mut skipped)
            .map_err(|e| AppError::new(2, format!("Failed to read observation header: {e}")))?;
        if n == 0 {
            break;
        }
    }

    // Blank lines are dropped before parsing; `line_numbers[i]` is the file
    // line of data row `i`.
    let mut data = String::new();
    let mut line_numbers = Vec::new();
    for (idx, text) in reader.lines().enumerate() {
        let text = text.map_err(|e| AppError::new(2, format!("Failed to read observation file: {e}")))?;
        if text.trim().is_empty() {
            continue;
        }
        line_numbers.push(options.header_skip + idx + 1);
        data.push_str(&text);
        data.push('\n');
    }

    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let ingested = parse_records(csv_reader, &line_numbers, options)?;
    info!(
        "loaded {} observations from '{}' ({} masked, {} rows rejected)",
        ingested.record.series.len(),
        path.display(),
        ingested.masked,
        ingested.row_errors.len()
    );
    Ok(ingested)
}

fn parse_records<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    line_numbers: &[usize],
    options: &IngestOptions,
) -> Result<IngestedObservations, AppError> {
    let mut times = Vec::new();
    let mut values = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = line_numbers.get(idx).copied().unwrap_or(options.header_skip + idx + 1);
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, options) {
            Ok((t, v)) => {
                times.push(t);
                values.push(v);
            }
            Err(message) => {
                debug!("line {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!("{} observation row(s) could not be parsed", row_errors.len());
    }
    if times.is_empty() {
        return Err(AppError::new(3, "No valid observation rows remain after parsing."));
    }

    let masked = values.iter().filter(|v| v.is_none()).count();
    let series = TimeSeries::new(times, values)
        .map_err(|e| AppError::new(2, format!("Observation file is not in time order: {e}")))?;

    Ok(IngestedObservations {
        record: ObservationRecord {
            series,
            unit: options.unit.clone(),
            site: options.site,
            nlayers: options.nlayers,
        },
        row_errors,
        rows_read,
        masked,
    })
}

fn parse_row(record: &StringRecord, options: &IngestOptions) -> Result<(f64, Option<f64>), String> {
    let year = parse_column(record, options.time_column, "fractional year")?;
    let value = parse_column(record, options.value_column, "concentration")?;
    let t = from_fractional_year(year);
    Ok((t, (value >= 0.0).then_some(value)))
}

fn parse_column(record: &StringRecord, idx: usize, what: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing {what} (column {idx})."))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid {what} '{raw}' (column {idx})."))?;
    if v.is_finite() { Ok(v) } else { Err(format!("Non-finite {what} (column {idx}).")) }
}
