//! Model point-series CSV loader.
//!
//! Layout: a header row with a `time` column (days since 1850-01-01, 365-day
//! calendar) and one column per variable or per variable layer:
//!
//! ```text
//! time,co2 [1e-6]
//! time,co2mass@0 [kg kg-1],co2mass@1 [kg kg-1],co2mass@2 [kg kg-1]
//! ```
//!
//! `name@k` is layer `k` of `name` (0 = top). Empty or non-numeric cells are
//! masked.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use log::info;

use crate::domain::ModelValues;
use crate::error::AppError;
use crate::model::{InMemoryModel, ModelVariable};

#[derive(Debug, Clone, PartialEq)]
struct ColumnSpec {
    name: String,
    layer: Option<usize>,
    unit: String,
}

/// Load a model CSV into an in-memory model named `name`.
pub fn load_model_csv(path: &Path, name: &str) -> Result<InMemoryModel, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open model CSV '{}': {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read model CSV headers: {e}")))?
        .clone();

    let time_idx = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case("time"))
        .ok_or_else(|| AppError::new(2, "Model CSV is missing the `time` column."))?;

    let columns: Vec<(usize, ColumnSpec)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx)
        .map(|(i, h)| parse_header(h).map(|spec| (i, spec)))
        .collect::<Result<_, _>>()?;
    if columns.is_empty() {
        return Err(AppError::new(2, "Model CSV has no variable columns."));
    }

    let mut times = Vec::new();
    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); columns.len()];
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Model CSV line {line}: {e}")))?;
        let t = record
            .get(time_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|t| t.is_finite())
            .ok_or_else(|| AppError::new(2, format!("Model CSV line {line}: invalid time.")))?;
        times.push(t);
        for (c, (i, _)) in columns.iter().enumerate() {
            let v = record
                .get(*i)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite());
            cells[c].push(v);
        }
    }

    let mut model = InMemoryModel::new(name);
    for (variable, data) in assemble(&columns, cells, &times)? {
        model.insert(variable, data);
    }
    info!(
        "loaded model '{name}' from '{}': {} time steps, variables {:?}",
        path.display(),
        times.len(),
        model.variable_names()
    );
    Ok(model)
}

/// Group columns by variable name into surface or profile variables.
fn assemble(
    columns: &[(usize, ColumnSpec)],
    mut cells: Vec<Vec<Option<f64>>>,
    times: &[f64],
) -> Result<Vec<(String, ModelVariable)>, AppError> {
    let mut grouped: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (c, (_, spec)) in columns.iter().enumerate() {
        grouped.entry(spec.name.as_str()).or_default().push(c);
    }

    let mut out = Vec::with_capacity(grouped.len());
    for (name, mut members) in grouped {
        let unit = columns[members[0]].1.unit.clone();
        if members.iter().any(|&c| columns[c].1.unit != unit) {
            return Err(AppError::new(2, format!("Layers of `{name}` disagree on units.")));
        }

        let layered = members.iter().filter(|&&c| columns[c].1.layer.is_some()).count();
        let values = if layered == 0 && members.len() == 1 {
            ModelValues::Surface(std::mem::take(&mut cells[members[0]]))
        } else if layered == members.len() {
            members.sort_by_key(|&c| columns[c].1.layer);
            let expected: Vec<usize> = (0..members.len()).collect();
            let found: Vec<usize> = members.iter().filter_map(|&c| columns[c].1.layer).collect();
            if found != expected {
                return Err(AppError::new(
                    2,
                    format!("Layers of `{name}` must be numbered 0..{} without gaps.", members.len()),
                ));
            }
            let rows = (0..times.len())
                .map(|t| members.iter().map(|&c| cells[c][t]).collect())
                .collect();
            ModelValues::Profile(rows)
        } else {
            return Err(AppError::new(
                2,
                format!("`{name}` mixes surface and layer columns (or repeats a column)."),
            ));
        };

        let data = ModelVariable::new(times.to_vec(), values, unit)
            .map_err(|e| AppError::new(2, format!("Model variable `{name}`: {e}")))?;
        out.push((name.to_string(), data));
    }
    Ok(out)
}

/// Parse `name [unit]` or `name@layer [unit]`.
fn parse_header(header: &str) -> Result<ColumnSpec, AppError> {
    let header = header.trim();
    let (base, unit) = match header.find('[') {
        Some(open) if header.ends_with(']') => (
            header[..open].trim(),
            header[open + 1..header.len() - 1].trim(),
        ),
        _ => {
            return Err(AppError::new(
                2,
                format!("Model CSV column `{header}` must look like `name [unit]`."),
            ));
        }
    };

    let (name, layer) = match base.split_once('@') {
        Some((name, layer)) => {
            let layer = layer
                .trim()
                .parse::<usize>()
                .map_err(|_| AppError::new(2, format!("Invalid layer index in column `{header}`.")))?;
            (name.trim(), Some(layer))
        }
        None => (base, None),
    };

    if name.is_empty() || unit.is_empty() {
        return Err(AppError::new(2, format!("Model CSV column `{header}` needs a name and a unit.")));
    }

    Ok(ColumnSpec {
        name: name.to_string(),
        layer,
        unit: unit.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::Site;
    use crate::model::{ModelSource, PointRequest};

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn request() -> PointRequest {
        PointRequest {
            variable: "co2".to_string(),
            site: Site { lat: 19.4, lon: -155.6 },
            start: -1e9,
            end: 1e9,
            alternates: vec!["co2mass".to_string()],
            output_unit: "1e-6".to_string(),
        }
    }

    #[test]
    fn header_forms() {
        assert_eq!(
            parse_header("co2 [1e-6]").unwrap(),
            ColumnSpec {
                name: "co2".to_string(),
                layer: None,
                unit: "1e-6".to_string()
            }
        );
        let spec = parse_header(" co2mass@2 [kg kg-1] ").unwrap();
        assert_eq!(spec.layer, Some(2));
        assert_eq!(spec.unit, "kg kg-1");
        assert!(parse_header("co2").is_err());
        assert!(parse_header("co2@x [1]").is_err());
    }

    #[test]
    fn loads_surface_variable_with_masked_cells() {
        let file = write_file("time,co2 [ppm]\n15.5,350.1\n45,\n74.5,NaN\n");
        let model = load_model_csv(file.path(), "m").unwrap();
        let out = model.extract_point_time_series(&request()).unwrap();
        assert_eq!(out.times, vec![15.5, 45.0, 74.5]);
        assert_eq!(out.values, ModelValues::Surface(vec![Some(350.1), None, None]));
    }

    #[test]
    fn loads_profile_in_layer_order() {
        let file = write_file(concat!(
            "time,co2@1 [1e-6],co2@0 [1e-6],co2@2 [1e-6]\n",
            "15.5,351,,352\n",
        ));
        let model = load_model_csv(file.path(), "m").unwrap();
        let out = model.extract_point_time_series(&request()).unwrap();
        assert_eq!(
            out.values,
            ModelValues::Profile(vec![vec![None, Some(351.0), Some(352.0)]])
        );
    }

    #[test]
    fn layer_gaps_are_rejected() {
        let file = write_file("time,co2@0 [1e-6],co2@2 [1e-6]\n0,1,2\n");
        assert!(load_model_csv(file.path(), "m").is_err());
    }

    #[test]
    fn missing_time_column_is_rejected() {
        let file = write_file("t,co2 [1e-6]\n0,1\n");
        let err = load_model_csv(file.path(), "m").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
