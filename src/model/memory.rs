//! A model result held in memory as named point series.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::domain::{ExtractedSeries, ModelValues, validate_times};
use crate::error::{ConfrontError, Result};
use crate::model::{ModelSource, PointRequest};
use crate::obs::CO2_FAMILY;
use crate::units::{ConversionTable, UnitConverter};

/// One named model variable at the site.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVariable {
    pub times: Vec<f64>,
    pub values: ModelValues,
    pub unit: String,
}

impl ModelVariable {
    pub fn new(times: Vec<f64>, values: ModelValues, unit: impl Into<String>) -> Result<Self> {
        validate_times(&times, values.len())?;
        values.validate()?;
        Ok(Self {
            times,
            values,
            unit: unit.into(),
        })
    }
}

/// Point series for a single site, keyed by variable name.
///
/// The site in a request is ignored: the data already belongs to one location.
pub struct InMemoryModel {
    name: String,
    variables: HashMap<String, ModelVariable>,
    converter: Arc<dyn UnitConverter>,
}

impl std::fmt::Debug for InMemoryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryModel")
            .field("name", &self.name)
            .field("variables", &self.variable_names())
            .finish_non_exhaustive()
    }
}

impl InMemoryModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_converter(name, Arc::new(ConversionTable::standard()))
    }

    pub fn with_converter(name: impl Into<String>, converter: Arc<dyn UnitConverter>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
            converter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, variable: impl Into<String>, data: ModelVariable) {
        self.variables.insert(variable.into(), data);
    }

    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ModelSource for InMemoryModel {
    fn extract_point_time_series(&self, request: &PointRequest) -> Result<ExtractedSeries> {
        let (name, data) = request
            .candidates()
            .find_map(|name| self.variables.get(name).map(|d| (name, d)))
            .ok_or_else(|| ConfrontError::MissingVariable {
                requested: request.candidates().map(str::to_string).collect(),
            })?;

        let factor = self
            .converter
            .factor(CO2_FAMILY, &data.unit, &request.output_unit)?;

        let in_window = |i: usize| {
            let t = data.times[i];
            t >= request.start && t <= request.end
        };
        let times: Vec<f64> = (0..data.times.len())
            .filter(|&i| in_window(i))
            .map(|i| data.times[i])
            .collect();
        let values = data.values.select(in_window).scaled(factor);

        debug!(
            "{}: extracted '{name}' ({} of {} samples, [{}] x{factor} -> [{}])",
            self.name,
            times.len(),
            data.times.len(),
            data.unit,
            request.output_unit
        );

        Ok(ExtractedSeries {
            times,
            values,
            unit: request.output_unit.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Site;

    fn request(start: f64, end: f64) -> PointRequest {
        PointRequest {
            variable: "co2".to_string(),
            site: Site { lat: 19.4, lon: -155.6 },
            start,
            end,
            alternates: vec!["co2mass".to_string()],
            output_unit: "1e-6".to_string(),
        }
    }

    #[test]
    fn extraction_restricts_to_window() {
        let mut model = InMemoryModel::new("m");
        model.insert(
            "co2",
            ModelVariable::new(
                vec![0.0, 31.0, 59.0, 90.0],
                ModelValues::Surface(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
                "ppm",
            )
            .unwrap(),
        );
        let out = model.extract_point_time_series(&request(10.0, 60.0)).unwrap();
        assert_eq!(out.times, vec![31.0, 59.0]);
        assert_eq!(out.values, ModelValues::Surface(vec![Some(2.0), Some(3.0)]));
        assert_eq!(out.unit, "1e-6");
    }

    #[test]
    fn falls_back_to_mass_variable_and_converts() {
        let mut model = InMemoryModel::new("m");
        model.insert(
            "co2mass",
            ModelVariable::new(vec![0.0], ModelValues::Surface(vec![Some(6e-4)]), "kg kg-1").unwrap(),
        );
        let out = model.extract_point_time_series(&request(-5.0, 5.0)).unwrap();
        let ModelValues::Surface(v) = out.values else {
            panic!("expected surface values");
        };
        assert!((v[0].unwrap() - 394.88).abs() < 0.1);
    }

    #[test]
    fn missing_variable_lists_candidates() {
        let model = InMemoryModel::new("m");
        let err = model.extract_point_time_series(&request(0.0, 1.0)).unwrap_err();
        assert_eq!(
            err,
            ConfrontError::MissingVariable {
                requested: vec!["co2".to_string(), "co2mass".to_string()]
            }
        );
    }

    #[test]
    fn debug_lists_name_and_variables() {
        let mut model = InMemoryModel::new("esm");
        model.insert(
            "co2mass",
            ModelVariable::new(vec![0.0], ModelValues::Surface(vec![Some(1.0)]), "kg kg-1").unwrap(),
        );
        let text = format!("{model:?}");
        assert!(text.contains("\"esm\""));
        assert!(text.contains("co2mass"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = ModelVariable::new(vec![0.0], ModelValues::Surface(vec![Some(f64::NAN)]), "1e-6").unwrap_err();
        assert!(matches!(err, ConfrontError::InvalidSeries(_)));
    }

    #[test]
    fn unit_without_conversion_is_reported() {
        let mut model = InMemoryModel::new("m");
        model.insert(
            "co2",
            ModelVariable::new(vec![0.0], ModelValues::Surface(vec![Some(1.0)]), "K").unwrap(),
        );
        let err = model.extract_point_time_series(&request(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, ConfrontError::UnknownUnit { .. }));
    }
}
