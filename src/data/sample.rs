//! Synthetic observation / model pairs for demos and tests.
//!
//! Observations follow a Keeling-like curve:
//!
//! `co2(t) = base + trend·years + amp·sin(2π·doy/365) + ε`, `ε ~ N(0, noise)`
//!
//! The model sees the same signal with a constant bias, a rescaled seasonal
//! amplitude and its own noise, optionally spread over vertical layers.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DemoConfig, ModelValues, ObservationRecord, Site, TimeSeries};
use crate::error::AppError;
use crate::math::calendar::{DAYS_PER_MONTH, DAYS_PER_YEAR, day_of_year, month_start};
use crate::model::{InMemoryModel, ModelVariable};

const BASE_PPM: f64 = 315.0;
const TREND_PPM_PER_YEAR: f64 = 1.6;
const SEASONAL_AMPLITUDE_PPM: f64 = 3.0;
/// Fraction of observed months dropped as missing.
const MISSING_FRACTION: f64 = 0.02;
/// Concentration change between adjacent model layers.
const LAYER_STEP_PPM: f64 = 0.4;

pub struct DemoData {
    pub record: ObservationRecord,
    pub model: InMemoryModel,
}

impl std::fmt::Debug for DemoData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoData")
            .field("record", &self.record)
            .field("model", &self.model.name())
            .finish()
    }
}

/// Mid-month sample times for `years` years starting at `start_year`.
pub fn monthly_times(start_year: i32, years: usize) -> Vec<f64> {
    (0..years)
        .flat_map(|y| {
            (0..12).map(move |m| month_start(start_year + y as i32, m) + DAYS_PER_MONTH[m] / 2.0)
        })
        .collect()
}

/// Noise-free signal at `t`, with `t0` the first sample time.
pub fn keeling_signal(t: f64, t0: f64, amplitude: f64) -> f64 {
    let years = (t - t0) / DAYS_PER_YEAR;
    let phase = 2.0 * std::f64::consts::PI * day_of_year(t) / DAYS_PER_YEAR;
    BASE_PPM + TREND_PPM_PER_YEAR * years + amplitude * phase.sin()
}

pub fn generate_demo(config: &DemoConfig) -> Result<DemoData, AppError> {
    if config.years == 0 {
        return Err(AppError::new(2, "Demo needs at least one year of data."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be finite and >= 0."));
    }
    if !(config.bias.is_finite() && config.amplitude_scale.is_finite()) {
        return Err(AppError::new(2, "Bias and amplitude scale must be finite."));
    }
    if config.layers > 0 && config.masked_top_layers >= config.layers {
        return Err(AppError::new(
            2,
            "At least one model layer must remain unmasked.",
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let times = monthly_times(config.start_year, config.years);
    let t0 = times[0];

    let obs: Vec<Option<f64>> = times
        .iter()
        .map(|&t| {
            let value = keeling_signal(t, t0, SEASONAL_AMPLITUDE_PPM) + normal.sample(&mut rng);
            let missing = rng.r#gen::<f64>() < MISSING_FRACTION;
            (!missing).then_some(value)
        })
        .collect();

    let surface: Vec<f64> = times
        .iter()
        .map(|&t| {
            keeling_signal(t, t0, SEASONAL_AMPLITUDE_PPM * config.amplitude_scale)
                + config.bias
                + normal.sample(&mut rng)
        })
        .collect();

    let values = if config.layers == 0 {
        ModelValues::Surface(surface.into_iter().map(Some).collect())
    } else {
        ModelValues::Profile(
            surface
                .iter()
                .map(|&v| profile_row(v, config.layers, config.masked_top_layers, config.nlayers))
                .collect(),
        )
    };

    let series = TimeSeries::new(times.clone(), obs).map_err(|e| AppError::new(4, e.to_string()))?;
    let record = ObservationRecord {
        series,
        unit: "1e-6".to_string(),
        site: Site { lat: 19.4, lon: -155.6 },
        nlayers: config.nlayers,
    };

    let mut model = InMemoryModel::new("synthetic");
    let variable = ModelVariable::new(times, values, "1e-6").map_err(|e| AppError::new(4, e.to_string()))?;
    model.insert("co2", variable);

    Ok(DemoData { record, model })
}

/// Layers around `surface` whose near-surface average equals `surface`.
///
/// The `nlayers` layers after the masked ones are symmetric about `surface`
/// so that the reduced series reproduces the surface signal.
fn profile_row(surface: f64, layers: usize, masked: usize, nlayers: usize) -> Vec<Option<f64>> {
    let used = nlayers.clamp(1, layers - masked);
    let center = (used as f64 - 1.0) / 2.0;
    (0..layers)
        .map(|j| {
            if j < masked {
                None
            } else {
                Some(surface + LAYER_STEP_PPM * ((j - masked) as f64 - center))
            }
        })
        .collect()
}
