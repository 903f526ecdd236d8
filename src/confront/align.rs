//! Time alignment check between the model and observation windows.

use crate::error::{ConfrontError, Result};

/// Require equal lengths and `|model[i] - obs[i]| <= tolerance` at every
/// position.
///
/// Monthly series from different sources place their samples at different
/// points within the month, so exact equality is not expected.
pub fn validate_alignment(model_times: &[f64], obs_times: &[f64], tolerance: f64) -> Result<()> {
    if model_times.len() != obs_times.len() {
        return Err(ConfrontError::Alignment(format!(
            "model has {} time steps, observations have {}",
            model_times.len(),
            obs_times.len()
        )));
    }

    let offending = model_times
        .iter()
        .zip(obs_times)
        .enumerate()
        .find(|(_, (m, o))| !((*m - *o).abs() <= tolerance));

    match offending {
        Some((i, (m, o))) => Err(ConfrontError::Alignment(format!(
            "time step {i}: model t={m:.3} and obs t={o:.3} differ by more than {tolerance} days"
        ))),
        None => Ok(()),
    }
}
