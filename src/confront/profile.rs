//! Vertical-layer reduction.
//!
//! Some models report CO2 on atmospheric levels, with the levels below the
//! surface masked. For each time step we start at the first unmasked layer
//! and average `nlayers` consecutive layers from there, clipping every layer
//! index to the last layer so reads never leave the profile.

use crate::error::{ConfrontError, Result};

/// Reduce a `[time][layer]` profile to one near-surface value per time step.
///
/// Clipped indices that collapse onto the same layer are counted once, and
/// only unmasked layers enter the mean. A time step whose selected layers are
/// all masked stays masked.
pub fn reduce_profile(rows: &[Vec<Option<f64>>], nlayers: usize) -> Result<Vec<Option<f64>>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let nlev = first.len();
    if nlev == 0 {
        return Err(ConfrontError::InvalidSeries("profile has no layers".to_string()));
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != nlev) {
        return Err(ConfrontError::InvalidSeries(format!(
            "profile row {bad} has {} layers, expected {nlev}",
            rows[bad].len()
        )));
    }

    let last = nlev - 1;
    let nlayers = nlayers.max(1);

    Ok(rows
        .iter()
        .map(|row| {
            let top = row.iter().take_while(|v| v.is_none()).count().min(last);
            let mut sum = 0.0;
            let mut n = 0usize;
            let mut prev = None;
            for i in 0..nlayers {
                let idx = (top + i).min(last);
                if prev == Some(idx) {
                    continue;
                }
                prev = Some(idx);
                if let Some(v) = row[idx] {
                    sum += v;
                    n += 1;
                }
            }
            (n > 0).then(|| sum / n as f64)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_masked_top_layer_and_averages_next_three() {
        let rows = vec![
            vec![None, Some(1.0), Some(2.0), Some(3.0), Some(40.0)],
            vec![None, Some(4.0), Some(5.0), Some(6.0), Some(70.0)],
        ];
        let out = reduce_profile(&rows, 3).unwrap();
        assert_eq!(out, vec![Some(2.0), Some(5.0)]);
    }

    #[test]
    fn clipping_at_the_bottom_uses_fewer_layers() {
        let rows = vec![vec![None, None, Some(6.0), Some(8.0)]];
        // Layers 2, 3, 3 (clipped) -> mean of {2, 3}.
        let out = reduce_profile(&rows, 3).unwrap();
        assert_eq!(out, vec![Some(7.0)]);
    }

    #[test]
    fn masked_depth_varies_per_time_step() {
        let rows = vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![None, None, Some(9.0)],
        ];
        let out = reduce_profile(&rows, 2).unwrap();
        assert_eq!(out, vec![Some(1.5), Some(9.0)]);
    }

    #[test]
    fn fully_masked_step_stays_masked() {
        let rows = vec![vec![None, None], vec![Some(1.0), Some(3.0)]];
        let out = reduce_profile(&rows, 3).unwrap();
        assert_eq!(out, vec![None, Some(2.0)]);
    }

    #[test]
    fn ragged_profiles_are_rejected() {
        let rows = vec![vec![Some(1.0), Some(2.0)], vec![Some(1.0)]];
        assert!(matches!(
            reduce_profile(&rows, 2),
            Err(ConfrontError::InvalidSeries(_))
        ));
    }
}
