//! Time- and unit-filtered access to the reference dataset.
//!
//! The loaded record is never modified. A request for another unit converts
//! the full value buffer once with a single factor and caches it by unit, so
//! repeated requests are idempotent and a failed conversion leaves the store
//! exactly as it was. The cache sits behind an `RwLock`, which makes the
//! store safe to share between threads.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;

use crate::domain::{ObservationRecord, SeriesReport, Site};
use crate::error::Result;
use crate::units::UnitConverter;

/// Quantity family used for unit lookups.
pub const CO2_FAMILY: &str = "co2";

pub struct ObservationStore {
    record: ObservationRecord,
    converter: Arc<dyn UnitConverter>,
    converted: RwLock<HashMap<String, Arc<Vec<Option<f64>>>>>,
}

impl std::fmt::Debug for ObservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationStore")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl ObservationStore {
    pub fn new(record: ObservationRecord, converter: Arc<dyn UnitConverter>) -> Self {
        Self {
            record,
            converter,
            converted: RwLock::new(HashMap::new()),
        }
    }

    pub fn record(&self) -> &ObservationRecord {
        &self.record
    }

    pub fn site(&self) -> Site {
        self.record.site
    }

    pub fn nlayers(&self) -> usize {
        self.record.nlayers
    }

    /// `(min, max)` over all sample times, masked ones included.
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        self.record.series.time_extent()
    }

    /// The samples nearest to `start` and `end` and everything in between,
    /// expressed in `target_unit` (or the load unit when `None`).
    pub fn get_window(&self, start: f64, end: f64, target_unit: Option<&str>) -> Result<SeriesReport> {
        let unit = target_unit.unwrap_or(self.record.unit.as_str());
        let values = self.values_in(unit)?;

        let times = &self.record.series.times;
        let (t, var) = match (nearest_index(times, start), nearest_index(times, end)) {
            (Some(begin), Some(last)) if last >= begin => {
                (times[begin..=last].to_vec(), values[begin..=last].to_vec())
            }
            _ => (Vec::new(), Vec::new()),
        };

        debug!(
            "observation window [{start:.2}, {end:.2}] -> {} samples in [{unit}]",
            t.len()
        );
        Ok(SeriesReport {
            t,
            var,
            unit: unit.to_string(),
        })
    }

    fn values_in(&self, unit: &str) -> Result<Arc<Vec<Option<f64>>>> {
        if unit == self.record.unit {
            return Ok(Arc::new(self.record.series.values.clone()));
        }

        if let Some(hit) = self
            .converted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(unit)
        {
            return Ok(Arc::clone(hit));
        }

        let factor = self.converter.factor(CO2_FAMILY, &self.record.unit, unit)?;
        debug!("converting observations [{}] -> [{unit}] (x{factor})", self.record.unit);
        let values: Arc<Vec<Option<f64>>> = Arc::new(
            self.record
                .series
                .values
                .iter()
                .map(|v| v.map(|x| x * factor))
                .collect(),
        );

        let mut cache = self.converted.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(unit.to_string()).or_insert(values)))
    }
}

/// First index whose time is closest to `target`.
///
/// `times` must be non-decreasing. Ties resolve to the earliest index, both
/// across equidistant neighbours and within runs of repeated times.
pub fn nearest_index(times: &[f64], target: f64) -> Option<usize> {
    if times.is_empty() {
        return None;
    }
    let upper = times.partition_point(|&t| t < target);
    if upper == 0 {
        return Some(0);
    }
    let below = times[upper - 1];
    // First occurrence of the value just below the target.
    let below_idx = times.partition_point(|&t| t < below);
    if upper == times.len() {
        return Some(below_idx);
    }
    if (target - below).abs() <= (times[upper] - target).abs() {
        Some(below_idx)
    } else {
        Some(upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Site, TimeSeries};
    use crate::error::ConfrontError;
    use crate::units::ConversionTable;

    fn store(times: Vec<f64>, values: Vec<Option<f64>>, unit: &str) -> ObservationStore {
        let record = ObservationRecord {
            series: TimeSeries::new(times, values).unwrap(),
            unit: unit.to_string(),
            site: Site { lat: 19.4, lon: -155.6 },
            nlayers: 3,
        };
        ObservationStore::new(record, Arc::new(ConversionTable::standard()))
    }

    fn argmin(times: &[f64], target: f64) -> usize {
        let mut best = 0;
        for (i, &t) in times.iter().enumerate() {
            if (t - target).abs() < (times[best] - target).abs() {
                best = i;
            }
        }
        best
    }

    #[test]
    fn nearest_index_matches_linear_argmin() {
        let times = [0.0, 10.0, 10.0, 20.0, 30.0, 30.0, 45.0];
        for target in [-5.0, 0.0, 4.0, 5.0, 10.0, 14.9, 15.0, 15.1, 25.0, 30.0, 37.5, 44.0, 100.0] {
            assert_eq!(
                nearest_index(&times, target),
                Some(argmin(&times, target)),
                "target {target}"
            );
        }
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn window_is_nearest_and_inclusive() {
        let s = store(
            vec![0.0, 30.0, 60.0, 90.0],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            "1e-6",
        );
        let w = s.get_window(28.0, 62.0, None).unwrap();
        assert_eq!(w.t, vec![30.0, 60.0]);
        assert_eq!(w.var, vec![Some(2.0), Some(3.0)]);
        assert_eq!(w.unit, "1e-6");
    }

    #[test]
    fn inverted_window_is_empty() {
        let s = store(vec![0.0, 30.0, 60.0], vec![Some(1.0); 3], "1e-6");
        let w = s.get_window(60.0, 0.0, None).unwrap();
        assert!(w.t.is_empty());
    }

    #[test]
    fn converting_twice_is_idempotent() {
        let s = store(vec![0.0, 30.0], vec![Some(400.0), None], "1e-6");
        let first = s.get_window(0.0, 30.0, Some("ppb")).unwrap();
        let second = s.get_window(0.0, 30.0, Some("ppb")).unwrap();
        assert_eq!(first, second);
        assert!((first.var[0].unwrap() - 400_000.0).abs() < 1e-6);
        assert_eq!(first.var[1], None);
        assert_eq!(first.unit, "ppb");

        // The load unit is still served unscaled.
        let base = s.get_window(0.0, 30.0, Some("1e-6")).unwrap();
        assert_eq!(base.var[0], Some(400.0));
    }

    #[test]
    fn unknown_unit_leaves_store_unchanged() {
        let s = store(vec![0.0, 30.0], vec![Some(400.0), Some(401.0)], "1e-6");
        let before = s.record().clone();
        let err = s.get_window(0.0, 30.0, Some("K")).unwrap_err();
        assert_eq!(
            err,
            ConfrontError::UnknownUnit {
                from: "1e-6".to_string(),
                to: "K".to_string()
            }
        );
        assert_eq!(s.record(), &before);
        let w = s.get_window(0.0, 30.0, None).unwrap();
        assert_eq!(w.var, vec![Some(400.0), Some(401.0)]);
        assert_eq!(w.unit, "1e-6");
    }

    #[test]
    fn store_is_shareable_across_threads() {
        let s = Arc::new(store(vec![0.0, 30.0], vec![Some(1.0), Some(2.0)], "1e-6"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || s.get_window(0.0, 30.0, Some("ppb")).unwrap())
            })
            .collect();
        for h in handles {
            let w = h.join().unwrap();
            assert!((w.var[1].unwrap() - 2000.0).abs() < 1e-9);
        }
    }
}
