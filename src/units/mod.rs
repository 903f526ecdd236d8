//! Unit conversion.
//!
//! Conversions are multiplicative factors within a quantity family. Each unit
//! of a family is registered with its scale relative to the family's base
//! unit, so the factor between two units is `scale(from) / scale(to)`.

use std::collections::HashMap;

use crate::error::{ConfrontError, Result};

/// Molar mass of dry air (g/mol).
pub const MOLAR_MASS_AIR: f64 = 28.9644;
/// Molar mass of CO2 (g/mol).
pub const MOLAR_MASS_CO2: f64 = 44.0095;

/// Looks up the factor that converts values in `from` into `to`.
pub trait UnitConverter: Send + Sync {
    fn factor(&self, family: &str, from: &str, to: &str) -> Result<f64>;
}

/// Table of `(family, unit) -> scale` entries.
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    scales: HashMap<String, HashMap<String, f64>>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table: CO2 as a mole fraction (base unit `1`).
    pub fn standard() -> Self {
        let mut table = Self::new();
        for unit in ["1", "mol mol-1"] {
            table.insert("co2", unit, 1.0);
        }
        for unit in ["1e-6", "ppm", "ppmv", "umol mol-1"] {
            table.insert("co2", unit, 1e-6);
        }
        for unit in ["1e-9", "ppb", "ppbv"] {
            table.insert("co2", unit, 1e-9);
        }
        // Mass mixing ratio -> mole fraction.
        table.insert("co2", "kg kg-1", MOLAR_MASS_AIR / MOLAR_MASS_CO2);
        table
    }

    /// Register `unit` with its scale relative to the family base unit.
    pub fn insert(&mut self, family: &str, unit: &str, scale: f64) {
        self.scales
            .entry(family.to_string())
            .or_default()
            .insert(unit.to_string(), scale);
    }

    fn scale(&self, family: &str, unit: &str) -> Option<f64> {
        self.scales.get(family)?.get(unit).copied()
    }
}

impl UnitConverter for ConversionTable {
    fn factor(&self, family: &str, from: &str, to: &str) -> Result<f64> {
        if from == to {
            return Ok(1.0);
        }
        let unknown = || ConfrontError::UnknownUnit {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_scale = self.scale(family, from).ok_or_else(unknown)?;
        let to_scale = self.scale(family, to).ok_or_else(unknown)?;
        if !(from_scale.is_finite() && to_scale.is_finite() && to_scale != 0.0) {
            return Err(unknown());
        }
        Ok(from_scale / to_scale)
    }
}
