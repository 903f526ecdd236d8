//! `co2-confront` library crate.
//!
//! Scores a model's near-surface CO2 against the Mauna Loa monthly record:
//! period mean, weighted bias and RMSE with their scores, and the
//! interannual variability of the seasonal amplitude.
//!
//! The binary (`confront`) is a thin wrapper around this library so that
//! the confrontation can be driven without spawning processes.

pub mod app;
pub mod cli;
pub mod confront;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod model;
pub mod obs;
pub mod report;
pub mod units;
