//! Analysis Configuration Module
//!
//! Provides the configuration for an analysis run loaded from TOML files,
//! so sampling, filter and threshold settings can be tuned per machine
//! without code changes.
//!
//! ## Loading Order
//!
//! 1. `ROTOR_SENTINEL_CONFIG` environment variable (path to TOML file)
//! 2. `rotor_sentinel.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! There is no global instance: load once and hand the value to whatever
//! needs it.
//!
//! ```ignore
//! let config = AnalysisConfig::load();
//! let analyzer = MachineAnalyzer::new(&config)?;
//! ```

mod analysis_config;
pub mod validation;

pub use analysis_config::*;
