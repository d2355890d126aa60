//! Configuration loading and management for the settlement engine.
//!
//! This module provides functionality to load the engine configuration from
//! a YAML file: numeric tolerance, rounding scale, settled-split handling
//! and the default expense category.
//!
//! # Example
//!
//! ```no_run
//! use settle_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! println!("Rounding to {} places", loader.config().decimal_places);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{EngineConfig, MAX_DECIMAL_PLACES};
