//! # leapp-ready
//!
//! The binary side of leapp-ready: configuration, the Satellite REST client,
//! the `hammer` enable path and the command-line interface. All decisions
//! are made by `leapp-ready-core`.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod hammer;

pub use client::{SatelliteClient, SetupError};
pub use config::{ConfigError, EnableVia, FileConfig, Overrides, Settings};
pub use error::AppError;
pub use hammer::HammerEnabler;
