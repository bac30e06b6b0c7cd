//! Configuration module for Styledown
//!
//! User settings, their JSON persistence in the platform config directory,
//! and loading of custom stylesheet files.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
