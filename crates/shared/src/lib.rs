//! Shared types, configuration, and elevation tokens for Clausura.
//!
//! This crate provides common building blocks used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Configuration management (lock threshold, filing deadline, elevation)
//! - Elevated-credential token verification and context signing

pub mod config;
pub mod elevation;
pub mod types;

pub use config::{AppConfig, CloseoutConfig, ElevationConfig};
pub use elevation::{ElevationError, ElevationService};
