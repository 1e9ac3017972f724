//! Core types for the guided component architect.
//!
//! Provides the immutable design-token set ([`tokens::DesignTokenSet`]) that every
//! generated component is held to, and the layered runtime configuration
//! ([`config::GcaConfig`]).

pub mod config;
pub mod tokens;

pub use config::{ConfigError, GcaConfig, GenerationConfig, ProviderConfig};
pub use tokens::{DesignTokenSet, TokenError};
