//! Shared types, error model, and configuration for jirest.
//!
//! This crate is the foundation depended on by all other jirest crates.
//! It provides:
//! - [`JirestError`] — the unified error type
//! - Domain types ([`Catalog`], [`EndpointRecord`], [`Param`], [`HttpMethod`], [`RawDocument`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, SourceConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{JirestError, Result};
pub use types::{Catalog, EndpointRecord, HttpMethod, Param, RawDocument, RawEndpoint};
