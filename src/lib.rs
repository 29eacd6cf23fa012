//! Labdash - homelab monitoring dashboard core
//!
//! A reactive state store, a hash-style router, and a deterministic
//! force-directed dependency-graph layout, plus the presentation logic
//! around them. Data comes from a mock JSON snapshot; preferences persist
//! through a local key-value store.

pub mod cli;
pub mod config;
pub mod data;
pub mod debounce;
pub mod error;
pub mod graph;
pub mod model;
pub mod render;
pub mod router;
pub mod store;
pub mod views;

pub use config::Config;
pub use error::{DashError, Result};
pub use router::Router;
pub use store::{AppState, StatePatch, Store, Theme};
