//! Infrastructure layer providing external service integrations.
//!
//! This module contains the HTTP prediction client, reference data loading,
//! CSV export, clipboard access, configuration and logging setup.

pub mod client;
pub mod clipboard;
pub mod config;
pub mod logging;
pub mod persistence;

pub use client::*;
pub use clipboard::*;
pub use config::*;
pub use logging::*;
pub use persistence::*;
