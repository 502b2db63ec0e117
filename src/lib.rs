//! Race Strategy - Pit Strategy Prediction Client Library
//!
//! A terminal client that collects race conditions, asks a prediction
//! service for a pit-stop strategy and renders the result.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
