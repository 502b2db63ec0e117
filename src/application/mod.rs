//! Application layer managing state and the submission workflow.
//!
//! This module coordinates between the domain layer and presentation layer,
//! holding the form state and running prediction requests.

pub mod state;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use state::*;
pub use submission::*;
