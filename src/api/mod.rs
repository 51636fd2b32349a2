//! HTTP API layer
//!
//! One unified axum surface over the submission handler, feedback store,
//! and analytics aggregator.

pub mod feedback;
pub mod response;
pub mod server;
pub mod voice;

pub use server::{ApiServer, AppState};
