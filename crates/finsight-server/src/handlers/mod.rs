//! HTTP request handlers organized by domain

pub mod analysis;
pub mod health;

// Re-export all handlers for use in router
pub use analysis::*;
pub use health::*;
