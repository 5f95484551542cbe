//! Purchase Agreement Portal server
//!
//! Thin adapters over `purchase-portal-core`: an axum router exposing the
//! submission pipeline over HTTP, and the command-line interface that serves
//! it or drives the pipeline and draft store directly.

pub mod cli;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
