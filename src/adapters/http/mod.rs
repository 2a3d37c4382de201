//! Inbound HTTP API (axum). Browser-facing entry point for the strategy use cases.

pub mod server;

pub use server::{ApiState, router, serve};
