//! Infrastructure adapters. Implement ports.
//!
//! AI services, web pages, HTTP API, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod http;
pub mod ui;
pub mod web;
