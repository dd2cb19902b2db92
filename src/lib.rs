//! Trailer Technician - finds movies on disk and fetches a matching trailer
//!
//! This library crate exposes the core functionality for integration testing.

pub mod arr;
pub mod config;
pub mod downloaders;
pub mod logging;
pub mod metadata;
pub mod processor;
pub mod scanner;
pub mod update;
