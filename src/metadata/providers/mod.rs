//! Concrete movie database clients.
//!
//! Each submodule wraps a single external API and implements the
//! [`MovieDatabase`](super::MovieDatabase) trait.

pub mod tmdb;

pub use tmdb::TmdbProvider;
