//! Trailer-Common: shared types, naming conventions, and path utilities.
//!
//! This crate provides functionality used across trailer-technician:
//!
//! - **Path Utilities**: Functions to detect movie, trailer, and metadata files
//! - **Naming Conventions**: Where a trailer for a given movie file belongs
//! - **Core Types**: Enums for directory entry roles and disc layouts
//!
//! # Examples
//!
//! ```
//! use trailer_common::paths::{is_video_file, trailer_file_name};
//! use trailer_common::DiscLayout;
//! use std::path::Path;
//!
//! assert!(is_video_file(Path::new("Inception (2010).mkv")));
//! assert_eq!(
//!     trailer_file_name(Path::new("Inception (2010).mkv")),
//!     "Inception (2010)-trailer.mp4"
//! );
//! assert_eq!(DiscLayout::from_dir_name("BDMV"), Some(DiscLayout::BluRay));
//! ```

pub mod paths;
pub mod types;

pub use types::*;
