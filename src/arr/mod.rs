//! Radarr integration.
//!
//! Radarr runs custom scripts with the event described in `radarr_*`
//! environment variables. [`RadarrEnvironment`] reads those variables and
//! decides whether they describe a finished download worth a trailer.

mod env;

pub use env::{EnvError, RadarrEnvironment, RadarrTrigger};
