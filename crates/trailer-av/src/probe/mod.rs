//! Media duration probing.
//!
//! Only the container duration is needed to tell a feature from a trailer, so
//! this module asks ffprobe for `format=duration` and nothing else.

mod ffprobe;

pub use ffprobe::probe_duration_with;

use std::time::Duration;

/// Playable duration at or above which a file counts as the movie.
pub const MIN_MOVIE_DURATION: Duration = Duration::from_secs(600);

/// Whether a probed duration qualifies as a full feature.
pub fn is_feature_length(duration: Duration) -> bool {
    duration >= MIN_MOVIE_DURATION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_length_threshold() {
        assert!(is_feature_length(Duration::from_secs(600)));
        assert!(is_feature_length(Duration::from_secs(7200)));
        assert!(!is_feature_length(Duration::from_secs(599)));
        assert!(!is_feature_length(Duration::from_secs_f64(599.9)));
    }
}
