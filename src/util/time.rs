use std::sync::OnceLock;
use std::time::{Duration, Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic time elapsed since the first call in this process.
///
/// The default clock for hosts driving playback ticks; tests inject their own
/// simulated timestamps instead.
pub fn now() -> Duration {
    EPOCH.get_or_init(Instant::now).elapsed()
}
