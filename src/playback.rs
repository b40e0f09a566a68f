use std::time::Duration;

use log::debug;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

/// Playback is either stopped or running; pausing is modeled as Stopped with
/// the frame cursor left where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Running,
}

/// Frame-advance timing for playback, driven by an external monotonic clock.
///
/// The host feeds `tick` with timestamps from whatever scheduling primitive
/// it has (a timer, a refresh callback, a simulated clock in tests). When the
/// elapsed time since the last advance reaches one frame interval, `tick`
/// reports that the session should step to the next frame and re-anchors to
/// the tick's own timestamp rather than incrementing the anchor, so dropped
/// ticks skip time instead of accumulating a catch-up burst.
///
/// `stop` is idempotent and synchronous: once it returns, any late tick is a
/// guaranteed no-op.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    state: PlaybackState,
    fps: u32,
    anchor: Option<Duration>,
}

impl PlaybackScheduler {
    pub fn new(fps: u32) -> Self {
        Self { state: PlaybackState::Stopped, fps: fps.clamp(MIN_FPS, MAX_FPS), anchor: None }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Time between frame advances at the current rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps))
    }

    /// Rate changes clamp to `MIN_FPS..=MAX_FPS` and take effect on the next
    /// tick without resetting the position.
    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = PlaybackState::Running;
        self.anchor = None;
        debug!("playback started at {} fps", self.fps);
    }

    /// Stop and clear the tick anchor. Idempotent.
    pub fn stop(&mut self) {
        if self.is_running() {
            debug!("playback stopped");
        }
        self.state = PlaybackState::Stopped;
        self.anchor = None;
    }

    /// Advance the clock to `now`. Returns true when one frame interval has
    /// elapsed and the session should step to the next frame.
    ///
    /// The first tick after `start` only anchors the clock. Ticks while
    /// stopped are no-ops.
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(anchor) = self.anchor else {
            self.anchor = Some(now);
            return false;
        };
        if now.saturating_sub(anchor) >= self.frame_interval() {
            self.anchor = Some(now);
            return true;
        }
        false
    }
}
