//! Time sources and frame-relative clocks.
//!
//! All times are milliseconds in `f64`.
//!
//! - [`StopwatchClock`] - wall time from a monotonic [`Instant`], with rate,
//!   pause and seek.
//! - [`ManualClock`] - time driven by the host (or a test); cheap to clone,
//!   every clone observes the same time.
//! - [`FramedClock`] - samples a source once per frame and exposes a local
//!   time axis with its own rate and pause. Every loaded node owns one, fed by
//!   its parent's time, so a subtree can be slowed or stopped without
//!   touching its siblings.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// A time source.
pub trait Clock {
    fn current_time(&self) -> f64;

    fn rate(&self) -> f64 {
        1.0
    }

    fn is_running(&self) -> bool {
        true
    }
}

/// A clock that only advances when a frame is processed, and remembers what
/// that frame looked like.
pub trait FrameClock: Clock {
    /// Time elapsed between the previous frame and the current one.
    fn elapsed_frame_time(&self) -> f64;

    fn frames_per_second(&self) -> f64;

    fn average_frame_time(&self) -> f64;
}

/// Wall-clock stopwatch.
#[derive(Debug, Clone)]
pub struct StopwatchClock {
    /// Time banked before the current run segment started.
    accumulated: f64,
    /// Start of the current run segment, `None` while stopped.
    started_at: Option<Instant>,
    rate: f64,
}

impl StopwatchClock {
    /// A stopped stopwatch at time zero.
    pub fn new() -> Self {
        Self {
            accumulated: 0.0,
            started_at: None,
            rate: 1.0,
        }
    }

    /// A stopwatch that is already running.
    pub fn started() -> Self {
        let mut clock = Self::new();
        clock.start();
        clock
    }

    fn segment_elapsed(&self) -> f64 {
        self.started_at
            .map(|start| start.elapsed().as_secs_f64() * 1000.0 * self.rate)
            .unwrap_or(0.0)
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        self.accumulated += self.segment_elapsed();
        self.started_at = None;
    }

    /// Stop and rewind to zero.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
        self.started_at = None;
    }

    /// Jump to `time`, keeping the running state.
    pub fn seek(&mut self, time: f64) {
        self.accumulated = time;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn set_rate(&mut self, rate: f64) {
        // Bank the time run at the old rate before switching.
        let running = self.started_at.is_some();
        self.stop();
        self.rate = rate;
        if running {
            self.start();
        }
    }
}

impl Default for StopwatchClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StopwatchClock {
    fn current_time(&self) -> f64 {
        self.accumulated + self.segment_elapsed()
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

#[derive(Debug)]
struct ManualState {
    time: f64,
    rate: f64,
    running: bool,
}

/// Host-driven time source.
///
/// Clones share state: hand one clone to the tree and keep another to move
/// time forward.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Rc<RefCell<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::at(0.0)
    }

    pub fn at(time: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                time,
                rate: 1.0,
                running: true,
            })),
        }
    }

    pub fn set_time(&self, time: f64) {
        self.state.borrow_mut().time = time;
    }

    /// Move time forward by `delta`, scaled by the rate; no-op while stopped.
    pub fn advance(&self, delta: f64) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.time += delta * state.rate;
        }
    }

    pub fn set_rate(&self, rate: f64) {
        self.state.borrow_mut().rate = rate;
    }

    pub fn set_running(&self, running: bool) {
        self.state.borrow_mut().running = running;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn current_time(&self) -> f64 {
        self.state.borrow().time
    }

    fn rate(&self) -> f64 {
        self.state.borrow().rate
    }

    fn is_running(&self) -> bool {
        self.state.borrow().running
    }
}

/// Weight of the newest frame in [`FramedClock::average_frame_time`].
const FRAME_TIME_SMOOTHING: f64 = 0.1;

/// A clock derived from a source time, advanced once per frame.
///
/// While running, each [`process_frame`](Self::process_frame) adds
/// `(source - last_source) * rate` to the local time. While stopped the local
/// time is frozen, but the source position is still tracked so resuming does
/// not jump forward by the paused duration.
#[derive(Debug, Clone)]
pub struct FramedClock {
    current_time: f64,
    last_source_time: f64,
    elapsed_frame_time: f64,
    rate: f64,
    running: bool,

    fps_window: f64,
    window_elapsed: f64,
    window_frames: u32,
    frames_per_second: f64,
    average_frame_time: f64,
}

impl FramedClock {
    /// A running clock whose local time starts out equal to `source_time`.
    pub fn new(source_time: f64) -> Self {
        Self::with_local_time(source_time, source_time)
    }

    pub fn with_local_time(local_time: f64, source_time: f64) -> Self {
        Self {
            current_time: local_time,
            last_source_time: source_time,
            elapsed_frame_time: 0.0,
            rate: 1.0,
            running: true,
            fps_window: 1000.0,
            window_elapsed: 0.0,
            window_frames: 0,
            frames_per_second: 0.0,
            average_frame_time: 0.0,
        }
    }

    pub fn with_fps_window(mut self, window: f64) -> Self {
        self.fps_window = window;
        self
    }

    /// Sample the source and advance local time.
    pub fn process_frame(&mut self, source_time: f64) {
        let source_elapsed = source_time - self.last_source_time;
        self.last_source_time = source_time;

        self.elapsed_frame_time = if self.running {
            source_elapsed * self.rate
        } else {
            0.0
        };
        self.current_time += self.elapsed_frame_time;

        self.window_frames += 1;
        self.window_elapsed += source_elapsed.abs();
        if self.window_elapsed >= self.fps_window {
            self.frames_per_second = f64::from(self.window_frames) * 1000.0 / self.window_elapsed;
            self.window_frames = 0;
            self.window_elapsed = 0.0;
        }

        self.average_frame_time = if self.average_frame_time == 0.0 {
            self.elapsed_frame_time
        } else {
            self.average_frame_time * (1.0 - FRAME_TIME_SMOOTHING)
                + self.elapsed_frame_time * FRAME_TIME_SMOOTHING
        };
    }

    /// Forget the previous source position, so the next frame measures its
    /// elapsed time from `source_time`. Used when the source itself changes.
    pub fn rebase(&mut self, source_time: f64) {
        self.last_source_time = source_time;
        self.elapsed_frame_time = 0.0;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Shift local time without touching the source tracking.
    pub fn seek(&mut self, time: f64) {
        self.current_time = time;
    }
}

impl Clock for FramedClock {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl FrameClock for FramedClock {
    fn elapsed_frame_time(&self) -> f64 {
        self.elapsed_frame_time
    }

    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn average_frame_time(&self) -> f64 {
        self.average_frame_time
    }
}
