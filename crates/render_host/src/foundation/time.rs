//! Time management utilities
//!
//! The render loop takes its timestamps from the active backend's clock, so
//! everything here works on caller-supplied seconds rather than `Instant`.

/// Nominal frame rate every speed in the host is expressed against
pub const FPS_REFERENCE: f32 = 60.0;

/// Measured rates below this are treated as a stall (debugger pause, window
/// drag) and replaced by [`FPS_REFERENCE`]
pub const FPS_FLOOR: f32 = 5.0;

/// Number of frames averaged per measurement
pub const FPS_WINDOW_FRAMES: u32 = 3;

/// Rolling frame rate counter for the render loop
///
/// Outside benchmark mode the counter measures the rate over short windows of
/// [`FPS_WINDOW_FRAMES`] frames. In benchmark mode it never measures and
/// always reports [`FPS_REFERENCE`], so animation advances identically on
/// every machine; the frame total and start time are then used for the
/// average reported at the end of the run.
#[derive(Debug, Clone)]
pub struct FrameRateCounter {
    benchmark: bool,
    window_frames: u32,
    window_start: f64,
    run_start: f64,
    total_frames: u64,
    current: f32,
}

impl FrameRateCounter {
    /// Create a counter whose first window starts at `now`
    pub fn new(now: f64, benchmark: bool) -> Self {
        Self {
            benchmark,
            window_frames: 0,
            window_start: now,
            run_start: now,
            total_frames: 0,
            current: FPS_REFERENCE,
        }
    }

    /// Register one frame at time `now` and return the rate to simulate with
    pub fn tick(&mut self, now: f64) -> f32 {
        self.total_frames += 1;
        self.window_frames += 1;

        if !self.benchmark && self.window_frames >= FPS_WINDOW_FRAMES {
            let elapsed = now - self.window_start;
            let measured = if elapsed > 0.0 {
                (f64::from(self.window_frames) / elapsed) as f32
            } else {
                FPS_REFERENCE
            };
            self.current = if measured < FPS_FLOOR { FPS_REFERENCE } else { measured };
            self.window_frames = 0;
            self.window_start = now;
        }

        if self.benchmark {
            FPS_REFERENCE
        } else {
            self.current
        }
    }

    /// Start a fresh measurement window at `now`, keeping the frame total.
    ///
    /// Called after a window recreation so the pause spent rebuilding the
    /// context is not counted as a slow frame.
    pub fn restart_window(&mut self, now: f64) {
        self.window_frames = 0;
        self.window_start = now;
    }

    /// Frames registered since the counter was created
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Time the counter was created at
    pub fn run_start(&self) -> f64 {
        self.run_start
    }

    /// Average frame rate from creation until `now`
    pub fn average_fps(&self, now: f64) -> f64 {
        let elapsed = now - self.run_start;
        if elapsed > 0.0 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Simple stopwatch over caller-supplied timestamps
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: f64,
}

impl Stopwatch {
    /// Start measuring at `now`
    pub fn start_at(now: f64) -> Self {
        Self { start: now }
    }

    /// Seconds elapsed between the start and `now`
    pub fn elapsed_secs(&self, now: f64) -> f64 {
        (now - self.start).max(0.0)
    }

    /// Whether at least `secs` have elapsed at `now`
    pub fn has_elapsed(&self, now: f64, secs: f64) -> bool {
        self.elapsed_secs(now) >= secs
    }
}
