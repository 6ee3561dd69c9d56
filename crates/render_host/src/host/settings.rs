//! Runtime settings and the recreation dirty flag
//!
//! Pipeline, multisample count and fullscreen are attributes of the window and
//! context pair, so writing them marks the settings dirty; the render loop
//! picks the flag up after the frame and rebuilds the pair. Everything else
//! applies in place.

use serde::{Deserialize, Serialize};

/// Highest frame statistics mode
pub const MAX_STAT_MODE: u32 = 2;

/// Multisample counts stepped through by the sample-count action
pub const SAMPLE_COUNT_STEPS: [u32; 4] = [0, 2, 4, 8];

/// Freeze mode at which camera input stops
const CAMERA_FREEZE_MODE: u32 = 2;

/// Render pipeline the camera uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Forward shading into the default framebuffer
    #[default]
    Forward,
    /// Deferred shading
    Deferred,
    /// High dynamic range with tone mapping
    Hdr,
}

impl PipelineKind {
    /// Every pipeline, in cycle order
    pub const ALL: [PipelineKind; 3] = [Self::Forward, Self::Deferred, Self::Hdr];

    /// The pipeline after this one in the cycle
    pub fn next(self) -> Self {
        match self {
            Self::Forward => Self::Deferred,
            Self::Deferred => Self::Hdr,
            Self::Hdr => Self::Forward,
        }
    }

    /// Name shown in the stats overlay
    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Deferred => "deferred",
            Self::Hdr => "HDR",
        }
    }

    /// Pipeline resource name, relative to the content directory
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Forward => "pipelines/forward.pipeline.xml",
            Self::Deferred => "pipelines/deferred.pipeline.xml",
            Self::Hdr => "pipelines/hdr.pipeline.xml",
        }
    }
}

/// Settings the user changes while the host runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pipeline: PipelineKind,
    sample_count: u32,
    fullscreen: bool,
    debug_view: bool,
    wireframe: bool,
    stat_mode: u32,
    freeze_mode: u32,
    show_help: bool,
    benchmark: bool,
    benchmark_length: u32,
    #[serde(skip)]
    dirty: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::new(PipelineKind::Forward, 0, false)
    }
}

impl RuntimeSettings {
    /// Settings for the first window; nothing is dirty yet
    pub fn new(pipeline: PipelineKind, sample_count: u32, fullscreen: bool) -> Self {
        Self {
            pipeline,
            sample_count,
            fullscreen,
            debug_view: false,
            wireframe: false,
            stat_mode: 0,
            freeze_mode: 0,
            show_help: false,
            benchmark: false,
            benchmark_length: 600,
            dirty: false,
        }
    }

    /// Enable benchmark mode, ending the run after `length` frames
    pub fn with_benchmark(mut self, length: u32) -> Self {
        self.benchmark = true;
        self.benchmark_length = length;
        self
    }

    /// Active pipeline
    pub fn pipeline(&self) -> PipelineKind {
        self.pipeline
    }

    /// Engine multisample count
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Multisample count for the window's default framebuffer. Only the
    /// forward pipeline draws into it; the others resolve their own targets.
    pub fn window_sample_count(&self) -> u32 {
        if self.pipeline == PipelineKind::Forward {
            self.sample_count
        } else {
            0
        }
    }

    /// Fullscreen requested
    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Debug view enabled
    pub fn debug_view(&self) -> bool {
        self.debug_view
    }

    /// Wireframe enabled
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Frame statistics mode, `0..=MAX_STAT_MODE`
    pub fn stat_mode(&self) -> u32 {
        self.stat_mode
    }

    /// Freeze mode, `0..=2`
    pub fn freeze_mode(&self) -> u32 {
        self.freeze_mode
    }

    /// Help panel visible
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Benchmark mode
    pub fn benchmark(&self) -> bool {
        self.benchmark
    }

    /// Frames a benchmark run renders
    pub fn benchmark_length(&self) -> u32 {
        self.benchmark_length
    }

    /// Whether camera input (look, touch, movement) is ignored
    pub fn camera_locked(&self) -> bool {
        self.freeze_mode == CAMERA_FREEZE_MODE || self.benchmark
    }

    /// Select a pipeline; dirty when it differs from the active one
    pub fn set_pipeline(&mut self, pipeline: PipelineKind) {
        if self.pipeline != pipeline {
            self.pipeline = pipeline;
            self.dirty = true;
        }
    }

    /// Advance to the next pipeline
    pub fn cycle_pipeline(&mut self) {
        self.set_pipeline(self.pipeline.next());
    }

    /// Set the multisample count; dirty when it changes
    pub fn set_sample_count(&mut self, sample_count: u32) {
        if self.sample_count != sample_count {
            self.sample_count = sample_count;
            self.dirty = true;
        }
    }

    /// Step through [`SAMPLE_COUNT_STEPS`], wrapping to 0. Counts outside the
    /// steps go to the next larger step.
    pub fn step_sample_count(&mut self) {
        let next = SAMPLE_COUNT_STEPS
            .iter()
            .copied()
            .find(|&step| step > self.sample_count)
            .unwrap_or(0);
        self.set_sample_count(next);
    }

    /// Flip fullscreen; always dirty
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.dirty = true;
    }

    /// Debug view and wireframe are exclusive: enabling one disables the other
    pub fn set_debug_view(&mut self, enabled: bool) {
        self.debug_view = enabled;
        if enabled {
            self.wireframe = false;
        }
    }

    /// See [`RuntimeSettings::set_debug_view`]
    pub fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
        if enabled {
            self.debug_view = false;
        }
    }

    /// Next stat mode, wrapping after [`MAX_STAT_MODE`]
    pub fn cycle_stat_mode(&mut self) {
        self.stat_mode = (self.stat_mode + 1) % (MAX_STAT_MODE + 1);
    }

    /// Next freeze mode, wrapping after 2
    pub fn cycle_freeze_mode(&mut self) {
        self.freeze_mode = (self.freeze_mode + 1) % (CAMERA_FREEZE_MODE + 1);
    }

    /// Show or hide the help panel
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Whether a recreation is pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_cycle() {
        let mut settings = RuntimeSettings::default();
        let seen: Vec<_> = (0..3)
            .map(|_| {
                settings.cycle_pipeline();
                settings.pipeline()
            })
            .collect();
        assert_eq!(seen, vec![PipelineKind::Deferred, PipelineKind::Hdr, PipelineKind::Forward]);
        assert!(settings.take_dirty());
        assert!(!settings.take_dirty());
    }

    #[test]
    fn test_setting_same_value_is_not_dirty() {
        let mut settings = RuntimeSettings::new(PipelineKind::Hdr, 4, false);
        settings.set_pipeline(PipelineKind::Hdr);
        settings.set_sample_count(4);
        assert!(!settings.is_dirty());
        settings.set_sample_count(8);
        assert!(settings.is_dirty());
    }

    #[test]
    fn test_sample_count_steps_wrap() {
        let mut settings = RuntimeSettings::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            settings.step_sample_count();
            seen.push(settings.sample_count());
        }
        assert_eq!(seen, vec![2, 4, 8, 0]);

        settings.set_sample_count(3);
        settings.step_sample_count();
        assert_eq!(settings.sample_count(), 4);
    }

    #[test]
    fn test_window_samples_only_for_forward() {
        let mut settings = RuntimeSettings::new(PipelineKind::Forward, 4, false);
        assert_eq!(settings.window_sample_count(), 4);
        settings.set_pipeline(PipelineKind::Deferred);
        assert_eq!(settings.window_sample_count(), 0);
        assert_eq!(settings.sample_count(), 4);
    }

    #[test]
    fn test_debug_view_and_wireframe_are_exclusive() {
        let mut settings = RuntimeSettings::default();
        settings.set_debug_view(true);
        settings.set_wireframe(true);
        assert!(!settings.debug_view());
        assert!(settings.wireframe());
        settings.set_debug_view(true);
        assert!(!settings.wireframe());
        assert!(!settings.is_dirty());
    }

    #[test]
    fn test_modes_wrap() {
        let mut settings = RuntimeSettings::default();
        for expected in [1, 2, 0] {
            settings.cycle_stat_mode();
            assert_eq!(settings.stat_mode(), expected);
        }
        settings.cycle_freeze_mode();
        assert!(!settings.camera_locked());
        settings.cycle_freeze_mode();
        assert!(settings.camera_locked());
        settings.cycle_freeze_mode();
        assert_eq!(settings.freeze_mode(), 0);
    }

    #[test]
    fn test_benchmark_locks_camera() {
        let settings = RuntimeSettings::default().with_benchmark(10);
        assert!(settings.camera_locked());
        assert_eq!(settings.benchmark_length(), 10);
    }

    #[test]
    fn test_dirty_flag_is_not_serialized() {
        let mut settings = RuntimeSettings::default();
        settings.cycle_pipeline();
        let text = ron::to_string(&settings).unwrap();
        let back: RuntimeSettings = ron::from_str(&text).unwrap();
        assert_eq!(back.pipeline(), PipelineKind::Deferred);
        assert!(!back.is_dirty());
    }
}
