//! # Host
//!
//! The application driver. A [`Host`] owns one backend, one renderer and the
//! sample content, and runs the lifecycle
//!
//! ```text
//! Uninitialized ──init──► Running ──settings dirty──► Reinitializing ──► Running
//!       │                    │                                              │
//!       └── failure ──► Released ◄──────────── quit / benchmark end ────────┘
//! ```
//!
//! ## Negotiation
//!
//! `init` asks the backend for a window with the preferred profile. When the
//! platform rejects it, exactly one retry is made with the legacy fallback
//! profile; a second rejection is fatal. Renderer and resource failures are
//! fatal straight away.
//!
//! ## Recreation
//!
//! Pipeline, multisample and fullscreen changes are never applied to a live
//! context. After the frame in which they were made, the renderer is shut
//! down and the window destroyed before the replacement pair is created, so
//! at most one window exists at any time. Camera and settings live in the
//! host and carry over unchanged.

pub mod config;
pub mod content;
pub mod input;
pub mod navigation;
pub mod settings;
pub mod touch;

#[cfg(test)]
mod tests;

pub use config::HostConfig;
pub use content::{ContentError, EmptyContent, FrameworkResources, SampleContent};
pub use input::{HostInput, LookControls};
pub use navigation::{MoveInput, NavigationState};
pub use settings::{PipelineKind, RuntimeSettings};

use crate::backend::{Backend, BackendError, CapabilityProfile, WindowHandle};
use crate::config::ConfigError;
use crate::foundation::time::{FrameRateCounter, Stopwatch};
use crate::input::Key;
use crate::renderer::{aspect_ratio, CameraHandle, EngineOption, InfoBox, Renderer, RendererError, ViewportSetup};
use content::HELP_ROWS;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Options applied to the engine after every successful init
const ENGINE_OPTIONS: [(EngineOption, f32); 5] = [
    (EngineOption::LoadTextures, 1.0),
    (EngineOption::TexCompression, 0.0),
    (EngineOption::MaxAnisotropy, 4.0),
    (EngineOption::ShadowMapSize, 2048.0),
    (EngineOption::FastAnimation, 1.0),
];

/// Host errors
#[derive(Error, Debug)]
pub enum HostError {
    /// No windowing system to run on
    #[error("windowing environment unavailable: {0}")]
    Environment(String),

    /// Both the preferred and the fallback profile were rejected
    #[error("no usable graphics context (tried {primary}, then {fallback})")]
    NoUsableProfile {
        /// Profile tried first
        primary: CapabilityProfile,
        /// Fallback profile tried second
        fallback: CapabilityProfile,
    },

    /// The renderer could not be initialized
    #[error(transparent)]
    Renderer(#[from] RendererError),

    /// Framework or content resources could not be set up
    #[error("unable to initialize resources: {0}")]
    Resources(#[from] ContentError),

    /// Any other backend failure
    #[error(transparent)]
    Backend(BackendError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<BackendError> for HostError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Environment(reason) => Self::Environment(reason),
            other => Self::Backend(other),
        }
    }
}

/// Lifecycle state of a [`Host`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Nothing created yet
    Uninitialized,
    /// Window, context and renderer are live
    Running,
    /// Tearing down and rebuilding after a settings change
    Reinitializing,
    /// Everything released; terminal
    Released,
}

/// Result of a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// Frames rendered
    pub frames: u64,
    /// Seconds from loop start to the last benchmark frame
    pub elapsed_secs: f64,
    /// `frames / elapsed_secs`
    pub average_fps: f64,
    /// Seconds the result was shown on screen
    pub observation_secs: f64,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Average FPS: {:.2}", self.average_fps)
    }
}

/// What [`Host::run`] did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Frames run by the render loop
    pub frames: u64,
    /// Benchmark result, in benchmark mode
    pub benchmark: Option<BenchmarkReport>,
}

/// Application driver
pub struct Host<B: Backend, R: Renderer, C: SampleContent = EmptyContent> {
    backend: B,
    renderer: R,
    content: C,
    config: HostConfig,
    input: HostInput,
    lifecycle: Lifecycle,
    window: Option<WindowHandle>,
    profile: Option<CapabilityProfile>,
    framework: Option<FrameworkResources>,
    windowed_size: (u32, u32),
    fps: f32,
}

impl<B: Backend, R: Renderer, C: SampleContent> Host<B, R, C> {
    /// Create a host; nothing is opened until [`Host::init`] or [`Host::run`]
    pub fn new(backend: B, renderer: R, content: C, config: HostConfig) -> Self {
        let controls = LookControls {
            sensitivity: config.camera.mouse_sensitivity,
            pinch_scale: config.camera.pinch_scale,
            invert_x: config.camera.invert_x,
            invert_y: config.camera.invert_y,
        };
        let input = HostInput::new(config.initial_navigation(), config.initial_settings(), controls);
        let windowed_size = (config.window.width, config.window.height);

        Self {
            backend,
            renderer,
            content,
            config,
            input,
            lifecycle: Lifecycle::Uninitialized,
            window: None,
            profile: None,
            framework: None,
            windowed_size,
            fps: crate::foundation::time::FPS_REFERENCE,
        }
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Profile of the live window
    pub fn profile(&self) -> Option<&CapabilityProfile> {
        self.profile.as_ref()
    }

    /// Handle of the live window
    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// Windows the backend currently has open
    pub fn live_windows(&self) -> usize {
        self.backend.live_windows()
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Framework resources of the live window
    pub fn framework(&self) -> Option<&FrameworkResources> {
        self.framework.as_ref()
    }

    /// Camera pose
    pub fn navigation(&self) -> &NavigationState {
        &self.input.nav
    }

    /// Camera pose, mutably
    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.input.nav
    }

    /// Runtime settings
    pub fn settings(&self) -> &RuntimeSettings {
        &self.input.settings
    }

    /// Runtime settings, mutably; attribute changes apply after the next frame
    pub fn settings_mut(&mut self) -> &mut RuntimeSettings {
        &mut self.input.settings
    }

    /// Input state
    pub fn input(&self) -> &HostInput {
        &self.input
    }

    /// Frame rate the last frame simulated with
    pub fn current_fps(&self) -> f32 {
        self.fps
    }

    /// Change the window title
    pub fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.config.window.title);
        if let Some(handle) = self.window {
            self.backend.set_window_title(handle, title);
        }
    }

    /// Show the cursor, or hide and capture it
    pub fn show_cursor(&mut self, visible: bool) {
        self.config.window.show_cursor = visible;
        if let Some(handle) = self.window {
            self.backend.set_cursor_visible(handle, visible);
        }
    }

    /// Negotiate a context, open the window and set up the renderer.
    ///
    /// On failure everything created so far is released and the host ends in
    /// [`Lifecycle::Released`].
    pub fn init(&mut self) -> Result<(), HostError> {
        if self.lifecycle == Lifecycle::Running {
            return Ok(());
        }

        if let Err(e) = self.open() {
            log::error!("host initialization failed: {e}");
            self.release();
            return Err(e);
        }
        Ok(())
    }

    /// Run the render loop until quit, or until the benchmark length is
    /// reached, then release everything
    pub fn run(&mut self) -> Result<RunSummary, HostError> {
        if self.lifecycle != Lifecycle::Running {
            self.init()?;
        }

        let benchmark = self.input.settings.benchmark();
        let benchmark_length = u64::from(self.input.settings.benchmark_length());
        let mut counter = FrameRateCounter::new(self.backend.time(), benchmark);
        self.input.set_running(true);
        log::info!("entering render loop{}", if benchmark { " (benchmark)" } else { "" });

        while self.input.is_running() {
            self.fps = counter.tick(self.backend.time());

            self.backend.process_events(&mut self.input);
            self.update();
            self.render();
            self.finalize();

            if self.input.is_running() && self.input.settings.take_dirty() {
                self.recreate()?;
                counter.restart_window(self.backend.time());
            }

            if benchmark && counter.total_frames() >= benchmark_length {
                break;
            }
        }

        let frames = counter.total_frames();
        let report = benchmark.then(|| self.finish_benchmark(&counter));
        self.release();
        log::info!("render loop finished after {frames} frame(s)");

        Ok(RunSummary {
            frames,
            benchmark: report,
        })
    }

    /// Tear the window and renderer down and build them again from the
    /// current settings
    pub fn recreate(&mut self) -> Result<(), HostError> {
        let settings = &self.input.settings;
        log::info!(
            "recreating window: {} pipeline, {} sample(s), fullscreen {}",
            settings.pipeline().label(),
            settings.sample_count(),
            settings.fullscreen()
        );

        self.lifecycle = Lifecycle::Reinitializing;
        self.teardown();

        if let Err(e) = self.open() {
            log::error!("window recreation failed: {e}");
            self.release();
            return Err(e);
        }
        Ok(())
    }

    /// Release renderer, window and backend. Safe to call in any state.
    pub fn release(&mut self) {
        if self.lifecycle == Lifecycle::Released {
            return;
        }
        self.teardown();
        self.backend.release();
        self.lifecycle = Lifecycle::Released;
        log::info!("host released");
    }

    fn open(&mut self) -> Result<(), HostError> {
        let profile = self.negotiate()?;
        self.start_renderer(&profile)?;
        self.lifecycle = Lifecycle::Running;
        log::info!("running with {profile} on {}", self.backend.name());
        Ok(())
    }

    fn negotiate(&mut self) -> Result<CapabilityProfile, HostError> {
        let primary = self.config.profile(self.input.settings.window_sample_count());
        let rejection = match self.open_window(&primary) {
            Ok(()) => return Ok(primary),
            Err(e) if e.is_negotiation_failure() => e,
            Err(e) => return Err(e.into()),
        };

        let fallback = primary.fallback();
        log::warn!("{rejection}; retrying with {fallback}");
        match self.open_window(&fallback) {
            Ok(()) => Ok(fallback),
            Err(e) if e.is_negotiation_failure() => {
                log::error!("fallback rejected as well: {e}");
                Err(HostError::NoUsableProfile { primary, fallback })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn open_window(&mut self, profile: &CapabilityProfile) -> Result<(), BackendError> {
        self.backend.init(profile)?;

        let spec = self
            .config
            .window_spec(self.windowed_size, self.input.settings.fullscreen());
        let handle = self.backend.create_window(&spec)?;

        let size = self.backend.window_size(handle).unwrap_or((spec.width, spec.height));
        self.backend.set_cursor_visible(handle, self.config.window.show_cursor);
        self.input.attach_window(size);
        self.window = Some(handle);
        self.profile = Some(*profile);
        Ok(())
    }

    fn start_renderer(&mut self, profile: &CapabilityProfile) -> Result<(), HostError> {
        if let Err(e) = self.renderer.init(profile.api) {
            self.renderer.dump_messages();
            return Err(e.into());
        }
        self.apply_engine_options();

        let framework = FrameworkResources::register(&mut self.renderer, self.input.settings.pipeline())
            .map_err(ContentError::from)?;
        self.framework = Some(framework);

        self.content.init_resources(&mut self.renderer, &framework)?;
        self.renderer
            .load_resources(&self.config.render.content_dir)
            .map_err(ContentError::from)?;

        self.resize_viewport(self.input.window_size());
        self.renderer.dump_messages();
        Ok(())
    }

    fn apply_engine_options(&mut self) {
        let diagnostics = if self.config.context.debug_context { 1.0 } else { 0.0 };
        let options = ENGINE_OPTIONS.into_iter().chain([
            (EngineOption::SampleCount, self.input.settings.sample_count() as f32),
            (EngineOption::DumpFailedShaders, diagnostics),
        ]);
        for (option, value) in options {
            if !self.renderer.set_option(option, value) {
                log::warn!("engine rejected {option:?} = {value}");
            }
        }
    }

    fn teardown(&mut self) {
        if self.framework.take().is_some() {
            self.content.release_resources();
        }
        self.renderer.shutdown();
        if let Some(handle) = self.window.take() {
            self.backend.destroy_window(handle);
        }
        self.profile = None;
    }

    fn resize_viewport(&mut self, (width, height): (u32, u32)) {
        let Some(framework) = self.framework else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }

        let render = &self.config.render;
        let viewport = ViewportSetup {
            width,
            height,
            fov: render.fov,
            near: render.near_plane,
            far: render.far_plane,
        };
        self.renderer.setup_viewport(framework.camera, &viewport);
        for pipeline in framework.pipelines.all() {
            self.renderer.resize_pipeline_buffers(pipeline, width, height);
        }
    }

    fn aspect(&self, camera: CameraHandle) -> f32 {
        let (width, height) = self.renderer.viewport_size(camera);
        aspect_ratio(width, height)
    }

    fn update(&mut self) {
        if let Some(size) = self.input.take_resize() {
            if !self.input.settings.fullscreen() {
                self.windowed_size = size;
            }
            self.resize_viewport(size);
        }

        let Some(handle) = self.window else {
            return;
        };
        let movement = if self.input.settings.camera_locked() {
            MoveInput::default()
        } else {
            let held = |key| self.backend.check_key_down(handle, key);
            MoveInput {
                forward: held(Key::W),
                backward: held(Key::S),
                left: held(Key::A),
                right: held(Key::D),
                sprint: held(Key::LeftShift),
            }
        };
        self.input.nav.advance(movement, self.fps);
    }

    fn render(&mut self) {
        let Some(framework) = self.framework else {
            return;
        };
        let aspect = self.aspect(framework.camera);
        let settings = &self.input.settings;
        let nav = &self.input.nav;
        let overlays = &framework.overlays;
        let flag = |enabled: bool| if enabled { 1.0 } else { 0.0 };

        self.renderer
            .set_camera_pipeline(framework.camera, framework.pipelines.get(settings.pipeline()));
        self.renderer
            .set_camera_transform(framework.camera, nav.position, nav.pitch, nav.yaw);
        self.renderer.set_option(EngineOption::DebugViewMode, flag(settings.debug_view()));
        self.renderer.set_option(EngineOption::WireframeMode, flag(settings.wireframe()));

        self.renderer.show_frame_stats(overlays, settings.stat_mode());
        if settings.stat_mode() > 0 {
            let text = format!("Pipeline: {}", settings.pipeline().label());
            self.renderer.show_text(&text, 0.03, 0.23, 0.026, overlays);
        }

        if settings.show_help() {
            let help = InfoBox {
                x: aspect - 0.48,
                y: 0.03,
                width: 0.45,
                title: "Help",
                rows: &HELP_ROWS,
            };
            self.renderer.show_info_box(&help, overlays);
        }

        let logo = [
            [aspect - 0.29, 0.87, 0.0, 1.0],
            [aspect - 0.29, 0.97, 0.0, 0.0],
            [aspect - 0.03, 0.97, 1.0, 0.0],
            [aspect - 0.03, 0.87, 1.0, 1.0],
        ];
        self.renderer.show_overlay(&logo, overlays.logo);

        self.renderer.render(framework.camera);
    }

    fn finalize(&mut self) {
        self.renderer.finalize_frame();
        self.renderer.clear_overlays();
        self.renderer.dump_messages();
        if let Some(handle) = self.window {
            self.backend.swap_buffers(handle);
        }
    }

    /// Compute the benchmark result and keep it on screen for the
    /// observation window
    fn finish_benchmark(&mut self, counter: &FrameRateCounter) -> BenchmarkReport {
        let now = self.backend.time();
        let frames = counter.total_frames();
        let average_fps = counter.average_fps(now);
        let elapsed_secs = now - counter.run_start();
        let value = format!("{average_fps:.2}");
        log::info!("benchmark: {frames} frames in {elapsed_secs:.3} s, average FPS {value}");

        let observation = Stopwatch::start_at(now);
        let observation_window = self.config.benchmark.observation_secs;
        while self.input.is_running() && !observation.has_elapsed(self.backend.time(), observation_window) {
            self.backend.process_events(&mut self.input);
            if let Some(framework) = self.framework {
                let aspect = self.aspect(framework.camera);
                let rows = [("Average FPS:", value.as_str())];
                let info = InfoBox {
                    x: (aspect - 0.32) * 0.5,
                    y: 0.03,
                    width: 0.32,
                    title: "Benchmark",
                    rows: &rows,
                };
                self.renderer.show_info_box(&info, &framework.overlays);
            }
            self.render();
            self.finalize();
        }

        BenchmarkReport {
            frames,
            elapsed_secs,
            average_fps,
            observation_secs: observation.elapsed_secs(self.backend.time()),
        }
    }
}

impl<B: Backend, R: Renderer, C: SampleContent> Drop for Host<B, R, C> {
    fn drop(&mut self) {
        self.release();
    }
}
