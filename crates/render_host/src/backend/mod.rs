//! Window and graphics-context backends
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Host                        │ ← owns one backend, holds WindowHandle tokens
//! └─────────────┬───────────────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ Backend trait   │ ← this module
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ glfw_backend          │ ← lightweight desktop windowing
//!   │ winit_backend         │ ← winit + glutin, touch and gestures
//!   └───────────────────────┘
//! ```
//!
//! Backends own every native window and context they create. The host only
//! ever sees a [`WindowHandle`], a generational key into the backend's window
//! arena; native callbacks and event queues are routed back to the owning
//! window slot through that key rather than through process-wide state.

pub mod profile;

#[cfg(feature = "glfw-backend")]
pub mod glfw_backend;

#[cfg(feature = "winit-backend")]
pub mod winit_backend;

pub use profile::{CapabilityProfile, RenderApi, WindowSpec};

use crate::events::EventSink;
use crate::input::Key;
use serde::{Deserialize, Serialize};
use thiserror::Error;

slotmap::new_key_type! {
    /// Opaque token for a window owned by a backend
    pub struct WindowHandle;
}

/// Backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// The windowing subsystem itself could not start
    #[error("windowing subsystem unavailable: {0}")]
    Environment(String),

    /// The profile is malformed
    #[error("invalid capability profile: {0}")]
    InvalidProfile(String),

    /// The window could not be created with the requested profile
    #[error("unable to create window for {profile}: {reason}")]
    WindowCreation {
        /// Profile the window was requested with
        profile: CapabilityProfile,
        /// What the platform reported
        reason: String,
    },

    /// A context was created but could not be made usable
    #[error("graphics context failure: {0}")]
    Context(String),

    /// `create_window` called before a successful `init`
    #[error("backend not initialized")]
    NotInitialized,

    /// Handle does not name a live window of this backend
    #[error("unknown window handle")]
    UnknownWindow,

    /// The requested backend was not compiled in
    #[error("backend '{0}' is not available in this build")]
    Unavailable(&'static str),
}

impl BackendError {
    /// Whether the error means "this profile is not satisfiable here", which
    /// the host answers with its single fallback attempt
    pub fn is_negotiation_failure(&self) -> bool {
        matches!(self, Self::WindowCreation { .. } | Self::Context(_))
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// What a backend can deliver beyond the common surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCapabilities {
    /// Calls `on_touch`
    pub touch: bool,
    /// Calls `on_multi_touch`
    pub multi_touch: bool,
    /// Can create OpenGL ES contexts
    pub embedded_api: bool,
}

/// Which backend implementation to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GLFW desktop windowing
    #[default]
    Glfw,
    /// winit + glutin
    Winit,
}

/// Window/context backend
///
/// All methods run on the thread that owns the graphics context. Methods
/// taking a [`WindowHandle`] ignore handles that do not name a live window.
pub trait Backend {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Optional capabilities of this backend
    fn capabilities(&self) -> BackendCapabilities;

    /// Start the windowing subsystem (first call) and record the surface and
    /// context hints for the next window. Does not create a window.
    ///
    /// Fails with [`BackendError::Environment`] when no windowing system is
    /// available and [`BackendError::InvalidProfile`] for malformed profiles.
    fn init(&mut self, profile: &CapabilityProfile) -> BackendResult<()>;

    /// Tear the whole subsystem down, destroying any remaining windows.
    /// Safe to call when no window was ever created, and more than once.
    fn release(&mut self);

    /// Create a window with a current context for the last `init` profile.
    ///
    /// Either a live window with a working context is returned, or nothing:
    /// a window whose context failed is destroyed before the error returns.
    fn create_window(&mut self, spec: &WindowSpec) -> BackendResult<WindowHandle>;

    /// Destroy a window and its context; `false` if the handle was not live
    fn destroy_window(&mut self, handle: WindowHandle) -> bool;

    /// Number of windows currently alive
    fn live_windows(&self) -> usize;

    /// Drain the native event queue without blocking, delivering each event
    /// to `sink` in queue order (cursor motion coalesced per pump)
    fn process_events(&mut self, sink: &mut dyn EventSink);

    /// Present the current frame; may block for vsync per the swap interval
    fn swap_buffers(&mut self, handle: WindowHandle);

    /// Client size in pixels
    fn window_size(&self, handle: WindowHandle) -> Option<(u32, u32)>;

    /// Change the title bar text
    fn set_window_title(&mut self, handle: WindowHandle, title: &str);

    /// Show the cursor, or hide and capture it for mouse look
    fn set_cursor_visible(&mut self, handle: WindowHandle, visible: bool);

    /// Polled key state, for "held" semantics
    fn check_key_down(&self, handle: WindowHandle, key: Key) -> bool;

    /// Seconds on the backend's monotonic clock
    fn time(&self) -> f64;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capabilities(&self) -> BackendCapabilities {
        (**self).capabilities()
    }

    fn init(&mut self, profile: &CapabilityProfile) -> BackendResult<()> {
        (**self).init(profile)
    }

    fn release(&mut self) {
        (**self).release();
    }

    fn create_window(&mut self, spec: &WindowSpec) -> BackendResult<WindowHandle> {
        (**self).create_window(spec)
    }

    fn destroy_window(&mut self, handle: WindowHandle) -> bool {
        (**self).destroy_window(handle)
    }

    fn live_windows(&self) -> usize {
        (**self).live_windows()
    }

    fn process_events(&mut self, sink: &mut dyn EventSink) {
        (**self).process_events(sink);
    }

    fn swap_buffers(&mut self, handle: WindowHandle) {
        (**self).swap_buffers(handle);
    }

    fn window_size(&self, handle: WindowHandle) -> Option<(u32, u32)> {
        (**self).window_size(handle)
    }

    fn set_window_title(&mut self, handle: WindowHandle, title: &str) {
        (**self).set_window_title(handle, title);
    }

    fn set_cursor_visible(&mut self, handle: WindowHandle, visible: bool) {
        (**self).set_cursor_visible(handle, visible);
    }

    fn check_key_down(&self, handle: WindowHandle, key: Key) -> bool {
        (**self).check_key_down(handle, key)
    }

    fn time(&self) -> f64 {
        (**self).time()
    }
}

/// Construct the backend selected by `kind`
pub fn create(kind: BackendKind) -> BackendResult<Box<dyn Backend>> {
    match kind {
        #[cfg(feature = "glfw-backend")]
        BackendKind::Glfw => Ok(Box::new(glfw_backend::GlfwBackend::new())),
        #[cfg(not(feature = "glfw-backend"))]
        BackendKind::Glfw => Err(BackendError::Unavailable("glfw")),

        #[cfg(feature = "winit-backend")]
        BackendKind::Winit => Ok(Box::new(winit_backend::WinitBackend::new())),
        #[cfg(not(feature = "winit-backend"))]
        BackendKind::Winit => Err(BackendError::Unavailable("winit")),
    }
}

/// Log the rejected profile in full, for negotiation failures
pub(crate) fn log_rejected_profile(backend: &str, profile: &CapabilityProfile, reason: &str) {
    log::warn!("[{backend}] unable to initialize window: {reason}");
    log::warn!("[{backend}] context: {} {}.{}", profile.api.label(), profile.major, profile.minor);
    if profile.api == RenderApi::OpenGl4 {
        log::warn!("[{backend}] compatibility profile: {}", profile.compatibility_profile);
    }
    log::warn!(
        "[{backend}] surface bits: r {} g {} b {} a {} depth {}, samples {}",
        profile.red_bits,
        profile.green_bits,
        profile.blue_bits,
        profile.alpha_bits,
        profile.depth_bits,
        profile.sample_count
    );
}
