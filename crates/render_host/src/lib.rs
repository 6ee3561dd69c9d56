//! # Render Host
//!
//! The application layer between a rendering engine and native windowing.
//!
//! ## Features
//!
//! - **Context negotiation**: preferred graphics profile with one legacy fallback
//! - **Window recreation**: pipeline, multisample and fullscreen changes rebuild window and renderer
//! - **Two backends**: GLFW, and winit + glutin with touch support
//! - **Normalized input**: one key/button vocabulary and an [`events::EventSink`] for every backend
//! - **Frame loop**: frame-rate-normalized free-fly camera, benchmark mode with an average-FPS report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_host::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     render_host::foundation::logging::init();
//!
//!     let config = HostConfig::load_or_default("host.toml")?;
//!     let backend = render_host::backend::create(config.backend)?;
//!     let mut host = Host::new(backend, HeadlessRenderer::new(), EmptyContent, config);
//!     let summary = host.run()?;
//!     println!("{} frames", summary.frames);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backend;
pub mod config;
pub mod events;
pub mod foundation;
pub mod host;
pub mod input;
pub mod renderer;

/// Common imports for host users
pub mod prelude {
    pub use crate::{
        backend::{Backend, BackendKind, CapabilityProfile, RenderApi, WindowHandle, WindowSpec},
        config::Config,
        events::{EventSink, InputEvent, TouchPhase},
        foundation::math::{Vec2, Vec3},
        host::{
            BenchmarkReport, EmptyContent, FrameworkResources, Host, HostConfig, HostError, Lifecycle,
            NavigationState, PipelineKind, RunSummary, RuntimeSettings, SampleContent,
        },
        input::{Key, KeyAction, Modifiers, MouseButton},
        renderer::{HeadlessRenderer, Renderer},
    };
}
