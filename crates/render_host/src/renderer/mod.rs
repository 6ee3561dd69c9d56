//! # Renderer Boundary
//!
//! The rendering engine is an external collaborator reached through a narrow,
//! function-call style surface. The host drives it; it never looks inside.
//!
//! ## Frame protocol
//!
//! Per frame the host issues, in order:
//! - camera transform and per-frame options,
//! - overlays (frame stats, text, info boxes, logo),
//! - [`Renderer::render`] for the active camera,
//! - [`Renderer::finalize_frame`], [`Renderer::clear_overlays`] and
//!   [`Renderer::dump_messages`], after which the backend presents.
//!
//! ## Lifetime
//!
//! [`Renderer::init`] binds the engine to the context that is current on the
//! calling thread. [`Renderer::shutdown`] releases every resource and camera;
//! handles obtained before a shutdown are meaningless afterwards.

pub mod headless;

pub use headless::HeadlessRenderer;

use crate::backend::RenderApi;
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Renderer boundary errors
#[derive(Error, Debug)]
pub enum RendererError {
    /// The engine refused to initialize against the current context
    #[error("renderer initialization failed: {0}")]
    InitFailed(String),

    /// One or more resources could not be loaded
    #[error("resource loading failed: {0}")]
    ResourceLoad(String),

    /// Called before `init` or after `shutdown`
    #[error("renderer not initialized")]
    NotInitialized,
}

/// Result type for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;

/// Engine-side resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceHandle(pub u32);

/// Engine-side camera node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraHandle(pub u32);

/// Resource categories the host registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Render pipeline description
    Pipeline,
    /// Material (overlays use these)
    Material,
    /// Scene graph file
    SceneGraph,
    /// Geometry data
    Geometry,
    /// Animation data
    Animation,
    /// Texture
    Texture,
}

/// Engine options set through [`Renderer::set_option`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineOption {
    /// Load textures (1) or skip them (0)
    LoadTextures,
    /// Compress textures on upload
    TexCompression,
    /// Maximum anisotropic filtering level
    MaxAnisotropy,
    /// Shadow map resolution
    ShadowMapSize,
    /// Skip animation interpolation
    FastAnimation,
    /// Multisample count for render targets
    SampleCount,
    /// Write failed shader sources to disk
    DumpFailedShaders,
    /// Debug visualization instead of the pipeline output
    DebugViewMode,
    /// Render geometry as wireframe
    WireframeMode,
}

/// Materials used to draw the host's overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayMaterials {
    /// Font material for text
    pub font: ResourceHandle,
    /// Panel background material
    pub panel: ResourceHandle,
    /// Logo material
    pub logo: ResourceHandle,
}

/// A titled table of label/value rows drawn on a panel
///
/// Positions are in overlay space: y from 0 (top) to 1 (bottom), x from 0 to
/// the viewport aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfoBox<'a> {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Panel width
    pub width: f32,
    /// Title line
    pub title: &'a str,
    /// `(label, value)` rows
    pub rows: &'a [(&'a str, &'a str)],
}

/// Projection parameters for a camera viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSetup {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

/// Width over height in overlay units; 1 for degenerate viewports
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// # Renderer Trait
///
/// The function-call surface of the rendering engine as seen by the host.
/// Implementations must be driven from the thread that owns the graphics
/// context the host negotiated.
pub trait Renderer {
    /// Initialize the engine against the current context
    ///
    /// # Arguments
    /// * `api` - API family of the context the backend negotiated
    fn init(&mut self, api: RenderApi) -> RendererResult<()>;

    /// Release the engine and everything it owns. Safe to call repeatedly.
    fn shutdown(&mut self);

    /// Set an engine option; `false` if the engine rejected the value
    fn set_option(&mut self, option: EngineOption, value: f32) -> bool;

    /// Current value of an engine option
    fn option(&self, option: EngineOption) -> f32;

    /// Register a resource by name without loading it
    fn add_resource(&mut self, kind: ResourceKind, name: &str) -> RendererResult<ResourceHandle>;

    /// Load all registered but unloaded resources from `content_dir`
    fn load_resources(&mut self, content_dir: &Path) -> RendererResult<()>;

    /// Create a camera that renders through `pipeline`
    fn add_camera(&mut self, name: &str, pipeline: ResourceHandle) -> RendererResult<CameraHandle>;

    /// Switch the pipeline a camera renders through
    fn set_camera_pipeline(&mut self, camera: CameraHandle, pipeline: ResourceHandle);

    /// Place the camera
    ///
    /// # Arguments
    /// * `position` - World-space position
    /// * `pitch` - Rotation about X in degrees
    /// * `yaw` - Rotation about Y in degrees
    fn set_camera_transform(&mut self, camera: CameraHandle, position: Vec3, pitch: f32, yaw: f32);

    /// Set the camera viewport and projection
    fn setup_viewport(&mut self, camera: CameraHandle, viewport: &ViewportSetup);

    /// Current viewport size of a camera in pixels
    fn viewport_size(&self, camera: CameraHandle) -> (u32, u32);

    /// Resize a pipeline's render targets
    fn resize_pipeline_buffers(&mut self, pipeline: ResourceHandle, width: u32, height: u32);

    /// Draw the frame statistics panel; `mode` 0 shows only the frame rate
    fn show_frame_stats(&mut self, materials: &OverlayMaterials, mode: u32);

    /// Draw a line of text
    fn show_text(&mut self, text: &str, x: f32, y: f32, size: f32, materials: &OverlayMaterials);

    /// Draw an info box
    fn show_info_box(&mut self, info: &InfoBox<'_>, materials: &OverlayMaterials);

    /// Draw a textured quad; `corners` holds `[x, y, u, v]` per corner
    fn show_overlay(&mut self, corners: &[[f32; 4]; 4], material: ResourceHandle);

    /// Render the scene through `camera`
    fn render(&mut self, camera: CameraHandle);

    /// Finish the frame
    fn finalize_frame(&mut self);

    /// Drop all overlays issued this frame
    fn clear_overlays(&mut self);

    /// Flush engine diagnostics to the log; `false` if nothing was pending
    fn dump_messages(&mut self) -> bool;
}
