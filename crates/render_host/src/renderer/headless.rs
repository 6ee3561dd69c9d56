//! Headless renderer
//!
//! Keeps the engine-side state the host can observe (options, resources,
//! cameras, overlay traffic) without drawing anything. Useful for running the
//! host against a real window when no engine is linked in, and for tests.

use super::{
    CameraHandle, EngineOption, InfoBox, OverlayMaterials, Renderer, RendererError, RendererResult, ResourceHandle,
    ResourceKind, ViewportSetup,
};
use crate::backend::RenderApi;
use crate::foundation::math::Vec3;
use std::collections::HashMap;
use std::path::Path;

/// A registered resource
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessResource {
    /// Resource category
    pub kind: ResourceKind,
    /// Registered name
    pub name: String,
    /// Whether `load_resources` has processed it
    pub loaded: bool,
}

/// A camera node
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessCamera {
    /// Node name
    pub name: String,
    /// Pipeline it renders through
    pub pipeline: ResourceHandle,
    /// Last position set
    pub position: Vec3,
    /// Last pitch set, in degrees
    pub pitch: f32,
    /// Last yaw set, in degrees
    pub yaw: f32,
    /// Last viewport setup
    pub viewport: Option<ViewportSetup>,
}

/// Counters for what the host asked the renderer to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Successful `init` calls
    pub inits: u32,
    /// `shutdown` calls that released an initialized engine
    pub shutdowns: u32,
    /// `render` calls
    pub frames_rendered: u64,
    /// `finalize_frame` calls
    pub frames_finalized: u64,
    /// Info box titles, in the order drawn (cleared with the overlays)
    pub info_boxes: Vec<String>,
    /// Info boxes drawn since creation
    pub info_boxes_drawn: u64,
    /// Title of the most recent info box, kept across frames
    pub last_info_box: Option<String>,
    /// Text lines drawn this frame (cleared with the overlays)
    pub texts: Vec<String>,
    /// Textured quads drawn this frame (cleared with the overlays)
    pub overlays: u32,
    /// Pipeline buffer resizes, most recent last
    pub pipeline_resizes: Vec<(ResourceHandle, u32, u32)>,
}

/// Renderer that records instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    api: Option<RenderApi>,
    options: HashMap<EngineOption, f32>,
    resources: Vec<HeadlessResource>,
    cameras: Vec<HeadlessCamera>,
    messages: Vec<String>,
    stats: HeadlessStats,
    fail_init: bool,
    fail_load: bool,
}

impl HeadlessRenderer {
    /// Create a renderer that succeeds at everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `init` call fail
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make every `load_resources` call fail
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// API of the context the engine was initialized for
    pub fn api(&self) -> Option<RenderApi> {
        self.api
    }

    /// Whether `init` succeeded and `shutdown` has not run since
    pub fn is_initialized(&self) -> bool {
        self.api.is_some()
    }

    /// Counters so far
    pub fn stats(&self) -> &HeadlessStats {
        &self.stats
    }

    /// Registered resources
    pub fn resources(&self) -> &[HeadlessResource] {
        &self.resources
    }

    /// Look a camera up
    pub fn camera(&self, camera: CameraHandle) -> Option<&HeadlessCamera> {
        self.cameras.get(camera.0.checked_sub(1)? as usize)
    }

    fn camera_mut(&mut self, camera: CameraHandle) -> Option<&mut HeadlessCamera> {
        self.cameras.get_mut(camera.0.checked_sub(1)? as usize)
    }

    fn default_option(option: EngineOption) -> f32 {
        match option {
            EngineOption::LoadTextures => 1.0,
            EngineOption::MaxAnisotropy => 1.0,
            EngineOption::ShadowMapSize => 1024.0,
            EngineOption::FastAnimation => 1.0,
            _ => 0.0,
        }
    }

    fn option_accepts(option: EngineOption, value: f32) -> bool {
        match option {
            EngineOption::MaxAnisotropy => (1.0..=16.0).contains(&value),
            EngineOption::ShadowMapSize => [128.0, 256.0, 512.0, 1024.0, 2048.0, 4096.0].contains(&value),
            EngineOption::SampleCount => (0.0..=32.0).contains(&value),
            _ => value == 0.0 || value == 1.0,
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn init(&mut self, api: RenderApi) -> RendererResult<()> {
        if self.fail_init {
            self.messages.push(format!("engine rejected {} context", api.label()));
            return Err(RendererError::InitFailed(format!("{} context unsupported", api.label())));
        }
        self.api = Some(api);
        self.options.clear();
        self.stats.inits += 1;
        self.messages.push(format!("initialized for {}", api.label()));
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.api.take().is_some() {
            self.resources.clear();
            self.cameras.clear();
            self.stats.shutdowns += 1;
            log::debug!("headless renderer released");
        }
    }

    fn set_option(&mut self, option: EngineOption, value: f32) -> bool {
        if self.api.is_none() || !Self::option_accepts(option, value) {
            self.messages.push(format!("option {option:?} rejected value {value}"));
            return false;
        }
        self.options.insert(option, value);
        true
    }

    fn option(&self, option: EngineOption) -> f32 {
        self.options
            .get(&option)
            .copied()
            .unwrap_or_else(|| Self::default_option(option))
    }

    fn add_resource(&mut self, kind: ResourceKind, name: &str) -> RendererResult<ResourceHandle> {
        if self.api.is_none() {
            return Err(RendererError::NotInitialized);
        }
        if let Some(index) = self.resources.iter().position(|r| r.kind == kind && r.name == name) {
            return Ok(ResourceHandle(index as u32 + 1));
        }
        self.resources.push(HeadlessResource {
            kind,
            name: name.to_string(),
            loaded: false,
        });
        Ok(ResourceHandle(self.resources.len() as u32))
    }

    fn load_resources(&mut self, content_dir: &Path) -> RendererResult<()> {
        if self.api.is_none() {
            return Err(RendererError::NotInitialized);
        }
        if self.fail_load {
            return Err(RendererError::ResourceLoad(format!(
                "could not read content from {}",
                content_dir.display()
            )));
        }
        let mut loaded = 0;
        for resource in self.resources.iter_mut().filter(|r| !r.loaded) {
            resource.loaded = true;
            loaded += 1;
        }
        self.messages
            .push(format!("loaded {loaded} resource(s) from {}", content_dir.display()));
        Ok(())
    }

    fn add_camera(&mut self, name: &str, pipeline: ResourceHandle) -> RendererResult<CameraHandle> {
        if self.api.is_none() {
            return Err(RendererError::NotInitialized);
        }
        self.cameras.push(HeadlessCamera {
            name: name.to_string(),
            pipeline,
            position: Vec3::zeros(),
            pitch: 0.0,
            yaw: 0.0,
            viewport: None,
        });
        Ok(CameraHandle(self.cameras.len() as u32))
    }

    fn set_camera_pipeline(&mut self, camera: CameraHandle, pipeline: ResourceHandle) {
        if let Some(camera) = self.camera_mut(camera) {
            camera.pipeline = pipeline;
        }
    }

    fn set_camera_transform(&mut self, camera: CameraHandle, position: Vec3, pitch: f32, yaw: f32) {
        if let Some(camera) = self.camera_mut(camera) {
            camera.position = position;
            camera.pitch = pitch;
            camera.yaw = yaw;
        }
    }

    fn setup_viewport(&mut self, camera: CameraHandle, viewport: &ViewportSetup) {
        if let Some(camera) = self.camera_mut(camera) {
            camera.viewport = Some(*viewport);
        }
    }

    fn viewport_size(&self, camera: CameraHandle) -> (u32, u32) {
        self.camera(camera)
            .and_then(|camera| camera.viewport)
            .map_or((0, 0), |viewport| (viewport.width, viewport.height))
    }

    fn resize_pipeline_buffers(&mut self, pipeline: ResourceHandle, width: u32, height: u32) {
        self.stats.pipeline_resizes.push((pipeline, width, height));
    }

    fn show_frame_stats(&mut self, _materials: &OverlayMaterials, mode: u32) {
        if mode > 0 {
            self.stats.overlays += 1;
        }
    }

    fn show_text(&mut self, text: &str, _x: f32, _y: f32, _size: f32, _materials: &OverlayMaterials) {
        self.stats.texts.push(text.to_string());
    }

    fn show_info_box(&mut self, info: &InfoBox<'_>, _materials: &OverlayMaterials) {
        self.stats.info_boxes.push(info.title.to_string());
        self.stats.info_boxes_drawn += 1;
        self.stats.last_info_box = Some(info.title.to_string());
    }

    fn show_overlay(&mut self, _corners: &[[f32; 4]; 4], _material: ResourceHandle) {
        self.stats.overlays += 1;
    }

    fn render(&mut self, _camera: CameraHandle) {
        self.stats.frames_rendered += 1;
    }

    fn finalize_frame(&mut self) {
        self.stats.frames_finalized += 1;
    }

    fn clear_overlays(&mut self) {
        self.stats.texts.clear();
        self.stats.info_boxes.clear();
        self.stats.overlays = 0;
    }

    fn dump_messages(&mut self) -> bool {
        if self.messages.is_empty() {
            return false;
        }
        for message in self.messages.drain(..) {
            log::debug!("[engine] {message}");
        }
        true
    }
}
