//! Framework resources and the sample content hook

use super::settings::PipelineKind;
use crate::renderer::{
    CameraHandle, OverlayMaterials, Renderer, RendererError, ResourceHandle, ResourceKind,
};
use thiserror::Error;

/// Rows of the help panel
pub const HELP_ROWS: [(&str, &str); 11] = [
    ("F1:", "Help (ON/OFF)"),
    ("F2:", "Stats (...)"),
    ("F3:", "Pipeline (...)"),
    ("F4:", "Debug (ON/OFF)"),
    ("F5:", "Wireframe (ON/OFF)"),
    ("F6:", "Multisampling (...)"),
    ("F11:", "Fullscreen (ON/OFF)"),
    ("Esc:", "Exit"),
    ("Space:", "Freeze (...)"),
    ("W/A/S/D:", "Movement"),
    ("LShift:", "Turbo"),
];

/// Errors raised by sample content
#[derive(Error, Debug)]
pub enum ContentError {
    /// A renderer call made by the content failed
    #[error(transparent)]
    Renderer(#[from] RendererError),

    /// The content rejected its own setup
    #[error("content setup failed: {0}")]
    Setup(String),
}

/// Pipeline resources, one per [`PipelineKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResources {
    /// Forward pipeline
    pub forward: ResourceHandle,
    /// Deferred pipeline
    pub deferred: ResourceHandle,
    /// HDR pipeline
    pub hdr: ResourceHandle,
}

impl PipelineResources {
    /// Resource for a pipeline kind
    pub fn get(&self, kind: PipelineKind) -> ResourceHandle {
        match kind {
            PipelineKind::Forward => self.forward,
            PipelineKind::Deferred => self.deferred,
            PipelineKind::Hdr => self.hdr,
        }
    }

    /// Every pipeline resource
    pub fn all(&self) -> [ResourceHandle; 3] {
        [self.forward, self.deferred, self.hdr]
    }
}

/// Resources the host itself needs for every window: the three pipelines,
/// the overlay materials and the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkResources {
    /// Pipelines
    pub pipelines: PipelineResources,
    /// Overlay materials
    pub overlays: OverlayMaterials,
    /// Camera bound to the active pipeline
    pub camera: CameraHandle,
}

impl FrameworkResources {
    /// Register the framework resources and create the camera for `active`
    pub fn register(renderer: &mut dyn Renderer, active: PipelineKind) -> Result<Self, RendererError> {
        let mut pipeline = |kind: PipelineKind| renderer.add_resource(ResourceKind::Pipeline, kind.resource_name());
        let pipelines = PipelineResources {
            forward: pipeline(PipelineKind::Forward)?,
            deferred: pipeline(PipelineKind::Deferred)?,
            hdr: pipeline(PipelineKind::Hdr)?,
        };

        let overlays = OverlayMaterials {
            font: renderer.add_resource(ResourceKind::Material, "overlays/font.material.xml")?,
            panel: renderer.add_resource(ResourceKind::Material, "overlays/panel.material.xml")?,
            logo: renderer.add_resource(ResourceKind::Material, "overlays/logo.material.xml")?,
        };

        let camera = renderer.add_camera("Camera", pipelines.get(active))?;

        Ok(Self {
            pipelines,
            overlays,
            camera,
        })
    }
}

/// Scene content plugged into the host
///
/// `init_resources` runs once per window, after the framework resources are
/// registered and before everything is loaded from the content directory.
/// `release_resources` runs before the renderer shuts down.
pub trait SampleContent {
    /// Register the content's own resources and scene nodes
    fn init_resources(&mut self, renderer: &mut dyn Renderer, framework: &FrameworkResources) -> Result<(), ContentError>;

    /// Drop anything held from `init_resources`
    fn release_resources(&mut self) {}
}

/// Content that adds nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContent;

impl SampleContent for EmptyContent {
    fn init_resources(&mut self, _renderer: &mut dyn Renderer, _framework: &FrameworkResources) -> Result<(), ContentError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RenderApi;
    use crate::renderer::HeadlessRenderer;

    #[test]
    fn test_register_binds_camera_to_active_pipeline() {
        let mut renderer = HeadlessRenderer::new();
        renderer.init(RenderApi::OpenGl4).unwrap();
        let framework = FrameworkResources::register(&mut renderer, PipelineKind::Hdr).unwrap();

        let camera = renderer.camera(framework.camera).unwrap();
        assert_eq!(camera.pipeline, framework.pipelines.hdr);
        assert_eq!(renderer.resources().len(), 6);
    }

    #[test]
    fn test_register_needs_initialized_renderer() {
        let mut renderer = HeadlessRenderer::new();
        assert!(FrameworkResources::register(&mut renderer, PipelineKind::Forward).is_err());
    }
}
