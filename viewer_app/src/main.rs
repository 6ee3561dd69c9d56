//! Scene viewer
//!
//! Opens a window through the configured backend and flies a camera around
//! the viewer scene. `--benchmark` renders a fixed number of frames at the
//! reference rate and reports the average frame rate.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use render_host::host::ContentError;
use render_host::prelude::*;
use render_host::renderer::{ResourceHandle, ResourceKind};

#[derive(Parser, Debug)]
/// Command line arguments
struct ViewerArgs {
    #[arg(short = 'b', long, visible_alias = "bm")]
    /// Render a fixed number of frames and report the average frame rate
    benchmark: bool,

    #[arg(long, default_value = "host.toml")]
    /// Configuration file (.toml or .ron); defaults apply when missing
    config: PathBuf,

    #[arg(long, value_enum)]
    /// Override the configured backend
    backend: Option<BackendArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Glfw,
    Winit,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Glfw => Self::Glfw,
            BackendArg::Winit => Self::Winit,
        }
    }
}

/// The viewer scene: a character model on a ground plane
#[derive(Default)]
struct ViewerScene {
    resources: Vec<ResourceHandle>,
}

impl SampleContent for ViewerScene {
    fn init_resources(&mut self, renderer: &mut dyn Renderer, _framework: &FrameworkResources) -> Result<(), ContentError> {
        for (kind, name) in [
            (ResourceKind::SceneGraph, "models/platform/platform.scene.xml"),
            (ResourceKind::SceneGraph, "models/knight/knight.scene.xml"),
            (ResourceKind::Animation, "animations/knight_order.anim"),
        ] {
            self.resources.push(renderer.add_resource(kind, name)?);
        }
        Ok(())
    }

    fn release_resources(&mut self) {
        self.resources.clear();
    }
}

fn run(args: ViewerArgs) -> Result<(), Box<dyn Error>> {
    let mut config = HostConfig::load_or_default(&args.config)?;
    if args.benchmark {
        config.benchmark.enabled = true;
    }
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }

    log::info!("Starting viewer with the {:?} backend", config.backend);
    let backend = render_host::backend::create(config.backend)?;
    let mut host = Host::new(backend, HeadlessRenderer::new(), ViewerScene::default(), config);

    let summary = host.run()?;
    match summary.benchmark {
        Some(report) => println!("{report}"),
        None => log::info!("Viewer closed after {} frames", summary.frames),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = ViewerArgs::parse();
    render_host::foundation::logging::init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Viewer failed: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
