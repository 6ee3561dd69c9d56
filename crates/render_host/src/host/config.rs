//! Host configuration
//!
//! Loaded from `.toml` or `.ron` through [`Config`]; every field has a
//! default so partial files work.

use super::navigation::{NavigationState, PITCH_LIMIT};
use super::settings::{PipelineKind, RuntimeSettings};
use crate::backend::{BackendKind, CapabilityProfile, RenderApi, WindowSpec};
use crate::config::Config;
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Window creation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Windowed client width
    pub width: u32,
    /// Windowed client height
    pub height: u32,
    /// Start fullscreen
    pub fullscreen: bool,
    /// Show the cursor; a hidden cursor is captured for mouse look
    pub show_cursor: bool,
    /// Frames between swaps, 0 disables vsync
    pub swap_interval: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Render Host".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            show_cursor: true,
            swap_interval: 0,
        }
    }
}

/// Graphics context request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Preferred API; the first of the platform preference order when unset
    pub api: Option<RenderApi>,
    /// Red channel bits
    pub red_bits: u32,
    /// Green channel bits
    pub green_bits: u32,
    /// Blue channel bits
    pub blue_bits: u32,
    /// Alpha channel bits
    pub alpha_bits: u32,
    /// Depth buffer bits
    pub depth_bits: u32,
    /// Request a debug context
    pub debug_context: bool,
    /// Request a compatibility profile (versioned desktop GL only)
    pub compatibility_profile: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            api: None,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            debug_context: false,
            compatibility_profile: false,
        }
    }
}

/// Renderer and projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial pipeline
    pub pipeline: PipelineKind,
    /// Initial multisample count
    pub sample_count: u32,
    /// Directory resources are loaded from
    pub content_dir: PathBuf,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near_plane: f32,
    /// Far clip plane
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineKind::Forward,
            sample_count: 0,
            content_dir: PathBuf::from("content"),
            fov: 45.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

/// Initial camera pose and input response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Start position
    pub position: Vec3,
    /// Start pitch in degrees
    pub pitch: f32,
    /// Start yaw in degrees
    pub yaw: f32,
    /// Units per reference frame
    pub velocity: f32,
    /// Degrees per pixel of mouse or single-finger drag
    pub mouse_sensitivity: f32,
    /// World units per pixel of pinch spread
    pub pinch_scale: f32,
    /// Negate horizontal look
    pub invert_x: bool,
    /// Negate vertical look
    pub invert_y: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let nav = NavigationState::default();
        Self {
            position: nav.position,
            pitch: nav.pitch,
            yaw: nav.yaw,
            velocity: nav.velocity,
            mouse_sensitivity: 0.3,
            pinch_scale: 0.05,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Benchmark run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Run in benchmark mode
    pub enabled: bool,
    /// Frames to render before reporting
    pub length: u32,
    /// Seconds the result stays on screen
    pub observation_secs: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            length: 600,
            observation_secs: 5.0,
        }
    }
}

/// Complete host configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Backend implementation
    pub backend: BackendKind,
    /// Window settings
    pub window: WindowConfig,
    /// Context request
    pub context: ContextConfig,
    /// Renderer settings
    pub render: RenderConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Benchmark settings
    pub benchmark: BenchmarkConfig,
}

impl Config for HostConfig {}

impl HostConfig {
    /// Preferred capability profile with the given window sample count
    pub fn profile(&self, sample_count: u32) -> CapabilityProfile {
        let api = self.context.api.unwrap_or(RenderApi::PREFERENCE_ORDER[0]);
        CapabilityProfile {
            red_bits: self.context.red_bits,
            green_bits: self.context.green_bits,
            blue_bits: self.context.blue_bits,
            alpha_bits: self.context.alpha_bits,
            depth_bits: self.context.depth_bits,
            sample_count,
            debug_context: self.context.debug_context && api == RenderApi::OpenGl4,
            compatibility_profile: self.context.compatibility_profile && api == RenderApi::OpenGl4,
            ..CapabilityProfile::for_api(api)
        }
    }

    /// Window request for a windowed size and fullscreen flag
    pub fn window_spec(&self, (width, height): (u32, u32), fullscreen: bool) -> WindowSpec {
        WindowSpec {
            title: self.window.title.clone(),
            width,
            height,
            fullscreen,
            swap_interval: self.window.swap_interval,
        }
    }

    /// Settings for the first window
    pub fn initial_settings(&self) -> RuntimeSettings {
        let settings = RuntimeSettings::new(self.render.pipeline, self.render.sample_count, self.window.fullscreen);
        if self.benchmark.enabled {
            settings.with_benchmark(self.benchmark.length)
        } else {
            settings
        }
    }

    /// Camera at its configured start pose
    pub fn initial_navigation(&self) -> NavigationState {
        NavigationState {
            position: self.camera.position,
            pitch: self.camera.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            yaw: self.camera.yaw,
            velocity: self.camera.velocity,
            run_time: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_framework() {
        let config = HostConfig::default();
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.benchmark.length, 600);
        assert_eq!(config.render.fov, 45.0);
        assert_eq!(config.camera.mouse_sensitivity, 0.3);
        assert_eq!(config.backend, BackendKind::Glfw);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: HostConfig = toml::from_str(
            r#"
            backend = "winit"

            [window]
            title = "Knight"

            [benchmark]
            enabled = true
            length = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::Winit);
        assert_eq!(config.window.title, "Knight");
        assert_eq!(config.window.width, 1280);
        assert!(config.initial_settings().benchmark());
        assert_eq!(config.initial_settings().benchmark_length(), 10);
    }

    #[test]
    fn test_profile_flags_only_for_versioned_gl() {
        let mut config = HostConfig::default();
        config.context.api = Some(RenderApi::OpenGlEs3);
        config.context.compatibility_profile = true;
        let profile = config.profile(4);
        assert_eq!(profile.api, RenderApi::OpenGlEs3);
        assert_eq!(profile.sample_count, 4);
        assert!(!profile.compatibility_profile);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_round_trip_through_ron_file() {
        let path = std::env::temp_dir().join(format!("render_host_config_{}.ron", std::process::id()));
        let mut config = HostConfig::default();
        config.camera.invert_y = true;
        config.save_to_file(&path).unwrap();
        let loaded = HostConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
