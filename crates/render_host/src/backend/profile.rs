//! Capability profiles and window specifications
//!
//! A [`CapabilityProfile`] describes the graphics context a backend should
//! negotiate. Profiles are plain values: a backend copies the one passed to
//! `init` and never changes it; asking for something different means calling
//! `init` again.

use super::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Graphics API family a context is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderApi {
    /// Legacy fixed-version desktop GL (2.x, compatibility context)
    OpenGl2,
    /// Modern versioned desktop GL (core, compatibility or debug profile)
    OpenGl4,
    /// Embedded-systems variant (GL ES 3.x)
    OpenGlEs3,
}

impl RenderApi {
    /// Preference order for the default profile, highest capability first
    #[cfg(any(target_os = "android", target_os = "ios"))]
    pub const PREFERENCE_ORDER: &'static [RenderApi] = &[Self::OpenGlEs3, Self::OpenGl2];

    /// Preference order for the default profile, highest capability first
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    pub const PREFERENCE_ORDER: &'static [RenderApi] = &[Self::OpenGl4, Self::OpenGlEs3, Self::OpenGl2];

    /// The single degraded API tried when the preferred one is rejected
    pub const FALLBACK: RenderApi = Self::OpenGl2;

    /// Version requested when none is specified
    pub fn default_version(self) -> (u32, u32) {
        match self {
            Self::OpenGl2 => (2, 1),
            Self::OpenGl4 => (4, 3),
            Self::OpenGlEs3 => (3, 0),
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenGl2 => "OpenGL (legacy)",
            Self::OpenGl4 => "OpenGL",
            Self::OpenGlEs3 => "OpenGL ES",
        }
    }
}

/// Requested graphics API, version and default-framebuffer format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// API family
    pub api: RenderApi,
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
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
    /// Default framebuffer multisample count (0 = off)
    pub sample_count: u32,
    /// Request a debug context
    pub debug_context: bool,
    /// Request a compatibility rather than a core profile (desktop GL 3.2+ only)
    pub compatibility_profile: bool,
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self::for_api(RenderApi::PREFERENCE_ORDER[0])
    }
}

impl CapabilityProfile {
    /// Profile for `api` with its default version and an 8/8/8/8 + 24 surface
    pub fn for_api(api: RenderApi) -> Self {
        let (major, minor) = api.default_version();
        Self {
            api,
            major,
            minor,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            sample_count: 0,
            debug_context: false,
            compatibility_profile: false,
        }
    }

    /// The degraded profile derived from this one: legacy API, same surface
    /// format and sample count, no debug or profile flags
    pub fn fallback(&self) -> Self {
        Self {
            sample_count: self.sample_count,
            red_bits: self.red_bits,
            green_bits: self.green_bits,
            blue_bits: self.blue_bits,
            alpha_bits: self.alpha_bits,
            depth_bits: self.depth_bits,
            ..Self::for_api(RenderApi::FALLBACK)
        }
    }

    /// Replace the multisample count
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Reject malformed profiles. This checks shape only; whether the driver
    /// can satisfy the profile is only known once a window is created.
    pub fn validate(&self) -> Result<(), BackendError> {
        let invalid = |reason: String| Err(BackendError::InvalidProfile(reason));

        let version_ok = match self.api {
            RenderApi::OpenGl2 => self.major == 2 && self.minor <= 1,
            RenderApi::OpenGl4 => (self.major == 3 && self.minor >= 2) || (self.major == 4 && self.minor <= 6),
            RenderApi::OpenGlEs3 => self.major == 3 && self.minor <= 2,
        };
        if !version_ok {
            return invalid(format!("{} cannot be version {}.{}", self.api.label(), self.major, self.minor));
        }

        for (name, bits) in [
            ("red", self.red_bits),
            ("green", self.green_bits),
            ("blue", self.blue_bits),
            ("alpha", self.alpha_bits),
        ] {
            if bits > 16 {
                return invalid(format!("{name} channel cannot have {bits} bits"));
            }
        }
        if self.depth_bits > 32 {
            return invalid(format!("depth buffer cannot have {} bits", self.depth_bits));
        }
        if self.sample_count != 0 && (!self.sample_count.is_power_of_two() || self.sample_count > 32) {
            return invalid(format!("unsupported sample count {}", self.sample_count));
        }
        if self.compatibility_profile && self.api != RenderApi::OpenGl4 {
            return invalid("compatibility profile only applies to versioned desktop GL".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.api.label(), self.major, self.minor)?;
        if self.api == RenderApi::OpenGl4 {
            let profile = if self.debug_context {
                "debug"
            } else if self.compatibility_profile {
                "compatibility"
            } else {
                "core"
            };
            write!(f, " ({profile})")?;
        }
        write!(
            f,
            ", rgba {}/{}/{}/{} depth {}, samples {}",
            self.red_bits, self.green_bits, self.blue_bits, self.alpha_bits, self.depth_bits, self.sample_count
        )
    }
}

/// Parameters for creating one window; consumed by a single creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Title bar text
    pub title: String,
    /// Client width in pixels (ignored in fullscreen, which uses the desktop mode)
    pub width: u32,
    /// Client height in pixels (ignored in fullscreen)
    pub height: u32,
    /// Fullscreen on the primary monitor
    pub fullscreen: bool,
    /// Frames to wait between swaps; 0 disables vsync
    pub swap_interval: u32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: "Render Host".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            swap_interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_first_preference() {
        assert_eq!(CapabilityProfile::default().api, RenderApi::PREFERENCE_ORDER[0]);
        assert!(CapabilityProfile::default().validate().is_ok());
    }

    #[test]
    fn test_every_api_default_is_valid() {
        for &api in RenderApi::PREFERENCE_ORDER {
            assert!(CapabilityProfile::for_api(api).validate().is_ok(), "{api:?}");
        }
    }

    #[test]
    fn test_fallback_keeps_surface_and_drops_flags() {
        let mut primary = CapabilityProfile::for_api(RenderApi::OpenGl4).with_sample_count(4);
        primary.debug_context = true;
        primary.depth_bits = 32;

        let fallback = primary.fallback();
        assert_eq!(fallback.api, RenderApi::OpenGl2);
        assert_eq!((fallback.major, fallback.minor), (2, 1));
        assert_eq!(fallback.sample_count, 4);
        assert_eq!(fallback.depth_bits, 32);
        assert!(!fallback.debug_context);
        assert!(fallback.validate().is_ok());
    }

    #[test]
    fn test_malformed_profiles_are_rejected() {
        let mut profile = CapabilityProfile::for_api(RenderApi::OpenGl4);
        profile.major = 1;
        assert!(matches!(profile.validate(), Err(BackendError::InvalidProfile(_))));

        let profile = CapabilityProfile::for_api(RenderApi::OpenGlEs3).with_sample_count(3);
        assert!(profile.validate().is_err());

        let mut profile = CapabilityProfile::for_api(RenderApi::OpenGl2);
        profile.compatibility_profile = true;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_display_names_profile() {
        let text = CapabilityProfile::for_api(RenderApi::OpenGl4).to_string();
        assert!(text.starts_with("OpenGL 4.3 (core)"), "{text}");
    }
}
