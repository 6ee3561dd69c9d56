//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the host:
//! - Math types and camera direction helpers
//! - Frame timing
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
