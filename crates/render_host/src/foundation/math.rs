//! Math utilities and types
//!
//! Camera math for the host works in degrees, matching the engine's node
//! transform convention (pitch about X, yaw about Y).

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Degrees to radians factor
pub const DEG2RAD: f32 = std::f32::consts::PI / 180.0;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * DEG2RAD
}

/// Unit view direction for a camera with the given pitch and yaw (degrees).
///
/// The camera looks down -Z at zero rotation, so moving "forward" subtracts
/// this vector's opposite from the position.
pub fn view_direction(pitch: f32, yaw: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = deg_to_rad(yaw).sin_cos();
    let cos_pitch = deg_to_rad(-pitch).cos();
    let sin_pitch = deg_to_rad(-pitch).sin();
    Vec3::new(-sin_yaw * cos_pitch, -sin_pitch, -cos_yaw * cos_pitch)
}

/// Horizontal strafe direction (pitch is ignored), `offset` degrees from yaw.
pub fn strafe_direction(yaw: f32, offset: f32) -> Vec3 {
    let (sin, cos) = deg_to_rad(yaw + offset).sin_cos();
    Vec3::new(sin, 0.0, cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_direction_is_unit_length() {
        for &(pitch, yaw) in &[(0.0, 0.0), (-10.0, 60.0), (45.0, -135.0), (90.0, 12.0)] {
            assert_relative_eq!(view_direction(pitch, yaw).norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_view_direction_at_rest_looks_down_negative_z() {
        assert_relative_eq!(view_direction(0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_strafe_is_perpendicular_to_view() {
        let view = view_direction(0.0, 30.0);
        let right = strafe_direction(30.0, 90.0);
        assert_relative_eq!(view.dot(&right), 0.0, epsilon = 1e-6);
    }
}
