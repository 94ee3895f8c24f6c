// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

/// Rotate `point` by `degrees` about the vertical (Y) axis passing through `pivot`.
///
/// Positive angles turn +X towards -Z, i.e. counter-clockwise when looking down -Y.
pub fn rotate_y_about(point: Vec3, degrees: f32, pivot: Vec3) -> Vec3 {
    Mat3::from_rotation_y(degrees.to_radians()) * (point - pivot) + pivot
}

/// Rotate a direction by `degrees` about the Y axis (translation-free).
pub fn rotate_y_vector(vector: Vec3, degrees: f32) -> Vec3 {
    Mat3::from_rotation_y(degrees.to_radians()) * vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_y_quarter_turn() {
        let p = rotate_y_about(Vec3::new(1.0, 2.0, 0.0), 90.0, Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotate_y_about_pivot() {
        let pivot = Vec3::new(5.0, 0.0, 5.0);
        // The pivot itself never moves
        assert!((rotate_y_about(pivot, 37.0, pivot) - pivot).length() < 1e-5);

        // Distance to the pivot axis is preserved
        let p = Vec3::new(7.0, 1.0, 5.0);
        let r = rotate_y_about(p, 123.0, pivot);
        assert!(((r - pivot).length() - (p - pivot).length()).abs() < 1e-4);
        assert_eq!(r.y, 1.0);
    }

    #[test]
    fn test_rotate_y_vector_ignores_pivot() {
        let v = rotate_y_vector(Vec3::Z, 180.0);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
