//! Math type aliases and helper functions.
//!
//! All overlay geometry is stored and emitted in f32, matching the GPU
//! vertex format.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 3D point (f32).
pub type Point3 = nalgebra::Point3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Vectors with a length at or below this are treated as zero by
/// [`safe_normalize`].
pub const NORMALIZE_EPSILON: f32 = 1e-4;

/// Normalize `v`, or return the zero vector if `v` is too short to have a
/// meaningful direction.
pub fn safe_normalize(v: &Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Convert a vector into the flat array layout used by GPU vertices.
#[inline]
pub(crate) fn to_array3(v: &Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Component-wise minimum of two vectors.
#[inline]
pub(crate) fn vec3_min(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

/// Component-wise maximum of two vectors.
#[inline]
pub(crate) fn vec3_max(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_normalize_unit_length() {
        let n = safe_normalize(&Vec3::new(10.0, 0.0, 0.0));
        assert!((n - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_safe_normalize_zero_vector() {
        assert_eq!(safe_normalize(&Vec3::zeros()), Vec3::zeros());
        assert_eq!(safe_normalize(&Vec3::new(1e-6, 0.0, 0.0)), Vec3::zeros());
    }

    #[test]
    fn test_min_max() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(-1.0, 2.0, 3.0);
        assert_eq!(vec3_min(&a, &b), Vec3::new(-1.0, -2.0, 3.0));
        assert_eq!(vec3_max(&a, &b), Vec3::new(1.0, 2.0, 3.0));
    }
}
