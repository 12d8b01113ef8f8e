//! Vector helpers on top of `glam::Vec3`.
//!
//! glam already covers the arithmetic (add, sub, scale, dot, cross, length).
//! The path tracer needs a few extra operations with exact semantics:
//! normalization that falls back to zero for tiny vectors, a `(1-t)a + tb`
//! interpolation and mirror reflection.

use crate::Vec3;

/// Squared length at or below which [`VectorExt::normalize_zero`] returns zero.
pub const NORMALIZE_EPSILON_SQ: f32 = 0.0001 * 0.0001;

/// Extra vector operations used by the renderer.
pub trait VectorExt {
    /// Normalize, or return the zero vector if the squared length is
    /// at or below [`NORMALIZE_EPSILON_SQ`].
    fn normalize_zero(self) -> Self;

    /// Component-wise product.
    fn hadamard(self, rhs: Self) -> Self;

    /// Mirror `self` about `normal`.
    ///
    /// `normal` is expected to be unit length.
    fn reflect(self, normal: Self) -> Self;
}

impl VectorExt for Vec3 {
    #[inline]
    fn normalize_zero(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > NORMALIZE_EPSILON_SQ {
            self * (1.0 / len_sq.sqrt())
        } else {
            Vec3::ZERO
        }
    }

    #[inline]
    fn hadamard(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline]
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * self.dot(normal) * normal
    }
}

/// Linear interpolation written as `(1 - t) * a + t * b`.
///
/// glam's own `Vec3::lerp` computes `a + (b - a) * t`, which rounds
/// differently. The renderer relies on `t == 1.0` returning `b` exactly.
pub trait Mix {
    fn mix(self, other: Self, t: f32) -> Self;
}

impl Mix for f32 {
    #[inline]
    fn mix(self, other: f32, t: f32) -> f32 {
        (1.0 - t) * self + t * other
    }
}

impl Mix for Vec3 {
    #[inline]
    fn mix(self, other: Vec3, t: f32) -> Vec3 {
        Vec3::new(
            self.x.mix(other.x, t),
            self.y.mix(other.y, t),
            self.z.mix(other.z, t),
        )
    }
}
