use rand::Rng;

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions, velocities, and accelerations
pub type Vector = bevy::math::DVec3;

/// 3x3 matrix type for projection blocks
pub type Matrix = bevy::math::DMat3;

/// Single precision types for projected, display-space coordinates
pub type DisplayVector = bevy::math::Vec3;
pub type DisplayMatrix = bevy::math::Mat3;

/// Number of phase-space coordinates: 3 bodies, position and velocity, 3 axes each
pub const PHASE_SPACE_DIMENSIONS: usize = 18;

/// Draws a vector whose components are uniform in `[-scale, scale]`.
pub fn random_vector<R: Rng>(rng: &mut R, scale: Scalar) -> Vector {
    let scale = scale.abs();
    if scale == 0.0 || !scale.is_finite() {
        return Vector::ZERO;
    }

    Vector::new(
        rng.random_range(-scale..=scale),
        rng.random_range(-scale..=scale),
        rng.random_range(-scale..=scale),
    )
}

/// Normalizes a vector, returning `None` when it has zero or non-finite length.
#[inline]
pub fn try_normalize(v: Vector) -> Option<Vector> {
    let length = v.length();
    if length > 0.0 && length.is_finite() {
        Some(v / length)
    } else {
        None
    }
}

/// Normalizes a row of coefficients in place via `row / sqrt(sum(row_i^2))`.
///
/// Returns `false` without touching the row when the sum of squares is zero or
/// not finite, in which case the caller is expected to redraw it.
pub fn normalize_row(row: &mut [Scalar]) -> bool {
    let sum_squared: Scalar = row.iter().map(|x| x * x).sum();
    if sum_squared <= 0.0 || !sum_squared.is_finite() {
        return false;
    }

    let inverse_length = 1.0 / libm::sqrt(sum_squared);
    for x in row.iter_mut() {
        *x *= inverse_length;
    }
    true
}

pub fn dot_rows(a: &[Scalar], b: &[Scalar]) -> Scalar {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
