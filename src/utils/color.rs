//! Color utilities for orbit lines.
//!
//! Colors are carried through the core as linear RGB triples in a
//! [`DisplayVector`], one per emitted vertex, so the rendering side can upload
//! them next to the positions without conversion. Bevy [`Color`] values are
//! only produced at the drawing boundary.
//!
//! # Color Modes
//!
//! - [`ColorMode::Line`]: every vertex of a line carries the line's random
//!   base color.
//! - [`ColorMode::BodySpeed`]: every vertex is the line's base color scaled by
//!   the speed of one chosen body at the moment the vertex was emitted, so
//!   close encounters show up as bright stretches.

use crate::physics::math::{DisplayVector, Scalar};
use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Brightness of a vertex whose colored body is at rest
const MIN_SPEED_BRIGHTNESS: f32 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Line,
    BodySpeed,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "line" => Ok(ColorMode::Line),
            "body_speed" | "speed" => Ok(ColorMode::BodySpeed),
            _ => Err(format!(
                "unknown color mode '{s}', expected 'line' or 'body_speed'"
            )),
        }
    }
}

/// Generates a random line color with every component uniform in `[0, 1]`.
#[must_use]
pub fn random_line_color<R: Rng>(rng: &mut R) -> DisplayVector {
    DisplayVector::new(
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    )
}

/// Scales a base color by a body's speed.
///
/// The brightness factor rises from `0.25` at rest toward `1.0` as the speed
/// grows past `reference_speed`, following `s / (s + reference_speed)`.
///
/// # Examples
///
/// ```rust
/// use bevy::math::Vec3;
/// use phaseviz::utils::color::speed_color;
///
/// let base = Vec3::new(1.0, 0.5, 0.0);
/// let slow = speed_color(base, 0.0, 1.0);
/// let fast = speed_color(base, 100.0, 1.0);
/// assert!(slow.x < fast.x);
/// assert!(fast.x <= 1.0);
/// ```
#[must_use]
pub fn speed_color(
    base: DisplayVector,
    speed: Scalar,
    reference_speed: Scalar,
) -> DisplayVector {
    let reference_speed = reference_speed.max(Scalar::EPSILON);
    let t = if speed.is_finite() && speed > 0.0 {
        (speed / (speed + reference_speed)) as f32
    } else {
        0.0
    };

    base * (MIN_SPEED_BRIGHTNESS + (1.0 - MIN_SPEED_BRIGHTNESS) * t)
}

/// Converts a linear RGB triple to a Bevy color.
#[must_use]
pub fn to_color(rgb: DisplayVector) -> Color {
    Color::linear_rgb(rgb.x, rgb.y, rgb.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_line_color_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..1_000 {
            let color = random_line_color(&mut rng);
            for component in color.to_array() {
                assert!((0.0..=1.0).contains(&component));
            }
        }
    }

    #[test]
    fn test_speed_color_is_monotonic() {
        let base = DisplayVector::ONE;
        let mut previous = 0.0;

        for speed in [0.0, 0.1, 0.5, 1.0, 5.0, 50.0] {
            let brightness = speed_color(base, speed, 1.0).x;
            assert!(brightness >= previous);
            assert!(brightness <= 1.0);
            previous = brightness;
        }
    }

    #[test]
    fn test_speed_color_bounds() {
        let base = DisplayVector::new(0.8, 0.4, 0.2);

        let resting = speed_color(base, 0.0, 1.0);
        assert!((resting - base * MIN_SPEED_BRIGHTNESS).length() < 1e-6);

        let at_reference = speed_color(base, 1.0, 1.0);
        let expected = base * (MIN_SPEED_BRIGHTNESS + (1.0 - MIN_SPEED_BRIGHTNESS) * 0.5);
        assert!((at_reference - expected).length() < 1e-6);
    }

    #[test]
    fn test_speed_color_ignores_non_finite_speed() {
        let base = DisplayVector::ONE;
        assert_eq!(
            speed_color(base, Scalar::NAN, 1.0),
            speed_color(base, 0.0, 1.0)
        );
    }

    #[test]
    fn test_color_mode_from_str() {
        assert_eq!("line".parse::<ColorMode>(), Ok(ColorMode::Line));
        assert_eq!("body-speed".parse::<ColorMode>(), Ok(ColorMode::BodySpeed));
        assert_eq!("Body_Speed".parse::<ColorMode>(), Ok(ColorMode::BodySpeed));
        assert!("rainbow".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_to_color() {
        let color = to_color(DisplayVector::new(1.0, 0.0, 0.5));
        let linear = LinearRgba::from(color);
        assert_eq!(linear.red, 1.0);
        assert_eq!(linear.green, 0.0);
        assert_eq!(linear.blue, 0.5);
    }
}
