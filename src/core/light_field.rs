//! The 5D ray state exchanged with lens models.

use super::lentil::Float;
use super::geometry::{Point2f, Vector2f};
use std::fmt;

/// A ray on a reference plane: position in millimeters, direction in two-plane
/// parametrization (the implicit third component is 1) and wavelength in micrometers.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LightFieldState {
    pub position: Point2f,
    pub direction: Vector2f,
    pub wavelength: Float
}

impl LightFieldState {
    pub fn new(position: Point2f, direction: Vector2f, wavelength: Float) -> LightFieldState {
        LightFieldState { position, direction, wavelength }
    }

    /// A state at `position` with zero direction.
    pub fn at(position: Point2f, wavelength: Float) -> LightFieldState {
        LightFieldState {
            position,
            direction: Vector2f::zero(),
            wavelength
        }
    }

    /// Move the position along the direction by `distance` along the axis.
    #[inline]
    pub fn propagate(&mut self, distance: Float) {
        self.position = self.project(distance);
    }

    /// Position after travelling `distance` along the axis.
    #[inline]
    pub fn project(&self, distance: Float) -> Point2f {
        self.position + self.direction * distance
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.direction.is_finite() && self.wavelength.is_finite()
    }
}

impl fmt::Display for LightFieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ x: {}, y: {}, dx: {}, dy: {}, lambda: {} ]",
            self.position.x, self.position.y, self.direction.x, self.direction.y, self.wavelength)
    }
}
