use crate::core::lentil::{Float, non_zero};
use crate::core::geometry::{Point2f, Point3f, Vector2f};
use crate::core::light_field::LightFieldState;
use crate::core::coordinates::PupilSurface;
use crate::core::lens_model::{LensModel, LensConstants, ApertureSample, BackwardSample};

/// Free space. The outer pupil is the reference plane itself, so every state is
/// transferred unchanged.
#[derive(Debug, Clone)]
pub struct IdentityLens {
    constants: LensConstants
}

impl IdentityLens {
    pub fn new(pupil_radius: Float, back_focal_length: Float) -> IdentityLens {
        IdentityLens {
            constants: LensConstants {
                name: "identity".to_owned(),
                focal_length: 0.0,
                outer_pupil: PupilSurface::plane(pupil_radius, 0.0),
                inner_pupil: PupilSurface::plane(pupil_radius, back_focal_length),
                back_focal_length,
                aperture_housing_radius: pupil_radius
            }
        }
    }
}

impl Default for IdentityLens {
    fn default() -> Self {
        IdentityLens::new(25.0, 0.0)
    }
}

impl LensModel for IdentityLens {
    fn constants(&self) -> &LensConstants {
        &self.constants
    }

    fn evaluate(&self, input: &LightFieldState) -> (LightFieldState, Float) {
        (*input, 1.0)
    }

    fn sample_aperture(&self, sensor: &LightFieldState, aperture_point: &Point2f, sensor_shift: Float) -> ApertureSample {
        // the aperture is sensor_shift away
        let direction = (*aperture_point - sensor.position) / non_zero(sensor_shift);
        let solved = LightFieldState::new(sensor.position, direction, sensor.wavelength);
        ApertureSample {
            sensor: solved,
            aperture: LightFieldState::new(*aperture_point, direction, sensor.wavelength),
            transmittance: 1.0
        }
    }

    fn sample_aperture_backward(&self, scene: &Point3f, aperture_point: &Point2f, wavelength: Float) -> BackwardSample {
        if scene.z <= 0.0 || !self.constants.outer_pupil.contains(aperture_point) {
            return BackwardSample::default();
        }
        let direction = Vector2f::new(scene.x - aperture_point.x, scene.y - aperture_point.y) / scene.z;
        let state = LightFieldState::new(*aperture_point, direction, wavelength);
        BackwardSample {
            sensor: state,
            outer: state,
            transmittance: 1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_is_identity() {
        let lens = IdentityLens::default();
        let s = LightFieldState::new(Point2f::new(1.0, 2.0), Vector2f::new(-0.1, 0.3), 0.55);
        assert_eq!(lens.evaluate(&s), (s, 1.0));
    }

    #[test]
    fn forward_reaches_aperture_after_shift() {
        let lens = IdentityLens::default();
        let sensor = LightFieldState::at(Point2f::new(1.0, 1.0), 0.55);
        let sample = lens.sample_aperture(&sensor, &Point2f::new(3.0, -1.0), 4.0);
        let reached = sample.sensor.project(4.0);
        assert!((reached - Point2f::new(3.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn backward_points_at_scene() {
        let lens = IdentityLens::default();
        let sample = lens.sample_aperture_backward(&Point3f::new(0.0, 0.0, 1000.0), &Point2f::new(2.0, 0.0), 0.55);
        assert_eq!(sample.transmittance, 1.0);
        assert_eq!(sample.sensor.position, Point2f::new(2.0, 0.0));
        assert!((sample.sensor.direction.x + 0.002).abs() < 1e-12);
        let blocked = lens.sample_aperture_backward(&Point3f::new(0.0, 0.0, 1000.0), &Point2f::new(30.0, 0.0), 0.55);
        assert_eq!(blocked.transmittance, 0.0);
    }
}
