use crate::core::lentil::{Float, non_zero};
use crate::core::geometry::{Point2f, Point3f, Vector2f};
use crate::core::light_field::LightFieldState;
use crate::core::coordinates::PupilSurface;
use crate::core::lens_model::{LensModel, LensConstants, ApertureSample, BackwardSample};

/// An ideal thin lens of focal length `f`. The lens sits on the plane `z = 0`, which is
/// also the outer pupil, and the reference plane is one focal length behind it.
#[derive(Debug, Clone)]
pub struct ThinLens {
    constants: LensConstants
}

impl ThinLens {
    pub fn new(focal_length: Float, pupil_radius: Float) -> ThinLens {
        ThinLens {
            constants: LensConstants {
                name: format!("thin_lens_{}mm", focal_length),
                focal_length,
                outer_pupil: PupilSurface::plane(pupil_radius, 0.0),
                inner_pupil: PupilSurface::plane(pupil_radius, focal_length),
                back_focal_length: focal_length,
                aperture_housing_radius: pupil_radius
            }
        }
    }

    #[inline]
    fn focal_length(&self) -> Float {
        self.constants.focal_length
    }

    /// Distance from the reference plane to the lens.
    #[inline]
    fn lens_distance(&self) -> Float {
        self.constants.back_focal_length
    }
}

impl Default for ThinLens {
    fn default() -> Self {
        ThinLens::new(50.0, 20.0)
    }
}

impl LensModel for ThinLens {
    fn constants(&self) -> &LensConstants {
        &self.constants
    }

    fn evaluate(&self, input: &LightFieldState) -> (LightFieldState, Float) {
        let p = input.project(self.lens_distance());
        // paraxial refraction
        let direction = input.direction - Vector2f::from(p) / self.focal_length();
        (LightFieldState::new(p, direction, input.wavelength), 1.0)
    }

    fn sample_aperture(&self, sensor: &LightFieldState, aperture_point: &Point2f, sensor_shift: Float) -> ApertureSample {
        let direction = (*aperture_point - sensor.position) / non_zero(self.lens_distance() + sensor_shift);
        let solved = LightFieldState::new(sensor.position, direction, sensor.wavelength);
        let mut shifted = solved;
        shifted.propagate(sensor_shift);
        let (aperture, transmittance) = self.evaluate(&shifted);
        ApertureSample { sensor: solved, aperture, transmittance }
    }

    fn sample_aperture_backward(&self, scene: &Point3f, aperture_point: &Point2f, wavelength: Float) -> BackwardSample {
        if scene.z <= 0.0 || !self.constants.outer_pupil.contains(aperture_point) {
            return BackwardSample::default();
        }
        let outer_direction = Vector2f::new(scene.x - aperture_point.x, scene.y - aperture_point.y) / scene.z;
        let inner_direction = outer_direction + Vector2f::from(*aperture_point) / self.focal_length();
        let position = *aperture_point - inner_direction * self.lens_distance();
        BackwardSample {
            sensor: LightFieldState::new(position, inner_direction, wavelength),
            outer: LightFieldState::new(*aperture_point, outer_direction, wavelength),
            transmittance: 1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_rays_meet_at_focus() {
        let lens = ThinLens::default();
        // rays parallel to the axis leave the lens aimed at z = -f, the reference plane
        for &h in &[1.0, 5.0, -7.0] {
            let s = LightFieldState::new(Point2f::new(0.0, h), Vector2f::zero(), 0.55);
            let (out, t) = lens.evaluate(&s);
            assert_eq!(t, 1.0);
            assert!((out.direction.y + h / 50.0).abs() < 1e-12);
        }
    }

    #[test]
    fn backward_images_scene_point() {
        let lens = ThinLens::default();
        let d: Float = 1000.0;
        let image = 50.0 * d / (d - 50.0);
        let shift = image - 50.0;
        // every aperture point images the axial point onto the same shifted sensor point
        for &a in &[Point2f::new(2.0, 0.0), Point2f::new(0.0, -4.0), Point2f::new(3.0, 3.0)] {
            let sample = lens.sample_aperture_backward(&Point3f::new(0.0, 0.0, d), &a, 0.55);
            let on_sensor = sample.sensor.project(-shift);
            assert!(on_sensor.radius_squared() < 1e-18);
        }
    }

    #[test]
    fn name_and_constants() {
        let lens = ThinLens::new(35.0, 10.0);
        assert_eq!(lens.constants().name, "thin_lens_35mm");
        assert_eq!(lens.constants().inner_pupil.vertex_z, 35.0);
    }
}
