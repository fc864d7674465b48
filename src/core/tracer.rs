//! Per-sample ray generation through the lens with bounded vignetting retries.
//!
//! Every attempt is a pure function of its aperture sample that either produces a
//! camera-space ray or a `Rejection`. `retry` runs attempts until one is accepted or
//! the retry budget is spent.

use super::lentil::Float;
use super::geometry::{Point2f, Point3f, Vector3f};
use super::light_field::LightFieldState;
use super::lens_profile::LensProfile;
use super::evaluator::LensEvaluator;
use super::aperture::{sample_aperture, sample_aperture_backward};
use super::bokeh::BokehShape;
use super::rng::Rng;
use std::fmt;

/// Why an attempt produced no ray.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The lens model reported zero transmittance.
    Vignetted,
    /// The aperture solve did not converge.
    SolverFailed,
    /// Outside the outer pupil.
    OuterPupil,
    /// Outside the inner pupil.
    InnerPupil,
    /// The scene blocks the path to the aperture.
    Occluded,
    /// NaN or infinite camera-space ray.
    NonFinite
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::Vignetted => "vignetted by the lens",
            Rejection::SolverFailed => "aperture solve failed",
            Rejection::OuterPupil => "outside the outer pupil",
            Rejection::InnerPupil => "outside the inner pupil",
            Rejection::Occluded => "occluded",
            Rejection::NonFinite => "non-finite ray",
        };
        write!(f, "{}", reason)
    }
}

/// Run `attempt(0)`, `attempt(1)`, ... until one succeeds, at most `max_attempts`
/// times. Returns the last outcome and the number of attempts made.
pub fn retry<T, F>(max_attempts: u32, mut attempt: F) -> (Result<T, Rejection>, u32)
where
F: FnMut(u32) -> Result<T, Rejection>
{
    let mut last = Err(Rejection::Vignetted);
    for n in 0..max_attempts {
        last = attempt(n);
        if last.is_ok() {
            return (last, n + 1);
        }
    }
    (last, max_attempts)
}

/// A generated camera ray. A zero weight marks a rejected sample.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CameraRay {
    pub origin: Point3f,
    pub direction: Vector3f,
    pub weight: Float,
    pub transmittance: Float,
    pub attempts: u32,
    pub rejection: Option<Rejection>
}

impl CameraRay {
    pub fn is_valid(&self) -> bool {
        self.weight > 0.0
    }
}

/// Scene visibility query used by the backward tracer.
pub trait OcclusionQuery {
    /// True when something blocks the segment from `origin` to `origin + direction`.
    fn is_occluded(&self, origin: &Point3f, direction: &Vector3f) -> bool;
}

/// An empty scene.
#[derive(Debug, Default, Copy, Clone)]
pub struct Unoccluded;

impl OcclusionQuery for Unoccluded {
    fn is_occluded(&self, _origin: &Point3f, _direction: &Vector3f) -> bool {
        false
    }
}

#[derive(Debug, Copy, Clone)]
struct Accepted {
    origin: Point3f,
    direction: Vector3f,
    transmittance: Float
}

/// The per-sample tracing loop over a calibrated profile.
pub struct Tracer<'a> {
    profile: &'a LensProfile,
    evaluator: &'a LensEvaluator,
    bokeh: &'a dyn BokehShape
}

impl<'a> Tracer<'a> {
    pub fn new(profile: &'a LensProfile, evaluator: &'a LensEvaluator, bokeh: &'a dyn BokehShape) -> Tracer<'a> {
        Tracer { profile, evaluator, bokeh }
    }

    fn max_attempts(&self) -> u32 {
        self.profile.vignetting_retries.saturating_add(1)
    }

    /// Aperture point in millimeters for a uniform sample.
    fn aperture_point(&self, u: &Point2f) -> Point2f {
        if self.profile.enable_dof {
            self.bokeh.sample(u) * self.profile.aperture_radius
        } else {
            Point2f::zero()
        }
    }

    #[inline]
    fn passes_inner_pupil(&self, sensor: &LightFieldState) -> bool {
        self.profile.inner_pupil.contains(&sensor.project(self.profile.back_focal_length))
    }

    /// Trace one sample. `sensor_uv` is the sensor coordinate in [-1, 1] across the
    /// sensor width, `lens_uv` the caller's lens sample used by the first attempt;
    /// later attempts draw from `rng`.
    pub fn trace_ray(&self, sensor_uv: &Point2f, lens_uv: &Point2f, rng: &mut Rng) -> CameraRay {
        let (result, attempts) = retry(self.max_attempts(), |n| {
            let u = if n == 0 { *lens_uv } else { rng.uniform_point2f() };
            self.trace_attempt(sensor_uv, &u)
        });
        match result {
            Ok(accepted) => CameraRay {
                origin: accepted.origin,
                direction: accepted.direction,
                weight: 1.0,
                transmittance: accepted.transmittance,
                attempts,
                rejection: None
            },
            Err(rejection) => CameraRay {
                attempts,
                rejection: Some(rejection),
                ..CameraRay::default()
            }
        }
    }

    fn trace_attempt(&self, sensor_uv: &Point2f, u: &Point2f) -> Result<Accepted, Rejection> {
        let profile = self.profile;
        let half_width = profile.sensor_width * 0.5;
        let mut sensor = LightFieldState::at(*sensor_uv * half_width, profile.wavelength);

        let aperture = self.aperture_point(u);
        if profile.enable_dof {
            sensor = sample_aperture(self.evaluator, &sensor, &aperture, profile.sensor_shift)?.sensor;
        }

        // move to the start of the lens system
        sensor.propagate(profile.sensor_shift);

        let (out, transmittance) = self.evaluator.evaluate(&sensor);
        if transmittance <= 0.0 {
            return Err(Rejection::Vignetted);
        }
        if !profile.outer_pupil.contains(&out.position) {
            return Err(Rejection::OuterPupil);
        }
        if !self.passes_inner_pupil(&sensor) {
            return Err(Rejection::InnerPupil);
        }

        let (origin, direction) = profile.outer_pupil.to_camera_space(&out.position, &out.direction);
        // lens frame to scene units, rays reversed to point into the scene
        let scale = -profile.units.scale();
        let origin = origin * scale;
        let direction = (direction * scale).normalize();
        if !origin.is_finite() || !direction.is_finite() {
            return Err(Rejection::NonFinite);
        }
        Ok(Accepted { origin, direction, transmittance })
    }

    /// Sensor position (millimeters, shifted sensor) hit by light from the camera-space
    /// scene point, or `None` when every attempt was rejected.
    pub fn trace_backwards(&self, scene: &Point3f, rng: &mut Rng, occlusion: &dyn OcclusionQuery) -> Option<Point2f> {
        let (result, _) = retry(self.max_attempts(), |_| {
            let u = rng.uniform_point2f();
            self.trace_backwards_attempt(scene, &u, occlusion)
        });
        result.ok().map(|mut sensor| {
            sensor.propagate(-self.profile.sensor_shift);
            sensor.position
        })
    }

    fn trace_backwards_attempt(&self, scene: &Point3f, u: &Point2f, occlusion: &dyn OcclusionQuery) -> Result<LightFieldState, Rejection> {
        let profile = self.profile;
        let scale = profile.units.scale();
        let aperture = self.aperture_point(u);

        let lens_position = Point3f::new(-aperture.x * scale, -aperture.y * scale, 0.0);
        if occlusion.is_occluded(scene, &(lens_position - *scene)) {
            return Err(Rejection::Occluded);
        }

        let target = *scene * (-1.0 / scale);
        let sample = sample_aperture_backward(self.evaluator, &target, &aperture, profile.wavelength)?;
        if !self.passes_inner_pupil(&sample.sensor) {
            return Err(Rejection::InnerPupil);
        }
        Ok(sample.sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lens_model::LensModelId;
    use crate::core::lens_profile::UnitSystem;
    use crate::bokeh::DiskBokeh;
    use crate::lenses::{IdentityLens, ThinLens};
    use std::cell::Cell;
    use std::sync::Arc;

    fn identity_setup() -> (LensProfile, LensEvaluator) {
        let lens = Arc::new(IdentityLens::default());
        let evaluator = LensEvaluator::from_model(LensModelId(0), lens);
        let profile = LensProfile::for_model(LensModelId(0), evaluator.constants());
        (profile, evaluator)
    }

    fn thin_lens_setup() -> (LensProfile, LensEvaluator) {
        let lens = Arc::new(ThinLens::default());
        let evaluator = LensEvaluator::from_model(LensModelId(1), lens);
        let mut profile = LensProfile::for_model(LensModelId(1), evaluator.constants());
        profile.aperture_radius = 5.0;
        (profile, evaluator)
    }

    #[test]
    fn retry_stops_at_first_success() {
        let calls = Cell::new(0);
        let (result, attempts) = retry(10, |n| {
            calls.set(calls.get() + 1);
            if n == 3 { Ok(n) } else { Err(Rejection::OuterPupil) }
        });
        assert_eq!(result, Ok(3));
        assert_eq!(attempts, 4);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn retry_is_bounded() {
        let calls = Cell::new(0);
        let (result, attempts): (Result<(), Rejection>, u32) = retry(6, |_| {
            calls.set(calls.get() + 1);
            Err(Rejection::InnerPupil)
        });
        assert_eq!(result, Err(Rejection::InnerPupil));
        assert_eq!(attempts, 6);
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn identity_pinhole_ray_along_axis() {
        let (mut profile, evaluator) = identity_setup();
        profile.enable_dof = false;
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(0);
        let ray = tracer.trace_ray(&Point2f::zero(), &Point2f::new(0.5, 0.5), &mut rng);
        assert_eq!(ray.weight, 1.0);
        assert_eq!(ray.attempts, 1);
        assert_eq!(ray.rejection, None);
        assert!((ray.direction.z + 1.0).abs() < 1e-12);
        assert!(ray.direction.x.abs() < 1e-12 && ray.direction.y.abs() < 1e-12);
    }

    #[test]
    fn unit_scale_reverses_origin() {
        let (mut profile, evaluator) = identity_setup();
        profile.enable_dof = false;
        profile.units = UnitSystem::Centimeters;
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(0);
        // sensor x = 0.5 * 18mm = 9mm, reversed and in cm
        let ray = tracer.trace_ray(&Point2f::new(0.5, 0.0), &Point2f::new(0.5, 0.5), &mut rng);
        assert!(ray.is_valid());
        assert!((ray.origin.x + 0.9).abs() < 1e-12);
    }

    #[test]
    fn exhausted_retries_give_zero_weight() {
        let (mut profile, evaluator) = identity_setup();
        profile.enable_dof = false;
        profile.vignetting_retries = 4;
        // sensor corner lies outside the 25mm outer pupil
        profile.sensor_width = 100.0;
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(0);
        let ray = tracer.trace_ray(&Point2f::new(1.0, 1.0), &Point2f::new(0.5, 0.5), &mut rng);
        assert_eq!(ray.weight, 0.0);
        assert_eq!(ray.attempts, 5);
        assert_eq!(ray.rejection, Some(Rejection::OuterPupil));
    }

    #[test]
    fn outer_pupil_crop_is_monotonic() {
        let (mut profile, evaluator) = thin_lens_setup();
        let sensor = Point2f::new(0.3, -0.2);
        let mut accepted_before = 0;
        for &radius in &[2.0, 4.0, 8.0, 16.0, 32.0] {
            profile.outer_pupil.radius = radius;
            let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
            let mut accepted = 0;
            for i in 0..256 {
                let lens = Rng::for_sample(i, 0).uniform_point2f();
                if tracer.trace_attempt(&sensor, &lens).is_ok() {
                    accepted += 1;
                }
            }
            assert!(accepted >= accepted_before);
            accepted_before = accepted;
        }
        assert!(accepted_before > 0);
    }

    #[test]
    fn retries_draw_from_rng_until_accepted() {
        let (mut profile, evaluator) = thin_lens_setup();
        // a quarter of the 5mm aperture disk passes the outer pupil
        profile.outer_pupil.radius = 2.5;
        profile.vignetting_retries = 63;
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let sensor = Point2f::new(0.1, 0.1);
        // maps to radius 4.9mm on the aperture
        let lens = Point2f::new(0.99, 0.99);
        assert_eq!(tracer.trace_attempt(&sensor, &lens).err(), Some(Rejection::OuterPupil));

        let ray = tracer.trace_ray(&sensor, &lens, &mut Rng::new(21));
        assert!(ray.is_valid());
        assert!(ray.attempts > 1 && ray.attempts <= 64);
        assert_eq!(ray.rejection, None);

        let again = tracer.trace_ray(&sensor, &lens, &mut Rng::new(21));
        assert_eq!(ray, again);
    }

    #[test]
    fn thin_lens_rays_converge_on_focus_plane() {
        let (mut profile, evaluator) = thin_lens_setup();
        profile.units = UnitSystem::Millimeters;
        let d: Float = 1000.0;
        profile.sensor_shift = 50.0 * 50.0 / (d - 50.0);
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(5);
        // sensor center images the axial point at z = -d in camera space
        for _ in 0..32 {
            let lens = rng.uniform_point2f();
            let ray = tracer.trace_ray(&Point2f::zero(), &lens, &mut rng);
            assert!(ray.is_valid());
            let t = (-d - ray.origin.z) / ray.direction.z;
            let hit = ray.origin + ray.direction * t;
            assert!(hit.x.abs() < 1e-6 && hit.y.abs() < 1e-6, "{}", hit);
        }
    }

    #[test]
    fn backward_trace_inverts_forward() {
        let (mut profile, evaluator) = thin_lens_setup();
        profile.units = UnitSystem::Millimeters;
        let d: Float = 1000.0;
        profile.sensor_shift = 50.0 * 50.0 / (d - 50.0);
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(9);
        let sensor = tracer.trace_backwards(&Point3f::new(0.0, 0.0, -d), &mut rng, &Unoccluded).unwrap();
        assert!(sensor.radius_squared() < 1e-12);
    }

    struct Wall;

    impl OcclusionQuery for Wall {
        fn is_occluded(&self, _origin: &Point3f, _direction: &Vector3f) -> bool {
            true
        }
    }

    #[test]
    fn occluded_backward_trace_fails() {
        let (profile, evaluator) = thin_lens_setup();
        let tracer = Tracer::new(&profile, &evaluator, &DiskBokeh);
        let mut rng = Rng::new(9);
        assert_eq!(tracer.trace_backwards(&Point3f::new(0.0, 0.0, -100.0), &mut rng, &Wall), None);
    }
}
