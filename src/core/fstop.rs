//! Aperture radius calibration from a requested f-number.

use super::lentil::Float;
use super::lentil::consts::BIG;
use super::geometry::{Point2f, Point3f};
use super::lens_profile::LensProfile;
use super::evaluator::LensEvaluator;
use super::aperture::sample_aperture_backward;
use std::fmt;

/// Radius steps scanned across the aperture housing.
const FSTOP_SCAN_STEPS: u32 = 1000;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FStopCalibration {
    pub fstop: Float,
    /// Aperture radius in millimeters achieving `fstop`.
    pub aperture_radius: Float
}

impl fmt::Display for FStopCalibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f/{:.3} (aperture radius {:.4} mm)", self.fstop, self.aperture_radius)
    }
}

/// f-number of a parallel ray entering at height `h`, measured from the angle under
/// which its crossing of the inner pupil is seen from the lens-frame origin.
pub fn measure_fstop(profile: &LensProfile, evaluator: &LensEvaluator, h: Float) -> Option<Float> {
    let target = Point3f::new(0.0, h, BIG);
    let aperture = Point2f::new(0.01, h);
    let sample = sample_aperture_backward(evaluator, &target, &aperture, profile.wavelength).ok()?;

    let sensor = sample.sensor;
    let at_pupil = sensor.project(profile.back_focal_length);
    if !profile.inner_pupil.contains(&at_pupil) {
        return None;
    }
    let (point, _) = profile.inner_pupil.to_camera_space(&at_pupil, &sensor.direction);
    let theta = (point.y / point.z).atan();
    let fstop = 1.0 / (2.0 * theta.sin());
    if fstop.is_finite() {
        Some(fstop)
    } else {
        None
    }
}

/// Widest aperture radius whose f-number is not below `target`. Returns `None` when
/// the first accepted radius is already faster than `target`, or no radius is accepted.
pub fn trace_backwards_for_fstop(profile: &LensProfile, evaluator: &LensEvaluator, target: Float) -> Option<FStopCalibration> {
    let mut previous: Option<FStopCalibration> = None;
    for i in 1..FSTOP_SCAN_STEPS {
        let radius = i as Float / FSTOP_SCAN_STEPS as Float * profile.aperture_housing_radius;
        let fstop = match measure_fstop(profile, evaluator, radius) {
            Some(fstop) => fstop,
            None => continue,
        };
        if fstop < target {
            if previous.is_none() {
                warn!("f/{} is slower than the narrowest measurable aperture (f/{})", target, fstop);
            }
            return previous;
        }
        previous = Some(FStopCalibration { fstop, aperture_radius: radius });
    }
    if let Some(widest) = previous {
        warn!("f/{} is faster than the lens allows, using the widest aperture {}", target, widest);
    }
    previous
}
