//! Sensor shift calibration.
//!
//! Two estimators: averaging the convergence points of a few adjoint rays traced
//! backward from the focus point, and a brute force search over candidate shifts that
//! traces one probe ray per candidate.

use super::lentil::Float;
use super::lentil::consts::BIG;
use super::geometry::{Point2f, Point3f};
use super::light_field::LightFieldState;
use super::lens_profile::LensProfile;
use super::evaluator::LensEvaluator;
use super::aperture::{sample_aperture, sample_aperture_backward};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// Largest sensor shift in millimeters the calibration will report.
pub const FOCUS_SHIFT_LIMIT: Float = 45.0;

/// Adjoint rays per aperture axis and sign for the averaging estimator.
const FOCUS_SAMPLES: usize = 4;

const LOG_SEARCH_STEP: Float = 1.0e-4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FocusSolution {
    /// Sensor shift in millimeters.
    Focused(Float),
    /// The estimate was outside `±FOCUS_SHIFT_LIMIT`; `limit` is the value in use.
    Clamped { requested: Float, limit: Float },
    /// No estimate could be made.
    Failed
}

impl FocusSolution {
    /// The sensor shift to apply, 0.0 when calibration failed.
    pub fn offset(&self) -> Float {
        match *self {
            FocusSolution::Focused(offset) => offset,
            FocusSolution::Clamped { limit, .. } => limit,
            FocusSolution::Failed => 0.0,
        }
    }

    pub fn is_failed(&self) -> bool {
        *self == FocusSolution::Failed
    }

    fn clamped(requested: Float) -> FocusSolution {
        if requested > FOCUS_SHIFT_LIMIT {
            FocusSolution::Clamped { requested, limit: FOCUS_SHIFT_LIMIT }
        } else if requested < -FOCUS_SHIFT_LIMIT {
            FocusSolution::Clamped { requested, limit: -FOCUS_SHIFT_LIMIT }
        } else {
            FocusSolution::Focused(requested)
        }
    }
}

impl fmt::Display for FocusSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusSolution::Focused(offset) => write!(f, "{} mm", offset),
            FocusSolution::Clamped { requested, limit } => write!(f, "{} mm (clamped from {} mm)", limit, requested),
            FocusSolution::Failed => write!(f, "failed"),
        }
    }
}

/// Shift estimate of a single adjoint ray: the distance behind the reference plane at
/// which the sensor-side ray crosses the axis.
fn shift_estimate(
    evaluator: &LensEvaluator,
    target: &Point3f,
    aperture: &Point2f,
    wavelength: Float,
    axis: usize
) -> Option<Float> {
    let sample = sample_aperture_backward(evaluator, target, aperture, wavelength).ok()?;
    let direction = sample.sensor.direction[axis];
    if direction <= 0.0 {
        return None;
    }
    let estimate = sample.sensor.position[axis] / direction;
    if estimate.is_finite() {
        Some(estimate)
    } else {
        None
    }
}

fn average_estimates(estimates: &[Float], what: &str) -> FocusSolution {
    if estimates.is_empty() {
        warn!("Focus {}: no adjoint ray reached the sensor", what);
        return FocusSolution::Failed;
    }
    let mean = estimates.iter().sum::<Float>() / estimates.len() as Float;
    let solution = FocusSolution::clamped(mean);
    if let FocusSolution::Clamped { requested, limit } = solution {
        warn!("Focus {}: sensor shift {} mm is out of range, clamped to {} mm", what, requested, limit);
    }
    debug!("Focus {}: {} estimates, shift {}", what, estimates.len(), solution);
    solution
}

/// Sensor shift that focuses the lens at `focus_distance` millimeters in front of the
/// outer pupil. Averages the adjoint estimates of aperture points at small fractions of
/// the housing radius on both axes and both sides.
pub fn camera_set_focus(profile: &LensProfile, evaluator: &LensEvaluator, focus_distance: Float) -> FocusSolution {
    let target = Point3f::new(0.0, 0.0, focus_distance);
    let mut estimates: SmallVec<[Float; 4 * FOCUS_SAMPLES]> = SmallVec::new();
    for s in 1..=FOCUS_SAMPLES {
        let offset = profile.aperture_housing_radius * (s as Float / (FOCUS_SAMPLES + 1) as Float) * 0.1;
        for axis in 0..2 {
            for &sign in &[1.0, -1.0] {
                let mut aperture = Point2f::zero();
                aperture[axis] = sign * offset;
                if let Some(estimate) = shift_estimate(evaluator, &target, &aperture, profile.wavelength, axis) {
                    estimates.push(estimate);
                }
            }
        }
    }
    average_estimates(&estimates, &format!("at {} mm", focus_distance))
}

/// Sensor shift that focuses a parallel bundle.
pub fn camera_set_focus_infinity(profile: &LensProfile, evaluator: &LensEvaluator) -> FocusSolution {
    let h = profile.aperture_housing_radius * 0.1;
    let target = Point3f::new(0.0, h, BIG);
    let aperture = Point2f::new(0.0, h);
    let estimates: SmallVec<[Float; 1]> = shift_estimate(evaluator, &target, &aperture, profile.wavelength, 1)
        .into_iter()
        .collect();
    average_estimates(&estimates, "at infinity")
}

/// Candidate shifts of the logarithmic search, denser near zero.
pub fn logarithmic_values() -> Vec<Float> {
    let (min, max) = (0.0, FOCUS_SHIFT_LIMIT);
    let steps = (2.0 / LOG_SEARCH_STEP).round() as usize;
    (0..=steps)
        .map(|k| {
            let t = -1.0 + k as Float * LOG_SEARCH_STEP;
            t.signum() * t * t * (max - min) + min
        })
        .collect()
}

/// Distance along the axis at which the probe ray traced with `sensor_shift` crosses
/// the plane `y = 0`, or `None` if the probe is rejected.
pub fn trace_ray_focus_check(profile: &LensProfile, evaluator: &LensEvaluator, sensor_shift: Float) -> Option<Float> {
    let aperture = Point2f::new(0.0, profile.aperture_housing_radius * 0.25);
    let sensor = LightFieldState::at(Point2f::zero(), profile.wavelength);
    let mut sensor = sample_aperture(evaluator, &sensor, &aperture, sensor_shift).ok()?.sensor;
    sensor.propagate(sensor_shift);

    let (out, transmittance) = evaluator.evaluate(&sensor);
    if transmittance <= 0.0
        || !profile.outer_pupil.contains(&out.position)
        || !profile.inner_pupil.contains(&sensor.project(profile.back_focal_length)) {
        return None;
    }

    let (origin, direction) = profile.outer_pupil.to_camera_space(&out.position, &out.direction);
    if direction.y.abs() < 1.0e-12 {
        return None;
    }
    let z = origin.z + direction.z * (-origin.y / direction.y);
    if z.is_finite() {
        Some(z)
    } else {
        None
    }
}

/// Search the candidate shifts for the one whose probe ray crosses the axis closest to,
/// without passing, `focus_distance`.
pub fn logarithmic_focus_search(profile: &LensProfile, evaluator: &LensEvaluator, focus_distance: Float) -> FocusSolution {
    let candidates = logarithmic_values();
    let best = candidates
        .par_iter()
        .enumerate()
        .filter_map(|(index, &shift)| {
            let z = trace_ray_focus_check(profile, evaluator, shift)?;
            let gap = focus_distance - z;
            if z > 0.0 && gap >= 0.0 { Some((gap, index, shift)) } else { None }
        })
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));

    match best {
        Some((gap, _, shift)) => {
            info!("Logarithmic focus search: {} mm -> shift {} mm (gap {})", focus_distance, shift, gap);
            FocusSolution::Focused(shift)
        }
        None => {
            warn!("Logarithmic focus search at {} mm found no candidate", focus_distance);
            FocusSolution::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lens_model::LensModelId;
    use crate::lenses::{IdentityLens, ThinLens};
    use std::sync::Arc;

    fn setup(model: Arc<dyn crate::core::lens_model::LensModel>) -> (LensProfile, LensEvaluator) {
        let evaluator = LensEvaluator::from_model(LensModelId(7), model);
        let profile = LensProfile::for_model(LensModelId(7), evaluator.constants());
        (profile, evaluator)
    }

    #[test]
    fn thin_lens_average_focus() {
        let (profile, evaluator) = setup(Arc::new(ThinLens::default()));
        for &d in &[500.0, 1000.0, 5000.0] {
            let expected = 50.0 * 50.0 / (d - 50.0);
            match camera_set_focus(&profile, &evaluator, d) {
                FocusSolution::Focused(shift) => assert!((shift - expected).abs() < 1e-9, "{} vs {}", shift, expected),
                other => panic!("unexpected {}", other),
            }
        }
    }

    #[test]
    fn close_focus_is_clamped() {
        let (profile, evaluator) = setup(Arc::new(ThinLens::default()));
        // f²/(d - f) = 2500 / 5
        let solution = camera_set_focus(&profile, &evaluator, 55.0);
        match solution {
            FocusSolution::Clamped { requested, limit } => {
                assert!((requested - 500.0).abs() < 1e-6);
                assert_eq!(limit, FOCUS_SHIFT_LIMIT);
            }
            other => panic!("unexpected {}", other),
        }
        assert!((solution.offset() - 45.0).abs() < 1e-12);
    }

    #[test]
    fn identity_focus_is_negative_and_bounded() {
        let (profile, evaluator) = setup(Arc::new(IdentityLens::default()));
        let solution = camera_set_focus(&profile, &evaluator, 1000.0);
        assert!(solution.offset() < 0.0);
        assert!(solution.offset() >= -FOCUS_SHIFT_LIMIT);
        assert!(matches!(solution, FocusSolution::Clamped { .. }));
    }

    #[test]
    fn infinity_focus_of_thin_lens_is_zero() {
        let (profile, evaluator) = setup(Arc::new(ThinLens::default()));
        let solution = camera_set_focus_infinity(&profile, &evaluator);
        assert!(solution.offset().abs() < 1e-6, "{}", solution);
    }

    #[test]
    fn failed_focus_has_zero_offset() {
        let (mut profile, evaluator) = setup(Arc::new(ThinLens::default()));
        // every aperture offset lands outside the pupil
        profile.aperture_housing_radius = 1.0e4;
        let solution = camera_set_focus(&profile, &evaluator, 1000.0);
        assert!(solution.is_failed());
        assert_eq!(solution.offset(), 0.0);
    }

    #[test]
    fn logarithmic_candidates() {
        let values = logarithmic_values();
        assert_eq!(values.len(), 20001);
        assert!((values[0] + 45.0).abs() < 1e-9);
        assert!(values[10000].abs() < 1e-9);
        assert!((values[20000] - 45.0).abs() < 1e-9);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn focus_check_of_thin_lens() {
        let (profile, evaluator) = setup(Arc::new(ThinLens::default()));
        // the probe crosses the axis at f (f + s) / s
        let z = trace_ray_focus_check(&profile, &evaluator, 2.5).unwrap();
        assert!((z - 50.0 * 52.5 / 2.5).abs() < 1e-6);
        assert_eq!(trace_ray_focus_check(&profile, &evaluator, 0.0), None);
    }

    #[test]
    fn logarithmic_search_agrees_with_average() {
        let (profile, evaluator) = setup(Arc::new(ThinLens::default()));
        let expected = 50.0 * 50.0 / 950.0;
        let shift = logarithmic_focus_search(&profile, &evaluator, 1000.0).offset();
        assert!(shift >= expected - 1e-9);
        assert!((shift - expected).abs() < 0.01, "{} vs {}", shift, expected);
        let average = camera_set_focus(&profile, &evaluator, 1000.0).offset();
        assert!((shift - average).abs() < 0.01);
    }
}
