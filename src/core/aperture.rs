//! Aperture-consistent sampling.
//!
//! The forward solve finds the sensor direction that reaches a chosen aperture point,
//! the backward solve finds the sensor state connecting a scene point to an aperture
//! point. Models report non-convergence with zero transmittance; these wrappers turn
//! that, and any non-finite solution, into a rejection.

use super::lentil::Float;
use super::geometry::{Point2f, Point3f};
use super::light_field::LightFieldState;
use super::lens_model::{ApertureSample, BackwardSample};
use super::evaluator::{LensEvaluator, clamp_transmittance};
use super::tracer::Rejection;

/// Forward solve: sensor state and aperture point to a consistent pair of states.
pub fn sample_aperture(
    evaluator: &LensEvaluator,
    sensor: &LightFieldState,
    aperture_point: &Point2f,
    sensor_shift: Float
) -> Result<ApertureSample, Rejection> {
    let mut sample = evaluator.model().sample_aperture(sensor, aperture_point, sensor_shift);
    sample.transmittance = clamp_transmittance(sample.transmittance);
    if sample.transmittance <= 0.0 || !sample.sensor.is_finite() {
        return Err(Rejection::SolverFailed);
    }
    Ok(sample)
}

/// Backward solve: scene point (lens frame, millimeters) and aperture point to the
/// sensor state on the unshifted reference plane.
pub fn sample_aperture_backward(
    evaluator: &LensEvaluator,
    scene: &Point3f,
    aperture_point: &Point2f,
    wavelength: Float
) -> Result<BackwardSample, Rejection> {
    let mut sample = evaluator.model().sample_aperture_backward(scene, aperture_point, wavelength);
    sample.transmittance = clamp_transmittance(sample.transmittance);
    if sample.transmittance <= 0.0 {
        return Err(Rejection::Vignetted);
    }
    if !sample.sensor.is_finite() {
        return Err(Rejection::NonFinite);
    }
    Ok(sample)
}
