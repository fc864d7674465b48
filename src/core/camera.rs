use super::lentil::Float;
use super::geometry::{Point2f, Point3f};
use super::rng::Rng;
use super::tracer::{CameraRay, OcclusionQuery};
use std::fmt;

pub trait Camera: Send + Sync {
    /// Camera-space ray for a sensor sample. A zero weight marks a vignetted sample.
    fn generate_ray(&self, sample: &CameraSample, rng: &mut Rng) -> CameraRay;

    /// Sensor position in millimeters receiving light from a camera-space scene point.
    fn sensor_position(&self, scene: &Point3f, rng: &mut Rng, occlusion: &dyn OcclusionQuery) -> Option<Point2f>;

    /// Sensor shift applied by the focus calibration, in millimeters.
    fn sensor_shift(&self) -> Float;
}

#[derive(Default, Debug, Copy, Clone)]
pub struct CameraSample {
    /// Sensor coordinate in [-1, 1] across the sensor width.
    pub p_film: Point2f,
    /// Uniform lens sample in [0, 1)².
    pub p_lens: Point2f
}

impl fmt::Display for CameraSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ p_film: {}, p_lens: {} ]", self.p_film, self.p_lens)
    }
}
