use super::geometry::Point2f;
use std::path::PathBuf;

/// Distribution of aperture samples. Maps a uniform sample in [0, 1)² to a point on
/// the unit aperture shape, which the tracer scales by the aperture radius.
pub trait BokehShape: Send + Sync {
    fn sample(&self, u: &Point2f) -> Point2f;
}

/// Aperture shape settings from the lens profile.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BokehSettings {
    /// Number of diaphragm blades, a disk below 3.
    pub aperture_blades: u32,
    pub enable_image: bool,
    pub image_path: Option<PathBuf>
}
