use crate::core::bokeh::BokehShape;
use crate::core::geometry::Point2f;
use crate::core::sampling::concentric_sample_disk;

/// Circular aperture.
#[derive(Debug, Default, Copy, Clone)]
pub struct DiskBokeh;

impl BokehShape for DiskBokeh {
    fn sample(&self, u: &Point2f) -> Point2f {
        concentric_sample_disk(u)
    }
}
