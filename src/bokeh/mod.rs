//! Aperture sampling strategies.

mod disk;
pub use disk::*;
mod polygon;
pub use polygon::*;
mod image_bokeh;
pub use image_bokeh::*;

use crate::core::bokeh::{BokehShape, BokehSettings};
use std::io;

/// Select the aperture strategy: an image when enabled, a polygon with three or more
/// blades, a disk otherwise.
pub fn create_bokeh_shape(settings: &BokehSettings) -> io::Result<Box<dyn BokehShape>> {
    if settings.enable_image {
        match &settings.image_path {
            Some(path) => return Ok(Box::new(ImageBokeh::open(path)?)),
            None => {
                error!("\"bokeh_enable_image\" is set but no \"bokeh_image_path\" was given");
                return Err(io::Error::new(io::ErrorKind::InvalidData, "bokeh image path missing"));
            }
        }
    }
    if settings.aperture_blades >= 3 {
        Ok(Box::new(PolygonBokeh::new(settings.aperture_blades)))
    } else {
        Ok(Box::new(DiskBokeh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Point2f;
    use crate::core::lentil::Float;

    #[test]
    fn selects_strategy() {
        let mut settings = BokehSettings::default();
        let disk = create_bokeh_shape(&settings).unwrap();
        // a corner sample lands on the circle for the disk
        let p = disk.sample(&Point2f::new(1.0, 0.5));
        assert!((p.radius_squared() - 1.0).abs() < 1e-9);

        settings.aperture_blades = 4;
        let square = create_bokeh_shape(&settings).unwrap();
        for i in 0..20 {
            let p = square.sample(&Point2f::new(i as Float / 20.0, 0.999));
            assert!(p.x.abs() + p.y.abs() <= 1.0 + 1e-9);
        }

        settings.enable_image = true;
        assert!(create_bokeh_shape(&settings).is_err());
    }
}
