use crate::core::lentil::Float;
use crate::core::bokeh::BokehShape;
use crate::core::geometry::Point2f;
use crate::core::sampling::Distribution2D;
use image::ImageError;
use std::io;
use std::path::Path;

/// Aperture shaped by an image: samples are distributed proportionally to texel
/// luminance over the square [-1, 1]².
#[derive(Debug, Clone)]
pub struct ImageBokeh {
    width: usize,
    height: usize,
    distribution: Distribution2D
}

impl ImageBokeh {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<ImageBokeh> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            error!("Error loading bokeh image \"{}\": {}", path.display(), e);
            match e {
                ImageError::IoError(e) => e,
                e => io::Error::new(io::ErrorKind::InvalidData, e.to_string())
            }
        })?;
        let rgb = img.to_rgb();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let luminance: Vec<Float> = rgb.pixels().map(|p| {
            let r = Float::from(p[0]) / 255.0;
            let g = Float::from(p[1]) / 255.0;
            let b = Float::from(p[2]) / 255.0;
            0.2126 * r + 0.7152 * g + 0.0722 * b
        }).collect();
        info!("Loaded bokeh image \"{}\" ({}x{})", path.display(), width, height);
        ImageBokeh::from_luminance(&luminance, width, height)
    }

    /// Build from a row-major luminance buffer, row 0 at the top.
    pub fn from_luminance(luminance: &[Float], width: usize, height: usize) -> io::Result<ImageBokeh> {
        if width == 0 || height == 0 || luminance.len() != width * height {
            return Err(io::Error::new(io::ErrorKind::InvalidData,
                format!("bokeh image has {} texels, expected {}x{}", luminance.len(), width, height)));
        }
        let distribution = Distribution2D::new(luminance, width, height);
        if !(distribution.integral() > 0.0) {
            error!("Bokeh image is completely black");
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bokeh image has zero luminance"));
        }
        Ok(ImageBokeh { width, height, distribution })
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl BokehShape for ImageBokeh {
    fn sample(&self, u: &Point2f) -> Point2f {
        let (p, _pdf) = self.distribution.sample_continuous(u);
        Point2f::new(2.0 * p.x - 1.0, 1.0 - 2.0 * p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;

    #[test]
    fn samples_only_bright_texels() {
        // 4x4 image, only the top right texel lit
        let mut lum = vec![0.0; 16];
        lum[3] = 1.0;
        let bokeh = ImageBokeh::from_luminance(&lum, 4, 4).unwrap();
        let mut rng = Rng::new(11);
        for _ in 0..1000 {
            let p = bokeh.sample(&rng.uniform_point2f());
            assert!(p.x >= 0.5 && p.x <= 1.0, "{}", p);
            assert!(p.y >= 0.5 && p.y <= 1.0, "{}", p);
        }
    }

    #[test]
    fn black_image_is_rejected() {
        let err = ImageBokeh::from_luminance(&[0.0; 4], 2, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(ImageBokeh::from_luminance(&[1.0; 3], 2, 2).is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ImageBokeh::open("/nonexistent/bokeh.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
