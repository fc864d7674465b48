use crate::core::lentil::{Float, consts::PI};
use crate::core::bokeh::BokehShape;
use crate::core::geometry::Point2f;
use crate::core::sampling::uniform_sample_triangle;

/// Regular polygon inscribed in the unit circle, one triangle per diaphragm blade.
#[derive(Debug, Clone)]
pub struct PolygonBokeh {
    vertices: Vec<Point2f>
}

impl PolygonBokeh {
    pub fn new(blades: u32) -> PolygonBokeh {
        let blades = blades.max(3);
        let vertices = (0..blades)
            .map(|k| {
                let phi = 2.0 * PI * k as Float / blades as Float;
                Point2f::new(phi.cos(), phi.sin())
            })
            .collect();
        PolygonBokeh { vertices }
    }

    pub fn blades(&self) -> usize {
        self.vertices.len()
    }
}

impl BokehShape for PolygonBokeh {
    fn sample(&self, u: &Point2f) -> Point2f {
        let n = self.vertices.len();
        // pick the blade with u.x and reuse the remainder
        let scaled = u.x * n as Float;
        let k = (scaled as usize).min(n - 1);
        let remapped = Point2f::new((scaled - k as Float).min(1.0), u.y);
        let b = uniform_sample_triangle(&remapped);
        let v0 = self.vertices[k];
        let v1 = self.vertices[(k + 1) % n];
        Point2f::new(b.x * v0.x + b.y * v1.x, b.x * v0.y + b.y * v1.y)
    }
}
