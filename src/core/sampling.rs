//! 1D and 2D sampling structures and the warping functions used for aperture samples.

use super::lentil::{Float, find_interval, consts::{FRAC_PI_4, FRAC_PI_2}};
use super::geometry::{Point2f, Vector2f};

#[derive(Debug, Clone)]
pub struct Distribution1D {
    /// Piecewise-constant function values.
    pub func: Vec<Float>,
    /// Cumulative distribution function, `func.len() + 1` entries.
    pub cdf: Vec<Float>,
    /// The integral of the function.
    pub func_int: Float
}

impl Distribution1D {
    /// Build the distribution of a piecewise-constant function over [0, 1].
    /// A function that integrates to zero falls back to a uniform CDF.
    pub fn new(f: &[Float]) -> Distribution1D {
        let n = f.len();
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..=n {
            let prev = cdf[i - 1];
            cdf.push(prev + f[i - 1] / n as Float);
        }

        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, c) in cdf.iter_mut().enumerate().skip(1) {
                *c = i as Float / n as Float;
            }
        } else {
            for c in cdf.iter_mut().skip(1) {
                *c /= func_int;
            }
        }

        Distribution1D {
            func: f.to_vec(),
            cdf,
            func_int
        }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Sample the distribution with `u` and return `(x, pdf, offset)` with `x` in [0, 1).
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let mut du = u - self.cdf[offset];
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        }
        let pdf = if self.func_int > 0.0 { self.func[offset] / self.func_int } else { 0.0 };
        ((offset as Float + du) / self.count() as Float, pdf, offset)
    }
}

/// Piecewise-constant 2D distribution built from a row-major `nu x nv` grid.
#[derive(Debug, Clone)]
pub struct Distribution2D {
    p_conditional_v: Vec<Distribution1D>,
    p_marginal: Distribution1D,
}

impl Distribution2D {
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Distribution2D {
        let p_conditional_v: Vec<Distribution1D> = func
            .chunks(nu)
            .take(nv)
            .map(Distribution1D::new)
            .collect();
        let marginal_func: Vec<Float> = p_conditional_v.iter().map(|d| d.func_int).collect();
        Distribution2D {
            p_marginal: Distribution1D::new(&marginal_func),
            p_conditional_v,
        }
    }

    /// Total integral of the function over the unit square.
    pub fn integral(&self) -> Float {
        self.p_marginal.func_int
    }

    /// Warp `u` to a point in [0, 1)² distributed proportionally to the function.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u[1]);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u[0]);
        (Point2f::new(d0, d1), pdf0 * pdf1)
    }
}

/// Map a uniform sample to the unit disk, preserving stratification.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to $[-1,1]^2$
    let u_offset = *u * 2.0 - Vector2f::new(1.0, 1.0);

    // Handle degeneracy at the origin
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::default();
    }

    let theta: Float;
    let r: Float;
    if u_offset.x.abs() > u_offset.y.abs() {
        r = u_offset.x;
        theta = FRAC_PI_4 * (u_offset.y / u_offset.x);
    } else {
        r = u_offset.y;
        theta = FRAC_PI_2 - FRAC_PI_4 * (u_offset.x / u_offset.y);
    }
    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Uniformly sample barycentric coordinates over the unit triangle.
pub fn uniform_sample_triangle(u: &Point2f) -> Point2f {
    let su0 = u.x.sqrt();
    Point2f::new(1.0 - su0, u.y * su0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concentric_disk_stays_inside() {
        for i in 0..32 {
            for j in 0..32 {
                let u = Point2f::new(i as Float / 31.0, j as Float / 31.0);
                assert!(concentric_sample_disk(&u).radius_squared() <= 1.0 + 1e-9);
            }
        }
        assert_eq!(concentric_sample_disk(&Point2f::new(0.5, 0.5)), Point2f::new(0.0, 0.0));
    }

    #[test]
    fn triangle_samples_are_barycentric() {
        let b = uniform_sample_triangle(&Point2f::new(0.3, 0.8));
        assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0);
    }

    #[test]
    fn distribution1d_skips_zero_cells() {
        let d = Distribution1D::new(&[0.0, 1.0, 0.0, 1.0]);
        for k in 0..100 {
            let (x, pdf, offset) = d.sample_continuous(k as Float / 100.0);
            assert!(offset == 1 || offset == 3);
            assert!(pdf > 0.0);
            assert!(x >= 0.25);
        }
    }

    #[test]
    fn distribution1d_zero_function_is_uniform() {
        let d = Distribution1D::new(&[0.0, 0.0]);
        assert_eq!(d.func_int, 0.0);
        let (x, _, _) = d.sample_continuous(0.75);
        assert!((x - 0.75).abs() < 1e-9);
    }

    #[test]
    fn distribution2d_samples_bright_cell() {
        // 2x2 grid with only the (u=1, v=0) cell lit
        let d = Distribution2D::new(&[0.0, 1.0, 0.0, 0.0], 2, 2);
        assert!(d.integral() > 0.0);
        let (p, pdf) = d.sample_continuous(&Point2f::new(0.1, 0.9));
        assert!(p.x >= 0.5 && p.y < 0.5);
        assert!((pdf - 4.0).abs() < 1e-9);
    }
}
