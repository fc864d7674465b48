use hexf::*;
use super::lentil::Float;
use super::geometry::Point2f;

#[cfg(feature = "float_as_double")]
pub const ONE_MINUS_EPSILON: f64 = hexf64!("0x1.fffffffffffffp-1");
#[cfg(not(feature = "float_as_double"))]
pub const ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1");

pub const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
pub const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

const TEA_DELTA: u32 = 0x9e3779b9;

/// PCG pseudo-random number generator used as the per-sample random stream for
/// aperture retries.
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64
}

impl Rng {
    pub fn new(seed: u64) -> Rng {
        let mut rng = Rng::default();
        rng.set_sequence(seed);
        rng
    }

    /// Seed a stream from a pixel index and sample number so every sample of every
    /// pixel draws an independent, reproducible sequence.
    pub fn for_sample(pixel: u32, sample: u32) -> Rng {
        let (v0, v1) = tea(pixel, sample, 4);
        Rng::new((u64::from(v0) << 32) | u64::from(v1))
    }

    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }

    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = ((oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27)) as u32;
        let rot = oldstate.wrapping_shr(59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform sample in [0, 1).
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * hexf64!("0x1.0p-32") as Float)
            .min(ONE_MINUS_EPSILON)
    }

    /// Two independent uniforms packed as a point in [0, 1)².
    pub fn uniform_point2f(&mut self) -> Point2f {
        let x = self.uniform_float();
        let y = self.uniform_float();
        Point2f::new(x, y)
    }
}

impl Default for Rng {
    fn default() -> Rng {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM
        }
    }
}

/// Tiny Encryption Algorithm used as a counter-based hash for seeding.
pub fn tea(val0: u32, val1: u32, rounds: u32) -> (u32, u32) {
    let mut v0 = val0;
    let mut v1 = val1;
    let mut s0 = 0_u32;
    for _ in 0..rounds {
        s0 = s0.wrapping_add(TEA_DELTA);
        v0 = v0.wrapping_add(
            (v1.wrapping_shl(4).wrapping_add(0xa341316c))
                ^ v1.wrapping_add(s0)
                ^ (v1.wrapping_shr(5).wrapping_add(0xc8013ea4)));
        v1 = v1.wrapping_add(
            (v0.wrapping_shl(4).wrapping_add(0xad90777d))
                ^ v0.wrapping_add(s0)
                ^ (v0.wrapping_shr(5).wrapping_add(0x7e95761e)));
    }
    (v0, v1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_float_in_unit_interval() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            assert!(u >= 0.0 && u < 1.0);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::for_sample(12, 3);
        let mut b = Rng::for_sample(12, 3);
        for _ in 0..32 {
            assert_eq!(a.uniform_uint32(), b.uniform_uint32());
        }
    }

    #[test]
    fn different_samples_diverge() {
        let mut a = Rng::for_sample(12, 3);
        let mut b = Rng::for_sample(12, 4);
        let same = (0..32).filter(|_| a.uniform_uint32() == b.uniform_uint32()).count();
        assert!(same < 4);
    }
}
