//! Type definitions and constants.

#[cfg(feature = "float_as_double")]
mod float_mod {
    pub type Float = f64;
    pub mod consts {
        pub use std::f64::consts::*;
    }
}
#[cfg(not(feature = "float_as_double"))]
mod float_mod {
    pub type Float = f32;
    pub mod consts {
        pub use std::f32::consts::*;
    }
}

pub use float_mod::Float;
pub mod consts {
    use super::float_mod::Float;
    pub use super::float_mod::consts::*;
    /// Stand-in for a point at infinity when tracing parallel bundles.
    pub const BIG: Float = 1.0e12;
    /// Smallest magnitude accepted as a divisor for near-grazing directions.
    pub const GRAZING_EPSILON: Float = 1.0e-9;
}

/// Square root clamped to a non-negative argument, so values just outside a
/// pupil disk evaluate to 0 instead of NaN.
#[inline]
pub fn safe_sqrt(v: Float) -> Float {
    v.max(0.0).sqrt()
}

/// Keep a divisor away from zero while preserving its sign.
#[inline]
pub fn non_zero(v: Float) -> Float {
    if v.abs() < consts::GRAZING_EPSILON {
        if v.is_sign_negative() { -consts::GRAZING_EPSILON } else { consts::GRAZING_EPSILON }
    } else {
        v
    }
}

pub fn find_interval<T>(size: usize, predicate: T) -> usize
where
T: Fn(usize) -> bool
{
    let mut first = 0;
    let mut len = size;
    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        // Bisect range based on value of _pred_ at _middle_
        if predicate(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    num::clamp(first.saturating_sub(1), 0, size.saturating_sub(2))
}
