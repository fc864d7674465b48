use std::ops::*;
use std::fmt;
use num;
use super::super::lentil::Float;
use super::Point3;

pub type Vector3f = Vector3<Float>;

/// Representation of a 3D Vector.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
#[repr(C)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

impl<T> Vector3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Vector3<T> {
        Vector3::<T>{x, y, z}
    }

    #[inline]
    pub fn zero() -> Vector3<T>
    where
    T: num::Zero
    {
        Vector3::<T>{x: T::zero(), y: T::zero(), z: T::zero()}
    }

    /// Calculate the squared length of the Vector3.
    #[inline]
    pub fn length_squared(&self) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculate the dot product of two Vector3.
    pub fn dot(&self, o: &Vector3<T>) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    /// Calculate the cross product of two Vector3.
    pub fn cross(&self, o: &Vector3<T>) -> Vector3<T>
    where
    T: Copy + Sub<T, Output = T> + Mul<T, Output = T>
    {
        Vector3::<T>{
            x: (self.y * o.z) - (self.z * o.y),
            y: (self.z * o.x) - (self.x * o.z),
            z: (self.x * o.y) - (self.y * o.x)
        }
    }
}

impl Vector3f {
    /// Calculate the length of the Vector3.
    #[inline]
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the Vector3 normalized to unit length.
    pub fn normalize(&self) -> Vector3f {
        *self * (1.0 / self.length())
    }

    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index out of range for Vector3"),
        }
    }
}

impl<T> Neg for Vector3<T>
where
T: Neg<Output = T>
{
    type Output = Vector3<T>;
    fn neg(self) -> Vector3<T> {
        Vector3::<T>{x: -self.x, y: -self.y, z: -self.z}
    }
}

impl<T> Add<Vector3<T>> for Vector3<T>
where
T: Add<Output = T>
{
    type Output = Vector3<T>;
    fn add(self, rhs: Self) -> Self {
        Vector3::<T>{x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z}
    }
}

impl<T> Sub<Vector3<T>> for Vector3<T>
where
T: Sub<Output = T>
{
    type Output = Vector3<T>;
    fn sub(self, rhs: Self) -> Self {
        Vector3::<T>{x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z}
    }
}

impl<T> Mul<T> for Vector3<T>
where
T: Copy + Mul<Output = T>
{
    type Output = Vector3<T>;
    fn mul(self, rhs: T) -> Self {
        Vector3::<T>{x: self.x * rhs, y: self.y * rhs, z: self.z * rhs}
    }
}

impl<T> MulAssign<T> for Vector3<T>
where
T: Copy + MulAssign
{
    fn mul_assign(&mut self, rhs: T) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Mul<Vector3<Float>> for Float {
    type Output = Vector3<Float>;
    fn mul(self, rhs: Vector3<Float>) -> Vector3<Float> {
        rhs * self
    }
}

impl<T> From<Point3<T>> for Vector3<T> {
    fn from(p: Point3<T>) -> Vector3<T> {
        Vector3::<T>{x: p.x, y: p.y, z: p.z}
    }
}

impl<T> fmt::Display for Vector3<T>
where
T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}
