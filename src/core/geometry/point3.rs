use std::ops::*;
use std::fmt;
use num;
use super::super::lentil::Float;
use super::Vector3;

pub type Point3f = Point3<Float>;

/// A 3D Point.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
#[repr(C)]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

impl<T> Point3<T> {
    pub fn new(x: T, y: T, z: T) -> Point3<T> {
        Point3::<T>{x, y, z}
    }

    /// Create a new Point3 with all components 0.
    pub fn zero() -> Point3<T>
    where
    T: num::Zero
    {
        Point3::<T>{x: T::zero(), y: T::zero(), z: T::zero()}
    }
}

impl Point3f {
    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index out of range for Point3"),
        }
    }
}

impl<T> Neg for Point3<T>
where
T: Neg<Output = T>
{
    type Output = Point3<T>;
    fn neg(self) -> Point3<T> {
        Point3::<T>{x: -self.x, y: -self.y, z: -self.z}
    }
}

impl<T> Add<Vector3<T>> for Point3<T>
where
T: Add<Output = T>
{
    type Output = Point3<T>;
    fn add(self, rhs: Vector3<T>) -> Point3<T> {
        Point3::<T>{x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z}
    }
}

impl<T> Sub<Point3<T>> for Point3<T>
where
T: Sub<Output = T>
{
    type Output = Vector3<T>;
    fn sub(self, rhs: Point3<T>) -> Vector3<T> {
        Vector3::<T>{x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z}
    }
}

impl<T> Mul<T> for Point3<T>
where
T: Copy + Mul<Output = T>
{
    type Output = Point3<T>;
    fn mul(self, rhs: T) -> Point3<T> {
        Point3::<T>{x: self.x * rhs, y: self.y * rhs, z: self.z * rhs}
    }
}

impl<T> MulAssign<T> for Point3<T>
where
T: Copy + MulAssign
{
    fn mul_assign(&mut self, rhs: T) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl<T> fmt::Display for Point3<T>
where
T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}
