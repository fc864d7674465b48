use std::ops::*;
use std::fmt;
use num;
use super::super::lentil::Float;
use super::Vector2;

pub type Point2f = Point2<Float>;
pub type Point2i = Point2<i32>;

/// A 2D Point.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
#[repr(C)]
pub struct Point2<T> {
    pub x: T,
    pub y: T
}

impl<T> Point2<T> {
    pub fn new(x: T, y: T) -> Point2<T> {
        Point2::<T>{x, y}
    }

    /// Create a new Point2 with both components 0.
    pub fn zero() -> Point2<T>
    where
    T: num::Zero
    {
        Point2::<T>{
            x: T::zero(),
            y: T::zero()
        }
    }
}

impl Point2f {
    /// Squared distance from the origin, the quantity every pupil test compares against.
    #[inline]
    pub fn radius_squared(&self) -> Float {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Index out of range for Point2"),
        }
    }
}

impl<T> IndexMut<usize> for Point2<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Index out of range for Point2"),
        }
    }
}

impl<T> Add<Vector2<T>> for Point2<T>
where
T: Add<Output = T>
{
    type Output = Point2<T>;
    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2::<T>{x: self.x + rhs.x, y: self.y + rhs.y}
    }
}

impl<T> Sub<Point2<T>> for Point2<T>
where
T: Sub<Output = T>
{
    type Output = Vector2<T>;
    fn sub(self, rhs: Point2<T>) -> Vector2<T> {
        Vector2::<T>{x: self.x - rhs.x, y: self.y - rhs.y}
    }
}

impl<T> Sub<Vector2<T>> for Point2<T>
where
T: Sub<Output = T>
{
    type Output = Point2<T>;
    fn sub(self, rhs: Vector2<T>) -> Point2<T> {
        Point2::<T>{x: self.x - rhs.x, y: self.y - rhs.y}
    }
}

impl<T> Mul<T> for Point2<T>
where
T: Copy + Mul<Output = T>
{
    type Output = Point2<T>;
    fn mul(self, rhs: T) -> Point2<T> {
        Point2::<T>{x: self.x * rhs, y: self.y * rhs}
    }
}

impl Mul<Point2<Float>> for Float {
    type Output = Point2<Float>;
    fn mul(self, rhs: Point2<Float>) -> Point2<Float> {
        rhs * self
    }
}

impl<T> fmt::Display for Point2<T>
where
T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {} ]", self.x, self.y)
    }
}
