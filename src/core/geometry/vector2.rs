use std::ops::*;
use std::fmt;
use num;
use super::super::lentil::Float;
use super::Point2;

pub type Vector2f = Vector2<Float>;

/// Representation of a 2D Vector.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
#[repr(C)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T
}

impl<T> Vector2<T> {
    #[inline]
    pub fn new(x: T, y: T) -> Vector2<T> {
        Vector2::<T>{x, y}
    }

    #[inline]
    pub fn zero() -> Vector2<T>
    where
    T: num::Zero
    {
        Vector2::<T>{x: T::zero(), y: T::zero()}
    }

    /// Calculate the squared length of the Vector2.
    #[inline]
    pub fn length_squared(&self) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * self.x + self.y * self.y
    }

    /// Calculate the dot product of two Vector2.
    pub fn dot(&self, o: &Vector2<T>) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * o.x + self.y * o.y
    }
}

impl Vector2f {
    #[inline]
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<T> Index<usize> for Vector2<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Index out of range for Vector2"),
        }
    }
}

impl<T> IndexMut<usize> for Vector2<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Index out of range for Vector2"),
        }
    }
}

impl<T> Neg for Vector2<T>
where
T: Neg<Output = T>
{
    type Output = Vector2<T>;
    fn neg(self) -> Vector2<T> {
        Vector2::<T>{x: -self.x, y: -self.y}
    }
}

impl<T> Add<Vector2<T>> for Vector2<T>
where
T: Add<Output = T>
{
    type Output = Vector2<T>;
    fn add(self, rhs: Self) -> Self {
        Vector2::<T>{x: self.x + rhs.x, y: self.y + rhs.y}
    }
}

impl<T> Sub<Vector2<T>> for Vector2<T>
where
T: Sub<Output = T>
{
    type Output = Vector2<T>;
    fn sub(self, rhs: Self) -> Self {
        Vector2::<T>{x: self.x - rhs.x, y: self.y - rhs.y}
    }
}

impl<T> Mul<T> for Vector2<T>
where
T: Copy + Mul<Output = T>
{
    type Output = Vector2<T>;
    fn mul(self, rhs: T) -> Self {
        Vector2::<T>{x: self.x * rhs, y: self.y * rhs}
    }
}

impl<T> Div<T> for Vector2<T>
where
T: Copy + Div<Output = T>
{
    type Output = Vector2<T>;
    fn div(self, rhs: T) -> Self {
        Vector2::<T>{x: self.x / rhs, y: self.y / rhs}
    }
}

impl Mul<Vector2<Float>> for Float {
    type Output = Vector2<Float>;
    fn mul(self, rhs: Vector2<Float>) -> Vector2<Float> {
        rhs * self
    }
}

impl<T> From<Point2<T>> for Vector2<T> {
    fn from(p: Point2<T>) -> Vector2<T> {
        Vector2::<T>{x: p.x, y: p.y}
    }
}

impl<T> fmt::Display for Vector2<T>
where
T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {} ]", self.x, self.y)
    }
}
