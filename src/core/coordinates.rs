//! Conversions between the 2D parametrization of an optical surface and camera space.
//!
//! Lens models report rays as a position on a pupil surface plus a direction encoded
//! relative to that surface. The converters here turn those into 3D positions and
//! unit directions in the lens frame (millimeters, +z towards the scene) and back.

use super::lentil::{Float, safe_sqrt, non_zero};
use super::geometry::{Point2f, Point3f, Vector2f, Vector3f};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Orthonormal frame around a surface normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TangentFrame {
    pub ex: Vector3f,
    pub ey: Vector3f,
    pub n: Vector3f
}

impl TangentFrame {
    /// `ex = normalize(n.z, 0, -n.x)`, `ey = n x ex`. A normal along the y axis has no
    /// such tangent, the frame then uses the x axis.
    pub fn from_normal(n: Vector3f) -> TangentFrame {
        let seed = Vector3f::new(n.z, 0.0, -n.x);
        let len = seed.length();
        let ex = if len > 0.0 {
            seed * (1.0 / len)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let ey = n.cross(&ex);
        TangentFrame { ex, ey, n }
    }

    /// Direction from its components in the frame.
    #[inline]
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.ex * v.x + self.ey * v.y + self.n * v.z
    }

    /// Project a direction onto the tangent plane.
    #[inline]
    pub fn to_local(&self, d: &Vector3f) -> Vector2f {
        Vector2f::new(d.dot(&self.ex), d.dot(&self.ey))
    }
}

/// Which axis a cylindrical surface is curved around.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CylinderAxis {
    /// Axis along x, the normal varies in y.
    X,
    /// Axis along y, the normal varies in x.
    Y
}

/// Direction with its third component synthesized on the unit hemisphere.
#[inline]
fn hemisphere_direction(dir: &Vector2f) -> Vector3f {
    Vector3f::new(dir.x, dir.y, safe_sqrt(1.0 - dir.x * dir.x - dir.y * dir.y))
}

pub fn plane_to_camera(pos: &Point2f, dir: &Vector2f, plane_z: Float) -> (Point3f, Vector3f) {
    (
        Point3f::new(pos.x, pos.y, plane_z),
        Vector3f::new(dir.x, dir.y, 1.0).normalize()
    )
}

/// Intersect a ray with the plane `z = plane_z`, direction rescaled to two-plane form.
pub fn camera_to_plane(pos: &Point3f, dir: &Vector3f, plane_z: Float) -> (Point2f, Vector2f) {
    let dz = non_zero(dir.z);
    let t = (plane_z - pos.z) / dz;
    (
        Point2f::new(pos.x + t * dir.x, pos.y + t * dir.y),
        Vector2f::new(dir.x, dir.y) / dz.abs()
    )
}

pub fn sphere_to_camera(pos: &Point2f, dir: &Vector2f, center: Float, radius: Float) -> (Point3f, Vector3f) {
    let n = Vector3f::new(
        pos.x / radius,
        pos.y / radius,
        safe_sqrt(radius * radius - pos.x * pos.x - pos.y * pos.y) / radius.abs()
    );
    let frame = TangentFrame::from_normal(n);
    (
        Point3f::new(pos.x, pos.y, n.z * radius + center),
        frame.to_world(&hemisphere_direction(dir))
    )
}

pub fn camera_to_sphere(pos: &Point3f, dir: &Vector3f, center: Float, radius: Float) -> (Point2f, Vector2f) {
    let n = Vector3f::new(
        pos.x / radius,
        pos.y / radius,
        ((pos.z - center) / radius).abs()
    );
    let frame = TangentFrame::from_normal(n);
    (Point2f::new(pos.x, pos.y), frame.to_local(&dir.normalize()))
}

fn cylinder_normal(pos: &Point2f, radius: Float, axis: CylinderAxis, nz: Float) -> Vector3f {
    match axis {
        CylinderAxis::Y => Vector3f::new(pos.x / radius, 0.0, nz),
        CylinderAxis::X => Vector3f::new(0.0, pos.y / radius, nz),
    }
}

pub fn cylinder_to_camera(pos: &Point2f, dir: &Vector2f, center: Float, radius: Float, axis: CylinderAxis) -> (Point3f, Vector3f) {
    let across = match axis {
        CylinderAxis::Y => pos.x,
        CylinderAxis::X => pos.y,
    };
    let nz = safe_sqrt(radius * radius - across * across) / radius.abs();
    let frame = TangentFrame::from_normal(cylinder_normal(pos, radius, axis, nz));
    (
        Point3f::new(pos.x, pos.y, nz * radius + center),
        frame.to_world(&hemisphere_direction(dir))
    )
}

pub fn camera_to_cylinder(pos: &Point3f, dir: &Vector3f, center: Float, radius: Float, axis: CylinderAxis) -> (Point2f, Vector2f) {
    let p = Point2f::new(pos.x, pos.y);
    let nz = ((pos.z - center) / radius).abs();
    let frame = TangentFrame::from_normal(cylinder_normal(&p, radius, axis, nz));
    (p, frame.to_local(&dir.normalize()))
}

/// Surface kind of a pupil.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PupilGeometry {
    Plane,
    Sphere,
    CylinderX,
    CylinderY
}

impl FromStr for PupilGeometry {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plane" | "planar" => Ok(PupilGeometry::Plane),
            "sphere" | "spherical" => Ok(PupilGeometry::Sphere),
            "cyl-x" | "cylinder-x" => Ok(PupilGeometry::CylinderX),
            "cyl-y" | "cylinder-y" => Ok(PupilGeometry::CylinderY),
            _ => Err(io::Error::new(io::ErrorKind::InvalidData,
                format!("unknown pupil geometry \"{}\"", s)))
        }
    }
}

impl fmt::Display for PupilGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PupilGeometry::Plane => "plane",
            PupilGeometry::Sphere => "spherical",
            PupilGeometry::CylinderX => "cyl-x",
            PupilGeometry::CylinderY => "cyl-y",
        };
        write!(f, "{}", name)
    }
}

/// A pupil of a lens system: the surface the model reports rays on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PupilSurface {
    pub geometry: PupilGeometry,
    /// Clear radius of the pupil in millimeters.
    pub radius: Float,
    pub curvature_radius: Float,
    /// Axial position of the surface vertex.
    pub vertex_z: Float
}

impl PupilSurface {
    pub fn new(geometry: PupilGeometry, radius: Float, curvature_radius: Float, vertex_z: Float) -> PupilSurface {
        PupilSurface { geometry, radius, curvature_radius, vertex_z }
    }

    pub fn plane(radius: Float, vertex_z: Float) -> PupilSurface {
        PupilSurface::new(PupilGeometry::Plane, radius, 0.0, vertex_z)
    }

    /// Axial position of the center of curvature.
    #[inline]
    pub fn center(&self) -> Float {
        self.vertex_z - self.curvature_radius
    }

    /// True when `p` lies on the clear disk of the pupil.
    #[inline]
    pub fn contains(&self, p: &Point2f) -> bool {
        p.radius_squared() <= self.radius * self.radius
    }

    pub fn to_camera_space(&self, pos: &Point2f, dir: &Vector2f) -> (Point3f, Vector3f) {
        match self.geometry {
            PupilGeometry::Plane => plane_to_camera(pos, dir, self.vertex_z),
            PupilGeometry::Sphere => sphere_to_camera(pos, dir, self.center(), self.curvature_radius),
            PupilGeometry::CylinderX =>
                cylinder_to_camera(pos, dir, self.center(), self.curvature_radius, CylinderAxis::X),
            PupilGeometry::CylinderY =>
                cylinder_to_camera(pos, dir, self.center(), self.curvature_radius, CylinderAxis::Y),
        }
    }

    pub fn from_camera_space(&self, pos: &Point3f, dir: &Vector3f) -> (Point2f, Vector2f) {
        match self.geometry {
            PupilGeometry::Plane => camera_to_plane(pos, dir, self.vertex_z),
            PupilGeometry::Sphere => camera_to_sphere(pos, dir, self.center(), self.curvature_radius),
            PupilGeometry::CylinderX =>
                camera_to_cylinder(pos, dir, self.center(), self.curvature_radius, CylinderAxis::X),
            PupilGeometry::CylinderY =>
                camera_to_cylinder(pos, dir, self.center(), self.curvature_radius, CylinderAxis::Y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Float = 1e-9;

    fn assert_close2(a: Point2f, b: Point2f) {
        assert!((a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS, "{} != {}", a, b);
    }

    fn assert_close_dir(a: Vector2f, b: Vector2f) {
        assert!((a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS, "{} != {}", a, b);
    }

    fn round_trip(surface: &PupilSurface, pos: Point2f, dir: Vector2f) {
        let (p3, d3) = surface.to_camera_space(&pos, &dir);
        assert!((d3.length() - 1.0).abs() < EPS);
        let (p2, d2) = surface.from_camera_space(&p3, &d3);
        assert_close2(p2, pos);
        assert_close_dir(d2, dir);
    }

    #[test]
    fn plane_round_trip() {
        let surface = PupilSurface::plane(10.0, 3.0);
        let pos = Point2f::new(1.5, -2.0);
        let dir = Vector2f::new(0.2, -0.1);
        let (p3, d3) = surface.to_camera_space(&pos, &dir);
        assert_eq!(p3.z, 3.0);
        let (p2, d2) = surface.from_camera_space(&p3, &d3);
        assert_close2(p2, pos);
        assert_close_dir(d2, dir);
    }

    #[test]
    fn plane_inverse_intersects() {
        let (p, d) = camera_to_plane(&Point3f::new(0.0, 0.0, 0.0), &Vector3f::new(1.0, 0.0, 2.0), 4.0);
        assert_close2(p, Point2f::new(2.0, 0.0));
        assert_close_dir(d, Vector2f::new(0.5, 0.0));
    }

    #[test]
    fn plane_inverse_grazing_is_finite() {
        let (p, d) = camera_to_plane(&Point3f::new(0.0, 0.0, 0.0), &Vector3f::new(1.0, 0.0, 0.0), 4.0);
        assert!(p.is_finite());
        assert!(d.is_finite());
    }

    #[test]
    fn sphere_round_trip() {
        for &r in &[30.0, -45.0] {
            let surface = PupilSurface::new(PupilGeometry::Sphere, 12.0, r, 0.0);
            round_trip(&surface, Point2f::new(3.0, -4.0), Vector2f::new(0.1, 0.3));
            round_trip(&surface, Point2f::new(0.0, 0.0), Vector2f::new(-0.2, 0.0));
        }
    }

    #[test]
    fn sphere_vertex_on_axis() {
        let surface = PupilSurface::new(PupilGeometry::Sphere, 12.0, 30.0, 5.0);
        let (p, d) = surface.to_camera_space(&Point2f::zero(), &Vector2f::zero());
        assert!((p.z - 5.0).abs() < EPS);
        assert!((d.z - 1.0).abs() < EPS);
    }

    #[test]
    fn cylinder_round_trip() {
        for &geometry in &[PupilGeometry::CylinderX, PupilGeometry::CylinderY] {
            let surface = PupilSurface::new(geometry, 12.0, 25.0, 0.0);
            round_trip(&surface, Point2f::new(3.0, -4.0), Vector2f::new(0.1, 0.3));
            round_trip(&surface, Point2f::new(-6.0, 2.0), Vector2f::new(-0.25, 0.05));
        }
    }

    #[test]
    fn cylinder_normal_is_constant_along_axis() {
        // a y-axis cylinder ignores y when placing the point
        let (a, _) = cylinder_to_camera(&Point2f::new(2.0, 0.0), &Vector2f::zero(), 0.0, 10.0, CylinderAxis::Y);
        let (b, _) = cylinder_to_camera(&Point2f::new(2.0, 9.0), &Vector2f::zero(), 0.0, 10.0, CylinderAxis::Y);
        assert!((a.z - b.z).abs() < EPS);
        let (c, _) = cylinder_to_camera(&Point2f::new(0.0, 2.0), &Vector2f::zero(), 0.0, 10.0, CylinderAxis::X);
        assert!((a.z - c.z).abs() < EPS);
    }

    #[test]
    fn outside_disk_clamps_without_nan() {
        let (p, d) = sphere_to_camera(&Point2f::new(20.0, 20.0), &Vector2f::new(0.9, 0.9), -10.0, 10.0);
        assert!(p.is_finite() && d.is_finite());
        assert!((p.z + 10.0).abs() < EPS);
        let (p, d) = cylinder_to_camera(&Point2f::new(20.0, 0.0), &Vector2f::zero(), 0.0, 10.0, CylinderAxis::Y);
        assert!(p.is_finite() && d.is_finite());
    }

    #[test]
    fn frame_falls_back_on_degenerate_seed() {
        let frame = TangentFrame::from_normal(Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(frame.ex, Vector3f::new(1.0, 0.0, 0.0));
        assert!(frame.ey.is_finite());
    }

    #[test]
    fn geometry_names() {
        assert_eq!("cyl-y".parse::<PupilGeometry>().unwrap(), PupilGeometry::CylinderY);
        assert_eq!("spherical".parse::<PupilGeometry>().unwrap(), PupilGeometry::Sphere);
        assert!("torus".parse::<PupilGeometry>().is_err());
        assert_eq!(PupilGeometry::CylinderX.to_string(), "cyl-x");
    }

    #[test]
    fn pupil_center_and_crop() {
        let surface = PupilSurface::new(PupilGeometry::Sphere, 5.0, 30.0, 50.0);
        assert_eq!(surface.center(), 20.0);
        assert!(surface.contains(&Point2f::new(3.0, 4.0)));
        assert!(!surface.contains(&Point2f::new(3.0, 4.1)));
    }
}
