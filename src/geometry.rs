//! Rays, planes and the shapes used for picking
//!
//! Intersection routines return distances along the ray rather than points
//! so callers can tie-break on the nearest hit.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Half-line starting at `origin` going along the unit vector `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the plane, or `None` if parallel to it or behind the origin
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < f32::EPSILON {
            // A ray lying in the plane hits it at its origin
            return (plane.distance_to_point(self.origin).abs() < f32::EPSILON).then_some(0.0);
        }

        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Distance to the first hit on a sphere
    ///
    /// A ray starting inside the sphere reports the exit point.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let dist_sq = to_center.length_squared() - along * along;
        let radius_sq = radius * radius;
        if dist_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - dist_sq).sqrt();
        let t0 = along - half_chord;
        let t1 = along + half_chord;
        if t1 < 0.0 {
            None
        } else if t0 < 0.0 {
            Some(t1)
        } else {
            Some(t0)
        }
    }

    /// Distance to the first hit on an axis-aligned box (slab test)
    pub fn intersect_box(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            if dir.abs() < f32::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let (near, far) = {
                let a = (min[axis] - origin) * inv;
                let b = (max[axis] - origin) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            None
        } else if t_min >= 0.0 {
            Some(t_min)
        } else {
            Some(t_max)
        }
    }
}

/// Plane `normal . p + constant = 0` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Plane through `point` perpendicular to `normal`
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    /// Signed distance from the plane to `point`
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

/// Pickable surface of a node, centered at the node's current position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PickShape {
    /// Axis-aligned cube
    Cube { half_extent: f32 },
    /// Sphere
    Sphere { radius: f32 },
}

impl PickShape {
    /// Cube matching a node of the given visual size (edge `0.4 * size`)
    pub fn for_node_size(size: f32) -> Self {
        PickShape::Cube {
            half_extent: 0.2 * size,
        }
    }

    /// Distance along `ray` to this shape placed at `center`
    pub fn intersect(&self, ray: &Ray, center: Vec3) -> Option<f32> {
        match *self {
            PickShape::Cube { half_extent } => {
                let half = Vec3::splat(half_extent);
                ray.intersect_box(center - half, center + half)
            }
            PickShape::Sphere { radius } => ray.intersect_sphere(center, radius),
        }
    }
}

/// Placement of a connecting segment modeled along its local +Z axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for SegmentTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl SegmentTransform {
    /// Transform making a unit segment span exactly from `start` to `end`
    pub fn spanning(start: Vec3, end: Vec3) -> Self {
        let diff = end - start;
        let distance = diff.length();
        let rotation = if distance > f32::EPSILON {
            Quat::from_rotation_arc(Vec3::Z, diff / distance)
        } else {
            Quat::IDENTITY
        };

        Self {
            position: (start + end) * 0.5,
            rotation,
            scale: Vec3::new(1.0, 1.0, distance),
        }
    }

    /// World-space endpoints of a unit segment centered on the local origin
    pub fn endpoints(&self) -> (Vec3, Vec3) {
        let half = self.rotation * Vec3::new(0.0, 0.0, 0.5 * self.scale.z);
        (self.position - half, self.position + half)
    }
}
