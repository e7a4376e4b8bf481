//! Orbit camera
//!
//! The camera always looks at a fixed target. Controllers move it by
//! rotating its offset from the target; picking turns screen points into
//! world-space rays through the cached view-projection matrix.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Ray;

/// Keeps the polar angle away from the poles where look-at degenerates
const POLAR_MARGIN: f32 = 0.1;

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Parallel projection; `frustum_size` is the visible height at zoom 1
    Orthographic { frustum_size: f32, aspect: f32 },
    /// Perspective projection with vertical field of view in radians
    Perspective { fov: f32, aspect: f32 },
}

/// Initial camera placement and projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    /// Orthographic frustum height for landscape viewports
    pub frustum_landscape: f32,
    /// Orthographic frustum height for portrait viewports
    pub frustum_portrait: f32,
    /// Use a perspective projection with this fov (radians) instead
    pub perspective_fov: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ZERO,
            zoom: 1.0,
            near: 0.1,
            far: 1000.0,
            frustum_landscape: 9.0,
            frustum_portrait: 15.0,
            perspective_fov: None,
        }
    }
}

/// Camera orbiting a fixed target
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    zoom: f32,
    projection: Projection,
    frustum_landscape: f32,
    frustum_portrait: f32,
    projection_matrix: Mat4,
}

impl Camera {
    /// Create a camera for a viewport of the given aspect ratio
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let projection = match config.perspective_fov {
            Some(fov) => Projection::Perspective { fov, aspect },
            None => Projection::Orthographic {
                frustum_size: frustum_for(aspect, config),
                aspect,
            },
        };

        let mut cam = Self {
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            near: config.near,
            far: config.far,
            zoom: config.zoom,
            projection,
            frustum_landscape: config.frustum_landscape,
            frustum_portrait: config.frustum_portrait,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set zoom and recompute the projection
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        self.update_projection();
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Update aspect ratio (and orthographic frustum) on resize
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let aspect = width / height;
        let frustum = if aspect < 1.0 {
            self.frustum_portrait
        } else {
            self.frustum_landscape
        };
        self.projection = match self.projection {
            Projection::Orthographic { .. } => Projection::Orthographic {
                frustum_size: frustum,
                aspect,
            },
            Projection::Perspective { fov, .. } => Projection::Perspective { fov, aspect },
        };
        self.update_projection();
    }

    /// Recompute the cached projection matrix after zoom or projection changes
    pub fn update_projection(&mut self) {
        let zoom = self.zoom.max(f32::EPSILON);
        self.projection_matrix = match self.projection {
            Projection::Orthographic {
                frustum_size,
                aspect,
            } => {
                let half_h = frustum_size / 2.0 / zoom;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
            Projection::Perspective { fov, aspect } => {
                let fov = 2.0 * ((fov / 2.0).tan() / zoom).atan();
                Mat4::perspective_rh_gl(fov, aspect, self.near, self.far)
            }
        };
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Unit vector the camera looks along
    pub fn view_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Rotate the camera's offset from the target about the vertical axis
    pub fn rotate_about_target(&mut self, angle: f32) {
        let offset = self.position - self.target;
        self.position = self.target + Quat::from_axis_angle(Vec3::Y, angle) * offset;
    }

    /// Orbit by azimuth and polar deltas, keeping the polar angle off the poles
    pub fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) + delta_azimuth;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() + delta_polar)
            .clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);

        self.position = self.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
    }

    /// Polar angle of the camera measured from +Y
    pub fn polar_angle(&self) -> f32 {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return 0.0;
        }
        (offset.y / radius).clamp(-1.0, 1.0).acos()
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection_matrix().inverse();
        let near = inverse.project_point3(ndc.extend(-1.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

fn frustum_for(aspect: f32, config: &CameraConfig) -> f32 {
    if aspect < 1.0 {
        config.frustum_portrait
    } else {
        config.frustum_landscape
    }
}
