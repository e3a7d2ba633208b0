use nalgebra::{point, vector, Point3, Vector3};

use crate::common::Ray;

/// Camera orbiting a target point.
///
/// Position is kept in spherical coordinates around the target, with `y` as
/// the polar axis. Rays are generated with a pinhole model, up vector `+y`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Point3<f32>,
    radius: f32,
    theta: f32,
    phi: f32,
    /// Vertical field of view, in degrees
    fov_y: f32,
}

const MIN_RADIUS: f32 = 0.1;
const POLE_MARGIN: f32 = 0.01;

impl OrbitCamera {
    pub fn new(target: Point3<f32>, radius: f32) -> OrbitCamera {
        OrbitCamera {
            target,
            radius: radius.max(MIN_RADIUS),
            theta: std::f32::consts::FRAC_PI_3,
            phi: std::f32::consts::FRAC_PI_4,
            fov_y: 45.0,
        }
    }

    /// Looking at the center of the unit cube
    pub fn unit_cube() -> OrbitCamera {
        OrbitCamera::new(point![0.5, 0.5, 0.5], 2.5)
    }

    pub fn position(&self) -> Point3<f32> {
        let offset = vector![
            self.radius * self.theta.sin() * self.phi.cos(),
            self.radius * self.theta.cos(),
            self.radius * self.theta.sin() * self.phi.sin()
        ];
        self.target + offset
    }

    pub fn direction(&self) -> Vector3<f32> {
        (self.target - self.position()).normalize()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Rotate around target, angles in radians.
    /// Polar angle stays away from the poles.
    pub fn rotate(&mut self, d_phi: f32, d_theta: f32) {
        self.phi = (self.phi + d_phi).rem_euclid(std::f32::consts::TAU);
        self.theta = (self.theta + d_theta).clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
    }

    /// Move toward (negative) or away from (positive) the target
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta).max(MIN_RADIUS);
    }

    /// Ray through normalized image coordinates, `(0, 0)` top left.
    pub fn get_ray(&self, pixel_coord: (f32, f32)) -> Ray {
        let up = vector![0.0, 1.0, 0.0];
        let direction = self.direction();
        let plane = 2.0 * f32::tan(f32::to_radians(0.5 * self.fov_y));

        let du = direction.cross(&up).normalize() * plane;
        let dv = du.cross(&direction).normalize() * plane;
        let dir_00 = direction - 0.5 * du + 0.5 * dv;

        let dir = dir_00 + du * pixel_coord.0 - dv * pixel_coord.1;
        Ray::new(self.position(), dir)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        OrbitCamera::unit_cube()
    }
}
