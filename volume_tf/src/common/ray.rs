use nalgebra::{Point3, Vector3};

/// Ray cast by camera.
/// Main usecase is getting intersections with the volume box ([`super::BoundBox::intersect`]),
/// then iterating over the intersected line segment in steps.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Construct new ray using `origin` and `direction`.
    /// `direction` is normalized.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Returns point `t` units far from ray origin in ray direction
    pub fn point_from_t(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }
}
