use nalgebra::{point, Point3};

use super::Ray;

/// Axis aligned box.
/// The renderer places the volume inside the unit cube `[0;1]^3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
}

impl BoundBox {
    /// Normalized volume space
    pub fn unit() -> BoundBox {
        BoundBox {
            lower: point![0.0, 0.0, 0.0],
            upper: point![1.0, 1.0, 1.0],
        }
    }

    /// Entry and exit distance of `ray`, `None` if the box is missed.
    /// Entry is clamped to zero when the ray starts inside the box.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        // Source: An Efficient and Robust Ray–Box Intersection Algorithm.
        // Amy Williams et al. 2004.

        // t value of intersection with the 6 planes of a bounding box
        let t0 = (self.lower - ray.origin).component_div(&ray.direction);
        let t1 = (self.upper - ray.origin).component_div(&ray.direction);

        // [ (min,max) , (min,max) , (min,max) ]
        let t_minmax = t0.zip_map(&t1, |t0, t1| if t0 < t1 { (t0, t1) } else { (t1, t0) });

        let tmin = f32::max(f32::max(t_minmax.x.0, t_minmax.y.0), t_minmax.z.0);
        let tmax = f32::min(f32::min(t_minmax.x.1, t_minmax.y.1), t_minmax.z.1);

        // whole box behind the origin
        if tmax.is_sign_negative() {
            return None;
        }

        if tmin > tmax {
            return None;
        }

        Some((f32::max(tmin, 0.0), tmax))
    }
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;

    #[test]
    fn intersect_works() {
        let bbox = BoundBox::unit();
        let ray = Ray::new(point![-1.0, -1.0, 0.0], vector![1.0, 1.0, 1.0]);
        let inter = bbox.intersect(&ray);
        assert!(inter.is_some());
    }

    #[test]
    fn entry_and_exit_along_axis() {
        let bbox = BoundBox::unit();
        let ray = Ray::new(point![0.5, 0.5, -2.0], vector![0.0, 0.0, 1.0]);
        let (t0, t1) = bbox.intersect(&ray).unwrap();
        assert!((t0 - 2.0).abs() < 1e-6);
        assert!((t1 - 3.0).abs() < 1e-6);
    }

    #[test]
    fn starting_inside() {
        let bbox = BoundBox::unit();
        let ray = Ray::new(point![0.5, 0.5, 0.5], vector![1.0, 0.0, 0.0]);
        let (t0, t1) = bbox.intersect(&ray).unwrap();
        assert_eq!(t0, 0.0);
        assert!((t1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn not_intersecting() {
        let bbox = BoundBox::unit();
        let ray = Ray::new(point![2.0, 2.0, 2.0], vector![1.0, 0.0, 0.0]);
        assert!(bbox.intersect(&ray).is_none());

        let behind = Ray::new(point![2.0, 0.5, 0.5], vector![1.0, 0.0, 0.0]);
        assert!(bbox.intersect(&behind).is_none());
    }
}
