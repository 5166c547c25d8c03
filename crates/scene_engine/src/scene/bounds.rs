//! Axis-aligned bounding boxes
//!
//! Cheap conservative volumes used to reject per-triangle picking work early.
//! Boxes live in the owning mesh's local space; the picker transforms rays
//! into that space rather than transforming boxes out of it.

use crate::foundation::math::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from explicit corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all points; empty input yields a degenerate
    /// box at the origin.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(Vec3::zeros(), Vec3::zeros());
        };
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Self { min, max }
    }

    /// Box center
    pub fn center(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Half-extents along each axis
    pub fn half_extents(&self) -> Vec3 {
        0.5 * (self.max - self.min)
    }

    /// Slab-method ray intersection.
    ///
    /// Returns the entry parameter along the ray, or `None` when the ray
    /// misses. An origin inside the box reports distance 0.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < 1e-8 {
                // Ray parallel to this slab; must already be inside it.
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (self.min[axis] - o) * inv;
                let mut t1 = (self.max[axis] - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_from_points() {
        let points = [
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 2.0),
            Vec3::new(0.0, 0.0, -5.0),
        ];
        let bounds = Aabb::from_points(points.iter());
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -5.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_ray_hits_front_face() {
        let t = unit_box()
            .intersect_ray(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_relative_eq!(t, 4.5, epsilon = 1e-6);
    }

    #[test]
    fn test_ray_misses_to_the_side() {
        let hit = unit_box().intersect_ray(Vec3::new(2.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_behind_box_misses() {
        let hit = unit_box().intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_origin_inside_reports_zero() {
        let t = unit_box()
            .intersect_ray(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_parallel_ray_outside_slab_misses() {
        let hit = unit_box().intersect_ray(Vec3::new(0.0, 2.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(hit.is_none());
    }
}
