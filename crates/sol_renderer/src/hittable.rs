//! Ray-primitive intersection.
//!
//! Every primitive is tested on every query (no acceleration structure).
//! Planes are tested before spheres and a hit only replaces the current best
//! when strictly closer, so ties go to the primitive tested first.

use sol_core::{Plane, Sphere, World, BACKGROUND_MATERIAL};
use sol_math::{Interval, Ray, Vec3, VectorExt};

use crate::RenderConfig;

/// Record of the nearest ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Material index; [`BACKGROUND_MATERIAL`] when nothing was hit
    pub material: usize,
    /// Surface normal at the intersection (not flipped towards the ray)
    pub normal: Vec3,
}

impl HitRecord {
    /// Nothing hit.
    pub const MISS: HitRecord = HitRecord {
        t: f32::MAX,
        material: BACKGROUND_MATERIAL,
        normal: Vec3::ZERO,
    };

    /// Whether the ray escaped to the background.
    #[inline]
    pub fn is_miss(&self) -> bool {
        self.material == BACKGROUND_MATERIAL
    }
}

impl Default for HitRecord {
    fn default() -> Self {
        Self::MISS
    }
}

/// Intersect a ray with a plane.
///
/// Returns the hit distance if it lies inside `ray_t` (exclusive). Rays
/// within `tolerance` of parallel never hit.
#[inline]
pub fn hit_plane(plane: &Plane, ray: &Ray, ray_t: Interval, tolerance: f32) -> Option<f32> {
    let denom = plane.normal.dot(ray.direction);
    if denom.abs() <= tolerance {
        return None;
    }

    let t = (-plane.offset - plane.normal.dot(ray.origin)) / denom;
    ray_t.surrounds(t).then_some(t)
}

/// Intersect a ray with a sphere.
///
/// Prefers the near root when it lies past `ray_t.min`, otherwise falls back
/// to the far root. Returns the distance if it lies inside `ray_t`.
#[inline]
pub fn hit_sphere(sphere: &Sphere, ray: &Ray, ray_t: Interval, tolerance: f32) -> Option<f32> {
    let l = ray.origin - sphere.center;
    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * ray.direction.dot(l);
    let c = l.dot(l) - sphere.radius * sphere.radius;

    let root_term = b * b - 4.0 * a * c;
    let denom = 2.0 * a;

    if root_term < 0.0 || denom.abs() <= tolerance {
        return None;
    }

    let sqrt_term = root_term.sqrt();
    let tp = (-b + sqrt_term) / denom;
    let tn = (-b - sqrt_term) / denom;

    let t = if tn > ray_t.min && tn < tp { tn } else { tp };
    ray_t.surrounds(t).then_some(t)
}

/// Find the nearest intersection of `ray` with any primitive in `world`.
///
/// Returns [`HitRecord::MISS`] if nothing lies beyond `min_hit_distance`.
pub fn nearest_hit(world: &World, ray: &Ray, config: &RenderConfig) -> HitRecord {
    let mut rec = HitRecord::MISS;
    let range = Interval::new(config.min_hit_distance, f32::MAX);

    for plane in world.planes() {
        if let Some(t) = hit_plane(plane, ray, range.with_max(rec.t), config.tolerance) {
            rec = HitRecord {
                t,
                material: plane.material,
                normal: plane.normal,
            };
        }
    }

    for sphere in world.spheres() {
        if let Some(t) = hit_sphere(sphere, ray, range.with_max(rec.t), config.tolerance) {
            let l = ray.origin - sphere.center;
            rec = HitRecord {
                t,
                material: sphere.material,
                normal: (t * ray.direction + l).normalize_zero(),
            };
        }
    }

    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_core::Material;

    const TOLERANCE: f32 = 0.0001;

    fn range() -> Interval {
        Interval::new(0.001, f32::MAX)
    }

    fn test_world(planes: Vec<Plane>, spheres: Vec<Sphere>) -> World {
        World::new(
            planes,
            spheres,
            vec![
                Material::emissive(Vec3::new(0.1, 0.2, 0.3)),
                Material::reflective(Vec3::splat(0.5), 0.0),
                Material::reflective(Vec3::splat(0.8), 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_plane_hit_analytic_t() {
        let plane = Plane::new(Vec3::Y, -1.0, 1); // y = 1
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let t = hit_plane(&plane, &ray, range(), TOLERANCE).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        // Oblique ray from the positive side
        let dir = Vec3::new(1.0, -2.0, 0.5).normalize();
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), dir);
        let t = hit_plane(&plane, &ray, range(), TOLERANCE).unwrap();
        let expected = (-(-1.0) - Vec3::Y.dot(ray.origin)) / Vec3::Y.dot(dir);
        assert!((t - expected).abs() < 1e-5);
        assert!((ray.at(t).y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let plane = Plane::new(Vec3::Y, 0.0, 1);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(hit_plane(&plane, &ray, range(), TOLERANCE).is_none());

        // Nearly parallel, inside tolerance
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -0.00005, 0.0));
        assert!(hit_plane(&plane, &ray, range(), TOLERANCE).is_none());
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let plane = Plane::new(Vec3::Y, 0.0, 1);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(hit_plane(&plane, &ray, range(), TOLERANCE).is_none());
    }

    #[test]
    fn test_sphere_hit_near_root() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let t = hit_sphere(&sphere, &ray, range(), TOLERANCE).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = hit_sphere(&sphere, &ray, range(), TOLERANCE).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(hit_sphere(&sphere, &ray, range(), TOLERANCE).is_none());

        // Sphere entirely behind the ray
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(hit_sphere(&sphere, &ray, range(), TOLERANCE).is_none());

        // Zero direction is rejected by the tolerance guard
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(hit_sphere(&sphere, &ray, range(), TOLERANCE).is_none());
    }

    #[test]
    fn test_sphere_translation_invariant() {
        let sphere = Sphere::new(Vec3::new(0.3, -0.2, -4.0), 1.25, 1);
        let ray = Ray::new(Vec3::new(0.1, 0.1, 0.5), Vec3::new(0.05, -0.08, -1.0).normalize());
        let base = hit_sphere(&sphere, &ray, range(), TOLERANCE).unwrap();

        for offset in [
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-3.5, 7.25, 2.0),
            Vec3::new(0.0, -20.0, 13.0),
        ] {
            let moved = Sphere::new(sphere.center + offset, sphere.radius, 1);
            let t = hit_sphere(&moved, &ray.translated(offset), range(), TOLERANCE).unwrap();
            assert!((t - base).abs() < 1e-3, "t {} vs {}", t, base);
        }
    }

    #[test]
    fn test_sphere_rotation_invariant() {
        use sol_math::Quat;

        let sphere = Sphere::new(Vec3::new(0.3, -0.2, -4.0), 1.25, 1);
        let ray = Ray::new(Vec3::new(0.1, 0.1, 0.5), Vec3::new(0.05, -0.08, -1.0).normalize());
        let base = hit_sphere(&sphere, &ray, range(), TOLERANCE).unwrap();

        for rotation in [
            Quat::from_axis_angle(Vec3::X, 0.7),
            Quat::from_axis_angle(Vec3::Y, 2.3),
            Quat::from_axis_angle(Vec3::new(1.0, -2.0, 0.5).normalize(), -1.1),
        ] {
            let rotated = Sphere::new(rotation * sphere.center, sphere.radius, 1);
            let rotated_ray = Ray::new(rotation * ray.origin, rotation * ray.direction);
            let t = hit_sphere(&rotated, &rotated_ray, range(), TOLERANCE).unwrap();
            assert!((t - base).abs() < 1e-3, "t {} vs {}", t, base);
        }
    }

    #[test]
    fn test_random_hits_lie_on_surface() {
        use crate::RandomSeries;
        use rand::Rng;

        let mut rng = RandomSeries::new(7).unwrap();
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), -0.5, 1);
        let sphere = Sphere::new(Vec3::new(0.0, 0.5, -6.0), 1.5, 1);

        for _ in 0..500 {
            let origin = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(2.0..6.0),
                rng.gen_range(-1.0..3.0),
            );
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..-0.1),
                rng.gen_range(-1.0..1.0),
            )
            .normalize();
            let ray = Ray::new(origin, dir);

            let t = hit_plane(&plane, &ray, range(), TOLERANCE).unwrap();
            assert!((ray.at(t).y - 0.5).abs() < 1e-3);

            if let Some(t) = hit_sphere(&sphere, &ray, range(), TOLERANCE) {
                let distance = (ray.at(t) - sphere.center).length();
                assert!((distance - sphere.radius).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_nearest_hit_empty_world_is_miss() {
        let world = World::empty(Material::emissive(Vec3::ONE));
        let config = RenderConfig::default();
        for dir in [Vec3::X, Vec3::NEG_Y, Vec3::new(0.3, 0.4, -0.5), Vec3::ZERO] {
            let rec = nearest_hit(&world, &Ray::new(Vec3::ZERO, dir), &config);
            assert!(rec.is_miss());
            assert_eq!(rec, HitRecord::MISS);
        }
    }

    #[test]
    fn test_nearest_hit_picks_closest() {
        let world = test_world(
            vec![Plane::new(Vec3::Y, 0.0, 1)],
            vec![Sphere::new(Vec3::new(0.0, 3.0, 0.0), 1.0, 2)],
        );
        let config = RenderConfig::default();
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);

        let rec = nearest_hit(&world, &ray, &config);
        assert_eq!(rec.material, 2);
        assert!((rec.t - 6.0).abs() < 1e-5);
        assert!((rec.normal - Vec3::Y).length() < 1e-5);

        // Looking away from the sphere, the plane is hit
        let ray = Ray::new(Vec3::new(5.0, 10.0, 0.0), Vec3::NEG_Y);
        let rec = nearest_hit(&world, &ray, &config);
        assert_eq!(rec.material, 1);
        assert_eq!(rec.normal, Vec3::Y);
        assert!((rec.t - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_hit_tie_goes_to_plane() {
        // Sphere touching the plane at the point the ray hits
        let world = test_world(
            vec![Plane::new(Vec3::Y, 0.0, 1)],
            vec![Sphere::new(Vec3::new(0.0, -1.0, 0.0), 1.0, 2)],
        );
        let config = RenderConfig::default();
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::NEG_Y);
        let rec = nearest_hit(&world, &ray, &config);
        assert_eq!(rec.material, 1);
    }

    #[test]
    fn test_nearest_hit_respects_min_distance() {
        let world = test_world(vec![Plane::new(Vec3::Y, 0.0, 1)], Vec::new());
        let config = RenderConfig::default();
        // Origin on the plane: t = 0 is not a hit
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        assert!(nearest_hit(&world, &ray, &config).is_miss());
    }
}
