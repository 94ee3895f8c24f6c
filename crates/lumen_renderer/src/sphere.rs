//! Sphere primitive for ray tracing, optionally moving for motion blur.

use crate::sampling::{random_to_sphere, random_unit_vector};
use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, RenderError, RenderResult,
};
use lumen_math::{rotate_y_about, rotate_y_vector, Aabb, Interval, Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
///
/// The centre moves linearly from `center.origin` at time 0 to
/// `center.at(1.0)` at time 1; a static sphere has zero motion.
pub struct Sphere {
    center: Ray,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> RenderResult<Self> {
        Self::moving(center, center, radius, material)
    }

    /// Create a sphere whose centre moves from `center0` (time 0) to `center1` (time 1).
    pub fn moving(
        center0: Vec3,
        center1: Vec3,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RenderError::InvalidRadius(radius));
        }

        let center = Ray::new(center0, center1 - center0, 0.0);
        Ok(Self {
            bbox: Self::swept_bbox(&center, radius),
            center,
            radius,
            material,
        })
    }

    fn swept_bbox(center: &Ray, radius: f32) -> Aabb {
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center.at(0.0) - rvec, center.at(0.0) + rvec);
        let box1 = Aabb::from_points(center.at(1.0) - rvec, center.at(1.0) + rvec);
        Aabb::surrounding(&box0, &box1)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        let u = phi / (2.0 * PI);
        let v = theta / PI;
        (u, v)
    }

    /// Nearest root of the ray/sphere quadratic strictly inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let current_center = self.center.at(ray.time());
        let oc = current_center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }
        Some(root)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some(root) = self.intersect(ray, ray_t) else {
            return false;
        };

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - self.center.at(ray.time())) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        self.center.origin += offset;
        self.bbox = Self::swept_bbox(&self.center, self.radius);
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        self.center.origin = rotate_y_about(self.center.origin, degrees, pivot);
        self.center.direction = rotate_y_vector(self.center.direction, degrees);
        self.bbox = Self::swept_bbox(&self.center, self.radius);
    }

    /// Uniform density over the cone the sphere subtends (sphere at time 0).
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let distance_squared = (self.center.at(0.0) - origin).length_squared();
        if distance_squared <= self.radius * self.radius {
            // Inside the sphere every direction reaches it
            return 1.0 / (4.0 * PI);
        }

        let probe = Ray::new(origin, direction, 0.0);
        if self.intersect(&probe, Interval::new(0.001, f32::INFINITY)).is_none() {
            return 0.0;
        }

        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center.at(0.0) - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_unit_vector(rng);
        }
        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(rng, self.radius, distance_squared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let mut rec = HitRecord::default();

        assert!(!sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_sphere_inside_hits_back_face() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(!rec.front_face);
        assert!((rec.t - 2.0).abs() < 1e-4);
        assert_eq!(rec.normal, -Vec3::X);
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        assert_eq!(
            Sphere::new(Vec3::ZERO, -1.0, grey()).err(),
            Some(RenderError::InvalidRadius(-1.0))
        );
        assert!(Sphere::new(Vec3::ZERO, 0.0, grey()).is_err());
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, grey()).is_err());
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = Sphere::moving(Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 0.0, -5.0), 0.5, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        // The bbox spans the whole sweep
        assert_eq!(sphere.bounding_box().x, Interval::new(-0.5, 2.5));

        let ray_early = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z, 0.0);
        let ray_late = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z, 1.0);
        let mut rec = HitRecord::default();
        assert!(!sphere.hit(&ray_early, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!(sphere.hit(&ray_late, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::get_sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        let (_, v) = Sphere::get_sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_transforms() {
        let mut sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5, grey()).unwrap();
        sphere.translate(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(sphere.bounding_box().centroid(), Vec3::new(1.0, 3.0, 0.0));

        sphere.rotate_y_about(90.0, Vec3::new(0.0, 3.0, 0.0));
        assert!((sphere.bounding_box().centroid() - Vec3::new(0.0, 3.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn test_sphere_pdf_integrates_to_one() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(12);

        // Monte Carlo over the full sphere of directions: E[pdf] * 4pi = 1
        let n = 200_000;
        let total: f32 = (0..n)
            .map(|_| sphere.pdf_value(Vec3::ZERO, random_unit_vector(&mut rng)))
            .sum();
        let integral = total / n as f32 * 4.0 * PI;
        assert!((integral - 1.0).abs() < 0.08, "integral {}", integral);
    }

    #[test]
    fn test_sphere_random_points_at_sphere() {
        let sphere = Sphere::new(Vec3::new(3.0, 1.0, -4.0), 1.0, grey()).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..500 {
            let d = sphere.random(Vec3::ZERO, &mut rng);
            assert!(sphere.pdf_value(Vec3::ZERO, d) > 0.0);
        }
    }
}
