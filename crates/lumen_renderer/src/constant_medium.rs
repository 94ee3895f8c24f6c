//! Constant-density participating medium (smoke, fog) inside a boundary shape.

use crate::sampling::gen_f32;
use crate::{
    hittable::{HitRecord, Hittable},
    Isotropic, Material, Ray, RenderError, RenderResult,
};
use lumen_core::{Color, SolidColor, Texture};
use lumen_math::{Aabb, Interval, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A homogeneous volume filling a closed boundary.
///
/// A ray travelling through the volume scatters after an exponentially
/// distributed distance; the phase function is isotropic.
pub struct ConstantMedium {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(
        boundary: Box<dyn Hittable>,
        density: f32,
        albedo: Arc<dyn Texture>,
    ) -> RenderResult<Self> {
        if !(density.is_finite() && density > 0.0) {
            return Err(RenderError::InvalidDensity(density));
        }

        Ok(Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Isotropic::new(albedo)),
        })
    }

    pub fn from_color(boundary: Box<dyn Hittable>, density: f32, albedo: Color) -> RenderResult<Self> {
        Self::new(boundary, density, Arc::new(SolidColor::new(albedo)))
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // Entry and exit along the whole line, then clip to ray_t
        let mut rec1 = HitRecord::default();
        let mut rec2 = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut rec1, rng) {
            return false;
        }
        if !self
            .boundary
            .hit(ray, Interval::new(rec1.t + 0.0001, f32::INFINITY), &mut rec2, rng)
        {
            return false;
        }

        let mut t_enter = rec1.t.max(ray_t.min);
        let t_exit = rec2.t.min(ray_t.max);
        if t_enter >= t_exit {
            return false;
        }
        t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - u keeps the argument of ln away from zero
        let hit_distance = self.neg_inv_density * (1.0 - gen_f32(rng)).ln();
        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t_enter + hit_distance / ray_length;
        rec.p = ray.at(rec.t);

        // Arbitrary; the phase function ignores it
        rec.normal = Vec3::X;
        rec.front_face = true;
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.phase_function.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }

    fn translate(&mut self, offset: Vec3) {
        self.boundary.translate(offset);
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        self.boundary.rotate_y_about(degrees, pivot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::quad::make_box;
    use crate::Sphere;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_boundary() -> Box<dyn Hittable> {
        Box::new(
            Sphere::new(
                Vec3::new(0.0, 0.0, -5.0),
                1.0,
                Arc::new(Lambertian::from_color(Vec3::ONE)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_medium_rejects_bad_density() {
        assert!(matches!(
            ConstantMedium::from_color(sphere_boundary(), 0.0, Vec3::ONE),
            Err(RenderError::InvalidDensity(_))
        ));
        assert!(ConstantMedium::from_color(sphere_boundary(), -2.0, Vec3::ONE).is_err());
    }

    #[test]
    fn test_dense_medium_scatters_inside_boundary() {
        let medium = ConstantMedium::from_color(sphere_boundary(), 1000.0, Vec3::ONE).unwrap();
        let mut rng = StdRng::seed_from_u64(40);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        for _ in 0..100 {
            let mut rec = HitRecord::default();
            assert!(medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
            assert!(rec.t >= 4.0 && rec.t <= 6.0, "t = {}", rec.t);
        }
    }

    #[test]
    fn test_medium_transmission_matches_beer_lambert() {
        // Chord length 2, density 0.5 -> P(pass) = exp(-1)
        let medium = ConstantMedium::from_color(sphere_boundary(), 0.5, Vec3::ONE).unwrap();
        let mut rng = StdRng::seed_from_u64(41);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let n = 20_000;
        let passed = (0..n)
            .filter(|_| {
                let mut rec = HitRecord::default();
                !medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng)
            })
            .count();
        let fraction = passed as f32 / n as f32;
        assert!((fraction - (-1.0f32).exp()).abs() < 0.02, "fraction {}", fraction);
    }

    #[test]
    fn test_medium_missed_by_ray() {
        let medium = ConstantMedium::from_color(sphere_boundary(), 1000.0, Vec3::ONE).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let mut rec = HitRecord::default();
        assert!(!medium.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_medium_follows_boundary_transforms() {
        let boundary = make_box(
            Vec3::ZERO,
            Vec3::ONE,
            Arc::new(Lambertian::from_color(Vec3::ONE)),
        )
        .unwrap();
        let mut medium = ConstantMedium::from_color(Box::new(boundary), 1.0, Vec3::ONE).unwrap();
        medium.translate(Vec3::new(10.0, 0.0, 0.0));
        let bbox = medium.bounding_box();
        assert!(bbox.x.contains(10.5));
        assert!(!bbox.x.contains(0.5));
    }
}
