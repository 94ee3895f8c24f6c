//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::sampling::gen_f32;
use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, RenderError, RenderResult,
};
use lumen_math::{rotate_y_about, Aabb, Interval, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length), `(v1 - v0) x (v2 - v0)`
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> RenderResult<Self> {
        let n = (v1 - v0).cross(v2 - v0);
        if n.length_squared() < 1e-12 || !n.is_finite() {
            return Err(RenderError::DegenerateTriangle);
        }

        let mut tri = Self {
            v0,
            v1,
            v2,
            normal: Vec3::ZERO,
            area: 0.0,
            material,
            bbox: Aabb::EMPTY,
        };
        tri.update_frame();
        Ok(tri)
    }

    fn update_frame(&mut self) {
        let n = (self.v1 - self.v0).cross(self.v2 - self.v0);
        self.normal = n.normalize();
        self.area = 0.5 * n.length();

        // from_points pads thin axes
        let min = self.v0.min(self.v1).min(self.v2);
        let max = self.v0.max(self.v1).max(self.v2);
        self.bbox = Aabb::from_points(min, max);
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    /// Returns `(t, u, v)` with barycentric `u`, `v` of the hit.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some((t, u, v))
    }
}

impl Hittable for Triangle {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some((t, u, v)) = self.intersect(ray, ray_t) else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.u = u;
        rec.v = v;
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        self.v0 += offset;
        self.v1 += offset;
        self.v2 += offset;
        self.update_frame();
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        self.v0 = rotate_y_about(self.v0, degrees, pivot);
        self.v1 = rotate_y_about(self.v1, degrees, pivot);
        self.v2 = rotate_y_about(self.v2, degrees, pivot);
        self.update_frame();
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let probe = Ray::new(origin, direction, 0.0);
        let Some((t, _, _)) = self.intersect(&probe, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = t * t * direction.length_squared();
        let cosine = (direction.dot(self.normal) / direction.length()).abs();
        if cosine < 1e-8 {
            return 0.0;
        }

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        // Fold the unit square onto the triangle
        let mut r1 = gen_f32(rng);
        let mut r2 = gen_f32(rng);
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        let p = self.v0 + r1 * (self.v1 - self.v0) + r2 * (self.v2 - self.v0);
        p - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::sampling::random_unit_vector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    /// Triangle in the XY plane at z=-1, facing +Z.
    fn test_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            grey(),
        )
        .unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let tri = test_triangle();
        let mut rng = StdRng::seed_from_u64(0);

        // Ray pointing at triangle center
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();

        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!(rec.front_face);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = test_triangle();
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));

        // Beside the triangle
        let ray = Ray::new(Vec3::new(0.9, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_triangle_rejects_collinear_vertices() {
        let result = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 3.0, grey());
        assert!(matches!(result, Err(RenderError::DegenerateTriangle)));
    }

    #[test]
    fn test_triangle_translate_moves_hit() {
        let mut tri = test_triangle();
        tri.translate(Vec3::new(0.0, 0.0, -2.0));
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert!(tri.bounding_box().z.contains(-3.0));
    }

    #[test]
    fn test_triangle_pdf_integrates_to_one() {
        let tri = test_triangle();
        let mut rng = StdRng::seed_from_u64(31);

        let n = 100_000;
        let total: f32 = (0..n)
            .map(|_| tri.pdf_value(Vec3::ZERO, random_unit_vector(&mut rng)))
            .sum();
        let integral = total / n as f32 * 4.0 * PI;
        assert!((integral - 1.0).abs() < 0.05, "integral {}", integral);
    }

    #[test]
    fn test_triangle_random_stays_inside() {
        let tri = test_triangle();
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..500 {
            let d = tri.random(Vec3::ZERO, &mut rng);
            assert!(tri.pdf_value(Vec3::ZERO, d) > 0.0);
        }
    }
}
