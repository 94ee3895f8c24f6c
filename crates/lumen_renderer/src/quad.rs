//! Planar parallelogram primitive and the six-sided box built from it.

use crate::sampling::gen_f32;
use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    Material, Ray, RenderError, RenderResult,
};
use lumen_math::{rotate_y_about, rotate_y_vector, Aabb, Interval, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A parallelogram spanned by edges `u` and `v` from corner `q`.
///
/// The front face is the side `u x v` points to.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`, used for planar coordinates
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

/// Parametric hit on the quad's plane inside the quad.
struct PlaneHit {
    t: f32,
    p: Vec3,
    alpha: f32,
    beta: f32,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> RenderResult<Self> {
        let n = u.cross(v);
        if n.length_squared() < 1e-12 || !n.is_finite() {
            return Err(RenderError::DegenerateQuad);
        }

        let mut quad = Self {
            q,
            u,
            v,
            w: Vec3::ZERO,
            normal: Vec3::ZERO,
            d: 0.0,
            area: 0.0,
            material,
            bbox: Aabb::EMPTY,
        };
        quad.update_frame();
        Ok(quad)
    }

    /// Recompute everything derived from `q`, `u` and `v`.
    fn update_frame(&mut self) {
        let n = self.u.cross(self.v);
        self.normal = n.normalize();
        self.d = self.normal.dot(self.q);
        self.w = n / n.dot(n);
        self.area = n.length();

        let diagonal1 = Aabb::from_points(self.q, self.q + self.u + self.v);
        let diagonal2 = Aabb::from_points(self.q + self.u, self.q + self.v);
        self.bbox = Aabb::surrounding(&diagonal1, &diagonal2);
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<PlaneHit> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);
        let planar_hitpt = p - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));
        if !Interval::UNIT.contains(alpha) || !Interval::UNIT.contains(beta) {
            return None;
        }

        Some(PlaneHit { t, p, alpha, beta })
    }
}

impl Hittable for Quad {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some(hit) = self.intersect(ray, ray_t) else {
            return false;
        };

        rec.t = hit.t;
        rec.p = hit.p;
        rec.u = hit.alpha;
        rec.v = hit.beta;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        self.q += offset;
        self.update_frame();
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        self.q = rotate_y_about(self.q, degrees, pivot);
        self.u = rotate_y_vector(self.u, degrees);
        self.v = rotate_y_vector(self.v, degrees);
        self.update_frame();
    }

    /// Area sampling converted to solid angle: `dist^2 / (|cos| * area)`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let probe = Ray::new(origin, direction, 0.0);
        let Some(hit) = self.intersect(&probe, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = hit.t * hit.t * direction.length_squared();
        let cosine = (direction.dot(self.normal) / direction.length()).abs();
        if cosine < 1e-8 {
            return 0.0;
        }

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

/// Build the six quads of the axis-aligned box with opposite corners `a` and `b`.
///
/// All faces point outward.
pub fn make_box(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> RenderResult<HittableList> {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    let mut sides = HittableList::new();
    // front
    sides.add(Box::new(Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone())?));
    // right
    sides.add(Box::new(Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material.clone())?));
    // back
    sides.add(Box::new(Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material.clone())?));
    // left
    sides.add(Box::new(Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material.clone())?));
    // top
    sides.add(Box::new(Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material.clone())?));
    // bottom
    sides.add(Box::new(Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material)?));

    Ok(sides)
}
