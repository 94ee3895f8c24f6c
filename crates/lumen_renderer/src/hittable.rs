//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray, ScatterRecord};
use lumen_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// A dummy material used for HitRecord::default().
/// Always absorbs light (returns None from scatter).
struct DummyMaterial;

impl Material for DummyMaterial {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }
}

/// Static dummy material instance for Default impl.
static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl Default for HitRecord<'_> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &DUMMY_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl HitRecord<'_> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    /// `outward_normal` must be unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implemented by primitives and by the aggregates (`HittableList`,
/// `BvhNode`) that contain them, so a whole scene is itself a `Hittable`.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record. `rng` is only
    /// consumed by participating media.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Move the object rigidly by `offset`.
    fn translate(&mut self, offset: Vec3);

    /// Rotate the object rigidly by `degrees` about the vertical axis through `pivot`.
    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3);

    /// Rotate about the vertical axis through the centre of the bounding box.
    fn rotate_y(&mut self, degrees: f32) {
        let pivot = self.bounding_box().centroid();
        self.rotate_y_about(degrees, pivot);
    }

    /// Solid-angle density of sampling `direction` from `origin` towards this object.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f32 {
        0.0
    }

    /// A direction from `origin` towards a random point of this object.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// A list of hittable objects, tested linearly.
///
/// Also serves as the light set for importance sampling: its PDF is the
/// equal-weight mixture of its members' PDFs.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Builder-style `add`.
    pub fn with(mut self, object: impl Hittable + 'static) -> Self {
        self.add(Box::new(object));
        self
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Borrow the members.
    pub fn objects(&self) -> &[Box<dyn Hittable>] {
        &self.objects
    }

    /// Take the members out, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }

    fn recompute_bbox(&mut self) {
        self.bbox = self
            .objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        let mut list = Self {
            objects,
            bbox: Aabb::EMPTY,
        };
        list.recompute_bbox();
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec, rng) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn translate(&mut self, offset: Vec3) {
        for object in &mut self.objects {
            object.translate(offset);
        }
        self.recompute_bbox();
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        for object in &mut self.objects {
            object.rotate_y_about(degrees, pivot);
        }
        self.recompute_bbox();
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|o| weight * o.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = (crate::gen_f32(rng) * self.objects.len() as f32) as usize;
        self.objects[index.min(self.objects.len() - 1)].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(center, radius, Arc::new(Lambertian::from_color(Vec3::splat(0.5)))).unwrap()
    }

    #[test]
    fn test_set_face_normal() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();

        rec.set_face_normal(&ray, Vec3::Z);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        rec.set_face_normal(&ray, -Vec3::Z);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let list = HittableList::new()
            .with(sphere(Vec3::new(0.0, 0.0, -10.0), 1.0))
            .with(sphere(Vec3::new(0.0, 0.0, -3.0), 1.0))
            .with(sphere(Vec3::new(0.0, 0.0, -6.0), 1.0));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_list_bbox_tracks_members() {
        let mut list = HittableList::new();
        assert_eq!(list.bounding_box(), Aabb::EMPTY);

        list.add(Box::new(sphere(Vec3::ZERO, 1.0)));
        list.add(Box::new(sphere(Vec3::new(5.0, 0.0, 0.0), 1.0)));
        let bbox = list.bounding_box();
        assert_eq!(bbox.x, Interval::new(-1.0, 6.0));

        list.translate(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(list.bounding_box().y, Interval::new(1.0, 3.0));
    }

    #[test]
    fn test_empty_list_sampling_is_neutral() {
        let list = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(list.pdf_value(Vec3::ZERO, Vec3::Y), 0.0);
        assert_eq!(list.random(Vec3::ZERO, &mut rng), Vec3::X);
    }

    #[test]
    fn test_list_pdf_is_average_of_members() {
        let a = sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let b = sphere(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let direction = Vec3::new(0.0, 0.0, -1.0);
        let expected = 0.5 * (a.pdf_value(Vec3::ZERO, direction) + b.pdf_value(Vec3::ZERO, direction));

        let list = HittableList::new().with(a).with(b);
        let value = list.pdf_value(Vec3::ZERO, direction);
        assert!(value > 0.0);
        assert!((value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_list_random_picks_members_uniformly() {
        let list = HittableList::new()
            .with(sphere(Vec3::new(0.0, 0.0, -5.0), 1.0))
            .with(sphere(Vec3::new(0.0, 0.0, 5.0), 1.0));

        let mut rng = StdRng::seed_from_u64(9);
        let n = 10_000;
        let towards_minus_z = (0..n)
            .filter(|_| list.random(Vec3::ZERO, &mut rng).z < 0.0)
            .count();
        let fraction = towards_minus_z as f32 / n as f32;
        assert!((fraction - 0.5).abs() < 0.03, "fraction {}", fraction);
    }
}
