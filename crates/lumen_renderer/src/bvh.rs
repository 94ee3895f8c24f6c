//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over exclusively owned objects, split at the median of the
//! longest axis of each node's bounds.

use crate::{HitRecord, Hittable, HittableList, Ray, RenderError, RenderResult};
use lumen_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 2;

/// BVH node - either a branch with two children or a leaf with primitives.
///
/// Every node's box is the union of its children's boxes.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with one or two primitives.
    Leaf {
        objects: Vec<Box<dyn Hittable>>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let count = objects.len();
        let node = Self::build(objects);
        log::info!(
            "Built BVH over {} objects: depth {}, {} leaves",
            count,
            node.depth(),
            node.leaf_count()
        );
        Ok(node)
    }

    /// Create a BVH that takes ownership of a list's members.
    pub fn from_list(list: HittableList) -> RenderResult<Self> {
        Self::new(list.into_objects())
    }

    /// Recursive BVH construction.
    ///
    /// Median split: stable sort by box minimum on the longest axis of the
    /// union box, split in half, recurse.
    fn build(mut objects: Vec<Box<dyn Hittable>>) -> Self {
        let n = objects.len();

        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        let axis = bounds.longest_axis();

        // sort_by is stable, so equal keys keep their input order
        objects.sort_by(|a, b| {
            let a_min = a.bounding_box().axis_interval(axis).min;
            let b_min = b.bounding_box().axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        let mid = n / 2;
        let right_objects = objects.split_off(mid);
        let left_objects = objects;

        let left = Self::build(left_objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Number of levels, counting a lone leaf as 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Apply `f` to every primitive, then rebuild all boxes bottom-up.
    fn transform_all(&mut self, f: &dyn Fn(&mut dyn Hittable)) {
        match self {
            BvhNode::Leaf { objects, bbox } => {
                for obj in objects.iter_mut() {
                    f(obj.as_mut());
                }
                *bbox = objects
                    .iter()
                    .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));
            }
            BvhNode::Branch { left, right, bbox } => {
                left.transform_all(f);
                right.transform_all(f);
                *bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
            }
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        match self {
            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let mut hit_anything = false;
                let mut closest = ray_t.max;

                for obj in objects {
                    let interval = Interval::new(ray_t.min, closest);
                    if obj.hit(ray, interval, rec, rng) {
                        hit_anything = true;
                        closest = rec.t;
                    }
                }
                hit_anything
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec, rng);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn translate(&mut self, offset: Vec3) {
        self.transform_all(&|obj| obj.translate(offset));
    }

    fn rotate_y_about(&mut self, degrees: f32, pivot: Vec3) {
        self.transform_all(&|obj| obj.rotate_y_about(degrees, pivot));
    }
}
