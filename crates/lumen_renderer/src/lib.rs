//! Lumen renderer - CPU path tracing
//!
//! A Monte Carlo path tracer with light importance sampling, volumetric
//! media and a BVH-accelerated scene, rendered in parallel buckets.

mod bucket;
mod bvh;
mod camera;
mod constant_medium;
mod error;
mod hittable;
mod material;
mod pdf;
mod quad;
mod renderer;
mod sampling;
mod sphere;
mod triangle;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    ScatterKind, ScatterRecord,
};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf, SpherePdf};
pub use quad::{make_box, Quad};
pub use renderer::{
    color_to_rgba, estimate_radiance, linear_to_gamma, render, render_pixel, ImageBuffer,
    RenderConfig,
};
pub use sampling::{
    gen_f32, gen_range_f32, random_cosine_direction, random_in_unit_disk, random_to_sphere,
    random_unit_vector,
};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export the texture types materials are built from
pub use lumen_core::{Color, Texture};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
