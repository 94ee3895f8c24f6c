//! Material trait for surface scattering.

use crate::pdf::{CosinePdf, Pdf, SpherePdf};
use crate::sampling::{gen_f32, random_unit_vector};
use crate::{hittable::HitRecord, Ray};
use lumen_core::{Color, SolidColor, Texture};
use lumen_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// How a scattered ray continues.
pub enum ScatterKind {
    /// A delta distribution: follow this exact ray, no PDF division.
    Specular(Ray),
    /// Sample a direction from this PDF.
    Sampled(Box<dyn Pdf>),
}

/// Outcome of a successful `Material::scatter`.
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

impl ScatterRecord {
    pub fn specular(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Specular(ray),
        }
    }

    pub fn sampled(attenuation: Color, pdf: impl Pdf + 'static) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Sampled(Box::new(pdf)),
        }
    }

    /// True when the integrator must follow a deterministic ray instead of sampling.
    pub fn skip_pdf(&self) -> bool {
        matches!(self.kind, ScatterKind::Specular(_))
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Light emitted at the hit point. Most materials return black.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        Color::ZERO
    }

    /// Scatter an incoming ray.
    ///
    /// Returns None if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterRecord>;

    /// Density of the material's own scattering lobe in the `scattered` direction.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::sampled(
            self.albedo.value(rec.u, rec.v, rec.p),
            CosinePdf::new(rec.normal),
        ))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cos_theta = rec.normal.dot(scattered.direction().normalize_or_zero());
        cos_theta.max(0.0) / PI
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let mut reflected = reflect(ray_in.direction().normalize(), rec.normal);
        if self.fuzz > 0.0 {
            reflected = (reflected + self.fuzz * random_unit_vector(rng)).normalize_or_zero();
        }

        // Fuzz may push the ray below the surface: absorb it
        if reflected.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterRecord::specular(
            self.albedo,
            Ray::new(rec.p, reflected, ray_in.time()),
        ))
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterRecord::specular(
            Color::ONE,
            Ray::new(rec.p, direction.normalize(), ray_in.time()),
        ))
    }
}

/// Diffuse light emitter. Emits from the front face only.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord) -> Color {
        if !rec.front_face {
            return Color::ZERO;
        }
        self.emit.value(rec.u, rec.v, rec.p)
    }

    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }
}

/// Isotropic phase function for participating media.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::sampled(
            self.albedo.value(rec.u, rec.v, rec.p),
            SpherePdf::new(),
        ))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        1.0 / (4.0 * PI)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record_at_origin(front_face: bool) -> HitRecord<'static> {
        HitRecord {
            p: Vec3::ZERO,
            normal: Vec3::Y,
            front_face,
            ..HitRecord::default()
        }
    }

    #[test]
    fn test_lambertian_scatter_is_sampled() {
        let mut rng = StdRng::seed_from_u64(1);
        let mat = Lambertian::from_color(Color::new(0.8, 0.2, 0.1));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);
        let rec = record_at_origin(true);

        let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
        assert!(!srec.skip_pdf());
        assert_eq!(srec.attenuation, Color::new(0.8, 0.2, 0.1));
    }

    #[test]
    fn test_lambertian_scattering_pdf_matches_cosine_pdf() {
        let mut rng = StdRng::seed_from_u64(2);
        let mat = Lambertian::from_color(Color::ONE);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);
        let rec = record_at_origin(true);

        let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
        let ScatterKind::Sampled(pdf) = srec.kind else {
            panic!("lambertian must sample");
        };

        for _ in 0..100 {
            let dir = pdf.generate(&mut rng);
            let scattered = Ray::new(rec.p, dir, 0.0);
            let expected = pdf.value(dir);
            assert!((mat.scattering_pdf(&ray, &rec, &scattered) - expected).abs() < 1e-5);
        }

        // Below the surface the lobe is empty
        let below = Ray::new(rec.p, -Vec3::Y, 0.0);
        assert_eq!(mat.scattering_pdf(&ray, &rec, &below), 0.0);
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mut rng = StdRng::seed_from_u64(3);
        let mat = Metal::new(Color::new(0.9, 0.9, 0.9), 0.0);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0).normalize(), 0.5);
        let rec = record_at_origin(true);

        let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
        assert!(srec.skip_pdf());
        let ScatterKind::Specular(out) = srec.kind else {
            unreachable!()
        };
        assert!((out.direction() - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-5);
        assert_eq!(out.time(), 0.5);
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        let mat = Metal::new(Color::ONE, 5.0);
        assert_eq!(mat.fuzz, 1.0);
    }

    #[test]
    fn test_metal_absorbs_grazing_fuzzed_rays() {
        // With maximum fuzz some grazing reflections end up below the surface
        let mut rng = StdRng::seed_from_u64(4);
        let mat = Metal::new(Color::ONE, 1.0);
        let ray = Ray::new(Vec3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0).normalize(), 0.0);
        let rec = record_at_origin(true);

        let absorbed = (0..200)
            .filter(|_| mat.scatter(&ray, &rec, &mut rng).is_none())
            .count();
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_always_specular() {
        let mut rng = StdRng::seed_from_u64(5);
        let mat = Dielectric::new(1.5);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.3, -1.0, 0.0).normalize(), 0.0);
        let rec = record_at_origin(true);

        for _ in 0..50 {
            let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert!(srec.skip_pdf());
            assert_eq!(srec.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mut rng = StdRng::seed_from_u64(6);
        let mat = Dielectric::new(1.5);
        // Leaving glass at a grazing angle: sin(theta) * 1.5 > 1
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.9, -0.2, 0.0).normalize(), 0.0);
        let rec = record_at_origin(false);

        for _ in 0..20 {
            let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
            let ScatterKind::Specular(out) = srec.kind else {
                unreachable!()
            };
            // Reflected back to the normal's side
            assert!(out.direction().dot(rec.normal) > 0.0);
        }
    }

    #[test]
    fn test_schlick_reflectance() {
        // Normal incidence on glass reflects about 4%
        assert!((Dielectric::reflectance(1.0, 1.5) - 0.04).abs() < 1e-3);
        // Grazing incidence reflects everything
        assert!((Dielectric::reflectance(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_diffuse_light_emits_front_face_only() {
        let mut rng = StdRng::seed_from_u64(7);
        let light = DiffuseLight::from_color(Color::new(4.0, 4.0, 4.0));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);

        assert_eq!(light.emitted(&ray, &record_at_origin(true)), Color::splat(4.0));
        assert_eq!(light.emitted(&ray, &record_at_origin(false)), Color::ZERO);
        assert!(light.scatter(&ray, &record_at_origin(true), &mut rng).is_none());
    }

    #[test]
    fn test_isotropic_scatter() {
        let mut rng = StdRng::seed_from_u64(8);
        let mat = Isotropic::from_color(Color::splat(0.5));
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let rec = record_at_origin(true);

        let srec = mat.scatter(&ray, &rec, &mut rng).unwrap();
        assert!(!srec.skip_pdf());
        let scattered = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert_eq!(mat.scattering_pdf(&ray, &rec, &scattered), 1.0 / (4.0 * PI));
    }

    #[test]
    fn test_reflect_and_refract() {
        let v = Vec3::new(1.0, -1.0, 0.0).normalize();
        assert!((reflect(v, Vec3::Y) - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);

        // Matching indices pass straight through
        let r = refract(v, Vec3::Y, 1.0);
        assert!((r - v).length() < 1e-5);
    }
}
