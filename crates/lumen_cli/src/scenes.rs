//! Built-in demo scenes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use lumen_core::{CheckerTexture, ImageTexture, NoiseTexture, Perlin, Texture};
use lumen_math::Vec3;
use lumen_renderer::{
    make_box, BvhNode, Camera, Color, ConstantMedium, Dielectric, DiffuseLight, Hittable,
    HittableList, Lambertian, Material, Metal, Quad, RenderConfig, Sphere, Triangle,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// Cornell box with two rotated boxes
    Cornell,
    /// Random spheres on a checkered ground, with motion blur and defocus
    Spheres,
    /// Cornell box with two smoke volumes
    Smoke,
    /// Perlin, checker and image textures under area lights
    Textures,
}

impl SceneKind {
    /// Render settings the scene is designed for.
    pub fn preset_config(self) -> RenderConfig {
        match self {
            SceneKind::Spheres => RenderConfig {
                samples_per_pixel: 100,
                max_depth: 50,
                use_sky_gradient: true,
                ..RenderConfig::default()
            },
            SceneKind::Cornell | SceneKind::Smoke | SceneKind::Textures => RenderConfig {
                samples_per_pixel: 200,
                max_depth: 50,
                background: Color::ZERO,
                ..RenderConfig::default()
            },
        }
    }
}

/// Options that change how a scene is assembled.
#[derive(Debug, Default)]
pub struct SceneOptions<'a> {
    /// Seed for randomly placed geometry and procedural noise
    pub seed: u64,
    /// Image for the main sphere of the textures scene
    pub texture: Option<&'a Path>,
}

/// A scene ready to render: accelerated geometry, light set and camera.
pub struct Scene {
    pub world: BvhNode,
    /// Copies of the emitters, sampled directly by the integrator
    pub lights: HittableList,
    /// Uninitialized; the caller sets the final resolution first
    pub camera: Camera,
    pub has_emitters: bool,
}

impl Scene {
    fn new(world: HittableList, lights: HittableList, camera: Camera, has_emitters: bool) -> Result<Self> {
        Ok(Self {
            world: BvhNode::from_list(world)?,
            lights,
            camera,
            has_emitters,
        })
    }

    /// The light set, or `None` when the scene has nothing to sample.
    pub fn lights(&self) -> Option<&HittableList> {
        if self.lights.is_empty() {
            None
        } else {
            Some(&self.lights)
        }
    }
}

pub fn build(kind: SceneKind, options: &SceneOptions) -> Result<Scene> {
    log::info!("Building scene {:?}", kind);
    let scene = match kind {
        SceneKind::Cornell => cornell_box()?,
        SceneKind::Spheres => random_spheres(options.seed)?,
        SceneKind::Smoke => cornell_smoke()?,
        SceneKind::Textures => textures(options)?,
    };
    log::info!(
        "Scene ready: {} light(s), BVH depth {}",
        scene.lights.len(),
        scene.world.depth()
    );
    Ok(scene)
}

fn lambertian(r: f32, g: f32, b: f32) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(Color::new(r, g, b)))
}

fn cornell_camera() -> Camera {
    Camera::new()
        .with_resolution(600, 600)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
}

/// The five walls of the box, open towards the camera.
fn cornell_walls(world: &mut HittableList) -> Result<()> {
    let red = lambertian(0.65, 0.05, 0.05);
    let white = lambertian(0.73, 0.73, 0.73);
    let green = lambertian(0.12, 0.45, 0.15);

    world.add(Box::new(Quad::new(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    )?));
    world.add(Box::new(Quad::new(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    )?));
    world.add(Box::new(Quad::new(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )?));
    world.add(Box::new(Quad::new(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    )?));
    world.add(Box::new(Quad::new(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white,
    )?));
    Ok(())
}

/// Tall and short boxes, turned about their own corner at the origin.
fn cornell_boxes() -> Result<(HittableList, HittableList)> {
    let white = lambertian(0.73, 0.73, 0.73);

    let mut tall = make_box(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone())?;
    tall.rotate_y_about(15.0, Vec3::ZERO);
    tall.translate(Vec3::new(265.0, 0.0, 295.0));

    let mut short = make_box(Vec3::ZERO, Vec3::new(165.0, 165.0, 165.0), white)?;
    short.rotate_y_about(-18.0, Vec3::ZERO);
    short.translate(Vec3::new(130.0, 0.0, 65.0));

    Ok((tall, short))
}

fn cornell_box() -> Result<Scene> {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(15.0)));
    let light_quad = || {
        Quad::new(
            Vec3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            light.clone(),
        )
    };

    let mut world = HittableList::new();
    cornell_walls(&mut world)?;
    world.add(Box::new(light_quad()?));

    let (tall, short) = cornell_boxes()?;
    world.add(Box::new(tall));
    world.add(Box::new(short));

    let lights = HittableList::new().with(light_quad()?);
    Scene::new(world, lights, cornell_camera(), true)
}

fn cornell_smoke() -> Result<Scene> {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(7.0)));
    let light_quad = || {
        Quad::new(
            Vec3::new(113.0, 554.0, 127.0),
            Vec3::new(330.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 305.0),
            light.clone(),
        )
    };

    let mut world = HittableList::new();
    cornell_walls(&mut world)?;
    world.add(Box::new(light_quad()?));

    let (tall, short) = cornell_boxes()?;
    world.add(Box::new(ConstantMedium::from_color(Box::new(tall), 0.01, Color::ZERO)?));
    world.add(Box::new(ConstantMedium::from_color(Box::new(short), 0.01, Color::ONE)?));

    let lights = HittableList::new().with(light_quad()?);
    Scene::new(world, lights, cornell_camera(), true)
}

fn random_color(rng: &mut StdRng, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

fn random_spheres(seed: u64) -> Result<Scene> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = HittableList::new();

    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ));
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(checker)),
    )?));

    let clearing = Vec3::new(4.0, 0.2, 0.0);
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let sphere = if choose_mat < 0.8 {
                // Diffuse, bouncing during the shutter interval
                let albedo = random_color(&mut rng, 0.0, 1.0) * random_color(&mut rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                Sphere::moving(center, center1, 0.2, Arc::new(Lambertian::from_color(albedo)))?
            } else if choose_mat < 0.95 {
                let albedo = random_color(&mut rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))?
            } else {
                Sphere::new(center, 0.2, glass.clone())?
            };
            world.add(Box::new(sphere));
        }
    }

    world.add(Box::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)?));
    world.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(0.4, 0.2, 0.1),
    )?));
    world.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )?));

    let camera = Camera::new()
        .with_resolution(800, 450)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Scene::new(world, HittableList::new(), camera, false)
}

fn textures(options: &SceneOptions) -> Result<Scene> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut world = HittableList::new();

    let ground: Arc<dyn Texture> = Arc::new(NoiseTexture::new(Perlin::new(&mut rng), 4.0));
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(ground)),
    )?));

    let globe: Arc<dyn Texture> = match options.texture {
        Some(path) => Arc::new(
            ImageTexture::open(path)
                .with_context(|| format!("Failed to load texture {}", path.display()))?,
        ),
        None => Arc::new(NoiseTexture::new(Perlin::new(&mut rng), 2.0)),
    };
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::new(globe)),
    )?));

    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::from_colors(
        0.5,
        Color::new(0.8, 0.1, 0.1),
        Color::splat(0.9),
    ));
    world.add(Box::new(Triangle::new(
        Vec3::new(-1.0, 0.0, -4.0),
        Vec3::new(-4.0, 0.0, -2.0),
        Vec3::new(-2.5, 3.5, -3.0),
        Arc::new(Lambertian::new(checker)),
    )?));

    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
    let light_quad = || {
        Quad::new(
            Vec3::new(3.0, 1.0, -2.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            light.clone(),
        )
    };
    let light_sphere = || Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, light.clone());

    world.add(Box::new(light_quad()?));
    world.add(Box::new(light_sphere()?));
    let lights = HittableList::new().with(light_quad()?).with(light_sphere()?);

    let camera = Camera::new()
        .with_resolution(800, 450)
        .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);

    Scene::new(world, lights, camera, true)
}
