//! Perlin gradient noise with trilinear Hermite smoothing and turbulence.

use lumen_math::Vec3;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// Lattice gradient noise generator.
///
/// The permutation tables and gradients are drawn once from the supplied
/// generator, after which evaluation is a pure function of the point.
#[derive(Clone, Debug)]
pub struct Perlin {
    ranvec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let ranvec = (0..POINT_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
                .normalize_or_zero()
            })
            .collect();

        Self {
            ranvec,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothed noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i32;
        let j = p.y.floor() as i32;
        let k = p.z.floor() as i32;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *cell = self.ranvec[idx];
                }
            }
        }

        perlin_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves of noise, each at double frequency and half weight.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    p.shuffle(rng);
    p
}

fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    // Hermite cubic to remove grid artifacts
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        let fi = i as f32;
        for (j, row) in plane.iter().enumerate() {
            let fj = j as f32;
            for (k, gradient) in row.iter().enumerate() {
                let fk = k as f32;
                let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight_v);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_perlin_is_zero_on_lattice() {
        let mut rng = StdRng::seed_from_u64(7);
        let perlin = Perlin::new(&mut rng);

        // Gradient noise vanishes at integer lattice points
        for p in [Vec3::ZERO, Vec3::new(3.0, -2.0, 5.0), Vec3::new(100.0, 1.0, -7.0)] {
            assert!(perlin.noise(p).abs() < 1e-5);
        }
    }

    #[test]
    fn test_perlin_is_bounded_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let perlin = Perlin::new(&mut rng);

        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.137, i as f32 * 0.071, -(i as f32) * 0.29);
            let n = perlin.noise(p);
            assert!((-1.5..=1.5).contains(&n), "noise {} out of range", n);
            assert_eq!(n, perlin.noise(p));
        }
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        let perlin = Perlin::new(&mut rng);
        for i in 0..50 {
            let p = Vec3::splat(i as f32 * 0.31);
            assert!(perlin.turbulence(p, 7) >= 0.0);
        }
    }

    #[test]
    fn test_permutations_are_complete() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut perm = generate_perm(&mut rng);
        perm.sort_unstable();
        assert_eq!(perm, (0..POINT_COUNT).collect::<Vec<_>>());
    }
}
