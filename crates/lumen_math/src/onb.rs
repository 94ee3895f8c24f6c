use crate::Vec3;

/// Orthonormal basis built around a single direction (the local `w` axis).
///
/// Used to turn directions sampled around +Z into world space around an
/// arbitrary normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis is `n` (normalized).
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        // Any helper axis works as long as it is not (nearly) parallel to w
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    /// Map local coordinates (a along u, b along v, c along w) into world space.
    #[inline]
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}
