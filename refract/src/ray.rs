use nalgebra::Unit;

use crate::{
    geometry::{try_unit, HalfLine, Vector},
    Float, Result,
};

/// The color of a ray: three channels and an intensity (its alpha), all in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub rgb: [Float; 3],
    pub intensity: Float,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self {
        rgb: [1.; 3],
        intensity: 1.,
    };

    /// Channels and intensity are clamped into `[0, 1]`, `NaN`s become `0`.
    #[inline]
    #[must_use]
    pub fn new(rgb: [Float; 3], intensity: Float) -> Self {
        Self {
            rgb: rgb.map(clamp_unit),
            intensity: clamp_unit(intensity),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_intensity(self, intensity: Float) -> Self {
        Self {
            intensity: clamp_unit(intensity),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rgb(self, rgb: [Float; 3]) -> Self {
        Self::new(rgb, self.intensity)
    }

    #[inline]
    #[must_use]
    pub fn channel_sum(&self) -> Float {
        self.rgb.iter().sum()
    }

    /// How much light this color actually carries.
    #[inline]
    #[must_use]
    pub fn energy(&self) -> Float {
        self.channel_sum() * self.intensity
    }
}

#[inline]
fn clamp_unit(x: Float) -> Float {
    if x.is_nan() {
        0.
    } else {
        x.clamp(0., 1.)
    }
}

/// Reflects `d` about the line directed by `axis`: `2(d·a)a - d`.
#[inline]
#[must_use]
pub fn reflect_about_axis(d: &Unit<Vector>, axis: &Unit<Vector>) -> Unit<Vector> {
    let a = axis.as_ref();
    let dd = 2. * d.dot(a);
    // SAFETY: orthogonal symmetries preserve euclidean norms
    Unit::new_unchecked(a * dd - d.as_ref())
}

/// A light ray, and everything it turned into after hitting the scene.
///
/// `end` is unset until the ray is propagated, and stays unset for rays
/// the engine decided not to follow.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector,
    pub dir: Unit<Vector>,
    pub end: Option<Vector>,
    pub color: Color,
    pub children: Vec<Ray>,
}

impl Ray {
    /// Returns an error if `dir` is zero.
    #[inline]
    pub fn new(origin: impl Into<Vector>, dir: impl Into<Vector>, color: Color) -> Result<Self> {
        try_unit(dir.into()).map(|dir| Self::new_unit_dir(origin, dir, color))
    }

    #[inline]
    #[must_use]
    pub fn new_unit_dir(origin: impl Into<Vector>, dir: Unit<Vector>, color: Color) -> Self {
        Self {
            origin: origin.into(),
            dir,
            end: None,
            color,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn half_line(&self) -> HalfLine {
        HalfLine::new(self.origin, self.dir)
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> Float {
        self.color.intensity
    }

    /// Get the point at distance `t` (can be negative) from the ray's origin
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vector {
        self.origin + self.dir.as_ref() * t
    }

    /// A new ray starting at `at`, with no end or children yet.
    #[inline]
    #[must_use]
    pub fn spawn(&self, at: Vector, dir: Unit<Vector>, color: Color) -> Self {
        Self::new_unit_dir(at, dir, color)
    }

    /// A ray starting at `at`, mirroring this one about `axis`, with the same color.
    #[inline]
    #[must_use]
    pub fn reflected(&self, at: Vector, axis: &Unit<Vector>) -> Self {
        self.spawn(at, reflect_about_axis(&self.dir, axis), self.color)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.iter().chain(self.dir.iter()).all(|c| c.is_finite())
            && self.color.intensity.is_finite()
    }

    /// Number of rays in this tree, `self` included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Length of the longest chain of rays from `self` to a leaf, `self` included.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Ray::depth).max().unwrap_or(0)
    }

    /// Iterates over this tree in pre-order.
    #[inline]
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Ray>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Ray;

    fn next(&mut self) -> Option<Self::Item> {
        let ray = self.stack.pop()?;
        self.stack.extend(ray.children.iter().rev());
        Some(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new([0., 0.], [0., 0.], Color::WHITE).is_err());
    }

    #[test]
    fn reflection_flips_the_axial_component() {
        let axis = Unit::new_normalize(Vector::new(0., 1.));
        let d = Unit::new_normalize(Vector::new(1., 1.));
        let r = reflect_about_axis(&d, &axis);
        assert_abs_diff_eq!(r.into_inner(), Vector::new(-1., 1.).normalize(), epsilon = 1e-12);
    }

    #[test]
    fn colors_are_clamped() {
        let c = Color::new([2., -1., Float::NAN], 1.5);
        assert_eq!(c.rgb, [1., 0., 0.]);
        assert_eq!(c.intensity, 1.);
        assert_eq!(c.with_intensity(-0.5).intensity, 0.);
        assert_abs_diff_eq!(Color::WHITE.with_intensity(0.5).energy(), 1.5);
    }

    #[test]
    fn tree_walk_is_pre_order() {
        let mut root = Ray::new([0., 0.], [1., 0.], Color::WHITE).unwrap();
        let mut a = root.spawn([1., 0.].into(), root.dir, Color::WHITE.with_intensity(0.1));
        a.children.push(a.spawn([2., 0.].into(), a.dir, Color::WHITE.with_intensity(0.2)));
        root.children.push(a);
        root.children.push(root.spawn([1., 1.].into(), root.dir, Color::WHITE.with_intensity(0.3)));

        let order: Vec<_> = root.walk().map(Ray::intensity).collect();
        assert_eq!(order, [1., 0.1, 0.2, 0.3]);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.depth(), 3);
    }
}
