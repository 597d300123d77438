//! Light sources, seeding the ray trees of a trace pass.

use core::f64::consts::{FRAC_PI_2, TAU};
use nalgebra::Unit;

use crate::{
    edit::{Editable, Morph},
    geometry::{fix_angle, try_unit, Planar, Vector},
    Color, Error, Float, Ray, Result,
};

/// Most rays a single point light or beam emits.
pub const MAX_RAYS: usize = 1 << 16;

/// Something that sends rays into a scene.
pub trait Emitter {
    /// Fresh, unpropagated rays.
    fn emit(&self) -> Vec<Ray>;
}

impl<T: Emitter + ?Sized> Emitter for &T {
    #[inline]
    fn emit(&self) -> Vec<Ray> {
        (*self).emit()
    }
}

impl<T: Emitter + ?Sized> Emitter for Box<T> {
    #[inline]
    fn emit(&self) -> Vec<Ray> {
        self.as_ref().emit()
    }
}

/// A fixed bundle of rays, emitted as is.
impl Emitter for Vec<Ray> {
    fn emit(&self) -> Vec<Ray> {
        self.iter()
            .map(|ray| Ray::new_unit_dir(ray.origin, ray.dir, ray.color))
            .collect()
    }
}

/// A single ray.
#[derive(Clone, Debug, PartialEq)]
pub struct RaySource {
    pub origin: Vector,
    dir: Unit<Vector>,
    pub color: Color,
}

impl RaySource {
    /// Returns an error if `dir` is zero.
    pub fn new(origin: Vector, dir: Vector, color: Color) -> Result<Self> {
        Ok(Self {
            origin,
            dir: try_unit(dir)?,
            color,
        })
    }

    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Unit<Vector> {
        &self.dir
    }

    /// Returns an error, leaving the direction unchanged, if `dir` is zero.
    #[inline]
    pub fn set_dir(&mut self, dir: Vector) -> Result<()> {
        self.dir = try_unit(dir)?;
        Ok(())
    }

    /// Points the ray at `target`. Does nothing if `target` is the origin.
    #[inline]
    pub fn point_at(&mut self, target: Vector) {
        // a zero direction just means there is nothing to point at
        let _ = self.set_dir(target - self.origin);
    }

    #[inline]
    pub fn set_intensity(&mut self, intensity: Float) {
        self.color = self.color.with_intensity(intensity);
    }
}

impl Emitter for RaySource {
    fn emit(&self) -> Vec<Ray> {
        vec![Ray::new_unit_dir(self.origin, self.dir, self.color)]
    }
}

impl Editable for RaySource {
    #[inline]
    fn anchor(&self) -> Vector {
        self.origin
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.origin += by;
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Rotate(pt) | Morph::Resize(pt) => self.point_at(pt),
            Morph::ResizeStart(_) | Morph::Vertex(..) => {}
        }
    }
}

/// Rays leaving a single point, evenly spread around it.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub origin: Vector,
    count: usize,
    pub color: Color,
}

impl PointLight {
    /// Distance, squared, the editor drags per emitted ray.
    const DRAG_PER_RAY_SQ: Float = 100.;

    /// `count` is clamped into `1..=MAX_RAYS`.
    #[inline]
    #[must_use]
    pub fn new(origin: Vector, count: usize, color: Color) -> Self {
        Self {
            origin,
            count: count.clamp(1, MAX_RAYS),
            color,
        }
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `count` is clamped into `1..=MAX_RAYS`.
    #[inline]
    pub fn set_count(&mut self, count: usize) {
        self.count = count.clamp(1, MAX_RAYS);
    }

    /// Sets the number of rays from a drag to `target`: the further, the more rays.
    pub fn count_from_distance(&mut self, target: Vector) {
        let n = ((target - self.origin).norm_squared() / Self::DRAG_PER_RAY_SQ).floor();
        // the cast saturates on huge or non-finite distances, and the count is clamped
        self.set_count(n as usize);
    }
}

impl Emitter for PointLight {
    fn emit(&self) -> Vec<Ray> {
        let step = TAU / self.count as Float;
        (0..self.count)
            .map(|i| {
                let dir = Unit::new_normalize(Vector::from_angle(i as Float * step));
                Ray::new_unit_dir(self.origin, dir, self.color)
            })
            .collect()
    }
}

impl Editable for PointLight {
    #[inline]
    fn anchor(&self) -> Vector {
        self.origin
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.origin += by;
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Rotate(pt) | Morph::Resize(pt) => self.count_from_distance(pt),
            Morph::ResizeStart(_) | Morph::Vertex(..) => {}
        }
    }
}

/// Parallel rays, leaving a segment at evenly spaced points.
///
/// The segment starts at `origin` and runs a quarter turn counter-clockwise from the rays' heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub origin: Vector,
    heading: Float,
    length: Float,
    spacing: Float,
    pub color: Color,
}

impl Beam {
    /// Spacing times density.
    const DENSITY_SCALE: Float = 100.;

    /// Returns an error if `length` is negative, `spacing` isn't positive, or either isn't finite.
    pub fn try_new(
        origin: Vector,
        heading: Float,
        length: Float,
        spacing: Float,
        color: Color,
    ) -> Result<Self> {
        let mut beam = Self {
            origin,
            heading: fix_angle(Error::check_finite(heading, "beam heading")?),
            length: 0.,
            spacing: 1.,
            color,
        };
        beam.set_length(length)?;
        beam.set_spacing(spacing)?;
        Ok(beam)
    }

    #[inline]
    #[must_use]
    pub fn heading(&self) -> Float {
        self.heading
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> Float {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn spacing(&self) -> Float {
        self.spacing
    }

    /// Unit vector along the rays.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> Vector {
        Vector::from_angle(self.heading)
    }

    /// Unit vector along the beam's segment.
    #[inline]
    #[must_use]
    pub fn across(&self) -> Vector {
        Vector::from_angle(self.heading + FRAC_PI_2)
    }

    /// The end of the beam's segment opposite to `origin`.
    #[inline]
    #[must_use]
    pub fn far_end(&self) -> Vector {
        self.origin + self.across() * self.length
    }

    /// Number of rays emitted: one at each multiple of the spacing, up to the length,
    /// and at most [`MAX_RAYS`].
    #[inline]
    #[must_use]
    pub fn ray_count(&self) -> usize {
        let gaps = (self.length / self.spacing).floor();
        if gaps < (MAX_RAYS - 1) as Float {
            gaps as usize + 1
        } else {
            MAX_RAYS
        }
    }

    pub fn set_length(&mut self, length: Float) -> Result<()> {
        if !(length.is_finite() && length >= 0.) {
            return Err(Error::InvalidShape(format!(
                "beam length must be finite and non-negative, got {length}"
            )));
        }
        self.length = length;
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: Float) -> Result<()> {
        if !(spacing.is_finite() && spacing > 0.) {
            return Err(Error::InvalidShape(format!(
                "beam spacing must be finite and positive, got {spacing}"
            )));
        }
        self.spacing = spacing;
        Ok(())
    }

    /// Sets the spacing to `100 / density`.
    #[inline]
    pub fn set_density(&mut self, density: Float) -> Result<()> {
        self.set_spacing(Self::DENSITY_SCALE / density)
    }

    /// Turns the beam's segment towards `target`, keeping its length.
    ///
    /// Does nothing if `target` is the origin.
    pub fn aim(&mut self, target: Vector) {
        if let Ok(across) = try_unit(target - self.origin) {
            self.heading = fix_angle(across.heading() - FRAC_PI_2);
        }
    }

    /// Turns the beam's segment towards `target`, and stretches it up to there.
    ///
    /// The length is snapped down to a multiple of the spacing, unless that leaves nothing.
    pub fn stretch(&mut self, target: Vector) {
        let disp = target - self.origin;
        let length = disp.norm();
        if !(length.is_finite() && length > 0.) {
            return;
        }

        self.aim(target);

        let snapped = length - length % self.spacing;
        self.length = if snapped > 0. { snapped } else { length };
    }
}

impl Emitter for Beam {
    fn emit(&self) -> Vec<Ray> {
        let dir = Unit::new_normalize(self.dir());
        let across = self.across();
        (0..self.ray_count())
            .map(|i| {
                let at = self.origin + across * (i as Float * self.spacing);
                Ray::new_unit_dir(at, dir, self.color)
            })
            .collect()
    }
}

impl Editable for Beam {
    #[inline]
    fn anchor(&self) -> Vector {
        self.origin
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.origin += by;
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Rotate(pt) => self.aim(pt),
            Morph::Resize(pt) => self.stretch(pt),
            Morph::ResizeStart(pt) => {
                let far = self.far_end();
                if let Ok(across) = try_unit(far - pt) {
                    self.origin = pt;
                    self.length = (far - pt).norm();
                    self.heading = fix_angle(across.heading() - FRAC_PI_2);
                }
            }
            Morph::Vertex(..) => {}
        }
    }
}

/// Every kind of light source.
#[derive(Clone, Debug, PartialEq)]
pub enum LightSource {
    Ray(RaySource),
    Point(PointLight),
    Beam(Beam),
}

impl From<RaySource> for LightSource {
    fn from(value: RaySource) -> Self {
        Self::Ray(value)
    }
}

impl From<PointLight> for LightSource {
    fn from(value: PointLight) -> Self {
        Self::Point(value)
    }
}

impl From<Beam> for LightSource {
    fn from(value: Beam) -> Self {
        Self::Beam(value)
    }
}

impl LightSource {
    #[must_use]
    pub fn color(&self) -> &Color {
        match self {
            Self::Ray(s) => &s.color,
            Self::Point(s) => &s.color,
            Self::Beam(s) => &s.color,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        match self {
            Self::Ray(s) => s.color = color,
            Self::Point(s) => s.color = color,
            Self::Beam(s) => s.color = color,
        }
    }
}

impl Emitter for LightSource {
    fn emit(&self) -> Vec<Ray> {
        match self {
            Self::Ray(s) => s.emit(),
            Self::Point(s) => s.emit(),
            Self::Beam(s) => s.emit(),
        }
    }
}

impl Editable for LightSource {
    fn anchor(&self) -> Vector {
        match self {
            Self::Ray(s) => s.anchor(),
            Self::Point(s) => s.anchor(),
            Self::Beam(s) => s.anchor(),
        }
    }

    fn translate(&mut self, by: Vector) {
        match self {
            Self::Ray(s) => s.translate(by),
            Self::Point(s) => s.translate(by),
            Self::Beam(s) => s.translate(by),
        }
    }

    fn morph(&mut self, morph: &Morph) {
        match self {
            Self::Ray(s) => s.morph(morph),
            Self::Point(s) => s.morph(morph),
            Self::Beam(s) => s.morph(morph),
        }
    }
}
