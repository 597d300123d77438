use super::*;

/// A thin lens. Converging when its focal length is positive, diverging otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    pub segment: Segment,
    focal_length: Float,
}

impl Lens {
    pub const DEFAULT_FOCAL_LENGTH: Float = 200.;

    #[inline]
    #[must_use]
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            focal_length: Self::DEFAULT_FOCAL_LENGTH,
        }
    }

    /// Returns an error if `focal_length` is zero or isn't finite.
    pub fn try_new(segment: Segment, focal_length: Float) -> Result<Self> {
        let mut lens = Self::new(segment);
        lens.set_focal_length(focal_length)?;
        Ok(lens)
    }

    #[inline]
    #[must_use]
    pub fn focal_length(&self) -> Float {
        self.focal_length
    }

    pub fn set_focal_length(&mut self, focal_length: Float) -> Result<()> {
        if !focal_length.is_finite() || focal_length == 0. {
            return Err(Error::InvalidShape(format!(
                "focal length must be finite and non-zero, got {focal_length}"
            )));
        }
        self.focal_length = focal_length;
        Ok(())
    }

    /// Where rays heading along `dir` converge (or seem to diverge from).
    pub fn focus(&self, dir: &Unit<Vector>) -> Result<Vector> {
        let axis = self.segment.dir()?;
        // cosine of the angle between `dir` and the lens' normal
        let c = axis.perp(dir.as_ref()).abs();
        let dist = Error::check_finite(self.focal_length / c, "a lens focal distance")?;
        Ok(self.segment.midpoint() + dir.as_ref() * dist)
    }
}

impl Optic for Lens {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        add_segment_contact(&self.segment, ctx)
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let to_focus = self.focus(&ray.dir)? - contact.point;
        let dir = try_unit(to_focus * self.focal_length.signum())?;

        let mut emission = Emission::new();
        emission.push(ray.spawn(contact.point, dir, ray.color));
        Ok(emission)
    }
}

impl Editable for Lens {
    #[inline]
    fn anchor(&self) -> Vector {
        self.segment.anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.segment.translate(by)
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        self.segment.morph(morph)
    }
}
