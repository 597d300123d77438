use super::*;

/// Adds the point where the probe crosses `segment`, if any.
#[inline]
pub(crate) fn add_segment_contact(segment: &Segment, ctx: &mut CollisionCtx) {
    if let Some(pt) = segment.intersect(ctx.probe()) {
        ctx.add_contact(pt, Patch::Whole);
    }
}

/// A flat mirror, reflecting everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mirror(pub Segment);

impl Mirror {
    #[inline]
    #[must_use]
    pub fn between(start: Vector, end: Vector) -> Self {
        Self(Segment::between(start, end))
    }
}

impl Optic for Mirror {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        add_segment_contact(&self.0, ctx)
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let axis = self.0.dir()?;
        let mut emission = Emission::new();
        emission.push(ray.reflected(contact.point, &axis));
        Ok(emission)
    }
}

impl Editable for Mirror {
    #[inline]
    fn anchor(&self) -> Vector {
        self.0.anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.0.translate(by)
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        self.0.morph(morph)
    }
}

/// A black segment, absorbing everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Void(pub Segment);

impl Void {
    #[inline]
    #[must_use]
    pub fn between(start: Vector, end: Vector) -> Self {
        Self(Segment::between(start, end))
    }
}

impl Optic for Void {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        add_segment_contact(&self.0, ctx)
    }

    #[inline]
    fn return_ray(&self, _: &Ray, _: &Contact) -> Result<Emission> {
        Ok(Emission::new())
    }
}

impl Editable for Void {
    #[inline]
    fn anchor(&self) -> Vector {
        self.0.anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.0.translate(by)
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        self.0.morph(morph)
    }
}
