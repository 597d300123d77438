use super::*;

/// A colored pane: lets some of each color channel through, reflects part of the rest,
/// and absorbs what's left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Filter {
    pub segment: Segment,
    pass: [Float; 3],
    reflectance: Float,
}

impl Filter {
    /// `pass` holds the fraction of each channel let through, `reflectance` the fraction
    /// of the stopped light that gets reflected. All are clamped into `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn new(segment: Segment, pass: [Float; 3], reflectance: Float) -> Self {
        let Color {
            rgb: pass,
            intensity: reflectance,
        } = Color::new(pass, reflectance);

        Self {
            segment,
            pass,
            reflectance,
        }
    }

    #[inline]
    #[must_use]
    pub fn pass(&self) -> &[Float; 3] {
        &self.pass
    }

    #[inline]
    #[must_use]
    pub fn reflectance(&self) -> Float {
        self.reflectance
    }

    /// The colors of the transmitted and reflected rays, for an incoming ray of color `color`.
    #[must_use]
    pub fn split(&self, color: &Color) -> (Color, Color) {
        let transmitted: [Float; 3] = core::array::from_fn(|i| color.rgb[i] * self.pass[i]);
        let reflected: [Float; 3] =
            core::array::from_fn(|i| (color.rgb[i] - transmitted[i]) * self.reflectance);

        (color.with_rgb(transmitted), color.with_rgb(reflected))
    }
}

impl Optic for Filter {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        add_segment_contact(&self.segment, ctx)
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let (transmitted, reflected) = self.split(&ray.color);
        let mut emission = Emission::new();

        if reflected.energy() > 0. {
            let mut out = ray.reflected(contact.point, &self.segment.dir()?);
            out.color = reflected;
            emission.push(out);
        }

        if transmitted.energy() > 0. {
            emission.push(ray.spawn(contact.point, ray.dir, transmitted));
        }

        Ok(emission)
    }
}

impl Editable for Filter {
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
