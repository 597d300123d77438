use super::*;

/// What an arc does to the rays hitting it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArcFinish {
    /// Reflects everything, like a curved mirror.
    Mirror,
    /// Bounds a medium of the given refractive index, on the circle's inner side.
    Refractive(Float),
}

/// A piece of circle, between two angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arc {
    pub circle: Circle,
    pub span: ArcSpan,
    finish: ArcFinish,
}

impl Arc {
    #[inline]
    #[must_use]
    pub fn mirror(circle: Circle, span: ArcSpan) -> Self {
        Self {
            circle,
            span,
            finish: ArcFinish::Mirror,
        }
    }

    /// Returns an error if a refractive index isn't positive and finite.
    pub fn try_new(circle: Circle, span: ArcSpan, finish: ArcFinish) -> Result<Self> {
        let mut arc = Self::mirror(circle, span);
        arc.set_finish(finish)?;
        Ok(arc)
    }

    #[inline]
    #[must_use]
    pub fn finish(&self) -> ArcFinish {
        self.finish
    }

    pub fn set_finish(&mut self, finish: ArcFinish) -> Result<()> {
        if let ArcFinish::Refractive(n) = finish {
            check_index(n)?;
        }
        self.finish = finish;
        Ok(())
    }

    /// The endpoints of the arc, counter-clockwise.
    #[must_use]
    pub fn endpoints(&self) -> [Vector; 2] {
        let start = self.span.start();
        [start, start + self.span.span()]
            .map(|a| self.circle.center + Vector::from_angle(a) * self.circle.radius)
    }

    #[inline]
    #[must_use]
    pub fn covers(&self, pt: &Vector) -> bool {
        self.span.contains_angle((pt - self.circle.center).heading())
    }
}

impl Optic for Arc {
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        for pt in self.circle.intersect(ctx.probe()) {
            if self.covers(&pt) {
                ctx.add_contact(pt, Patch::Whole);
            }
        }
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let tangent = circle_tangent(&self.circle, contact.point)?;

        match self.finish {
            ArcFinish::Mirror => {
                let mut emission = Emission::new();
                emission.push(ray.reflected(contact.point, &tangent));
                Ok(emission)
            }
            ArcFinish::Refractive(n) => {
                let leaving = self.circle.contains(&midpoint(ray.origin, contact.point));
                refraction::refract(ray, contact.point, &tangent, n, leaving)
            }
        }
    }
}

impl Editable for Arc {
    #[inline]
    fn anchor(&self) -> Vector {
        self.circle.center
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.circle.center += by;
    }

    fn morph(&mut self, morph: &Morph) {
        let center = self.circle.center;

        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Rotate(pt) => self.span.set_start((pt - center).heading()),
            Morph::Resize(pt) => {
                let v = pt - center;
                self.span.set_span(v.heading() - self.span.start());
                self.circle.radius = v.norm();
            }
            Morph::ResizeStart(_) | Morph::Vertex(..) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::{FRAC_PI_2, PI};
    use refract::{resolve, Color};

    fn upper_half() -> ArcSpan {
        ArcSpan::new(0., PI)
    }

    #[test]
    fn hits_outside_the_span_are_ignored() {
        let arc = Arc::mirror(Circle::new(Vector::zeros(), 5.), upper_half());
        let scene = [arc];

        // would hit the lower half first
        let ray = Ray::new([0., -10.], [0., 1.], Color::WHITE).unwrap();
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        assert_abs_diff_eq!(hit.contact.point, Vector::new(0., 5.), epsilon = 1e-9);

        let ray = Ray::new([-10., -1.], [1., 0.], Color::WHITE).unwrap();
        assert!(resolve(&scene, ray.half_line(), 1e-6).is_none());
    }

    #[test]
    fn curved_mirror_reflects_about_its_tangent() {
        let arc = Arc::mirror(Circle::new(Vector::zeros(), 5.), upper_half());
        let ray = Ray::new([3., 0.], [0., 1.], Color::WHITE).unwrap();

        let scene = [arc];
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        assert_abs_diff_eq!(hit.contact.point, Vector::new(3., 4.), epsilon = 1e-9);

        let out = &arc.return_ray(&ray, &hit.contact).unwrap()[0];
        // the normal at (3, 4) is (0.6, 0.8)
        let normal = Vector::new(0.6, 0.8);
        assert_abs_diff_eq!(out.dir.dot(&normal), -ray.dir.dot(&normal), epsilon = 1e-9);
        assert_eq!(out.intensity(), 1.);
    }

    #[test]
    fn refractive_arcs_split_rays() {
        let arc = Arc::try_new(
            Circle::new(Vector::zeros(), 5.),
            upper_half(),
            ArcFinish::Refractive(1.5),
        )
        .unwrap();
        let ray = Ray::new([0., 10.], [0., -1.], Color::WHITE).unwrap();

        let scene = [arc];
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        let out = arc.return_ray(&ray, &hit.contact).unwrap();
        assert_eq!(out.len(), 2);
        assert_abs_diff_eq!(out[0].dir.into_inner(), Vector::new(0., -1.), epsilon = 1e-9);

        assert!(Arc::try_new(arc.circle, arc.span, ArcFinish::Refractive(0.)).is_err());
    }

    #[test]
    fn handles_rotate_and_resize() {
        let mut arc = Arc::mirror(Circle::new(Vector::zeros(), 5.), upper_half());

        arc.morph(&Morph::Rotate([0., 3.].into()));
        assert_abs_diff_eq!(arc.span.start(), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.span.span(), PI, epsilon = 1e-12);

        arc.morph(&Morph::Resize([-2., 0.].into()));
        assert_abs_diff_eq!(arc.span.span(), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.circle.radius, 2.);

        let [start, end] = arc.endpoints();
        assert_abs_diff_eq!(start, Vector::new(0., 2.), epsilon = 1e-12);
        assert_abs_diff_eq!(end, Vector::new(-2., 0.), epsilon = 1e-12);
    }
}
