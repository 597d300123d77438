use super::*;

/// Refractive index blocks are created with.
pub const DEFAULT_INDEX: Float = 1.5;

pub(crate) fn check_index(index: Float) -> Result<Float> {
    if index.is_finite() && index > 0. {
        Ok(index)
    } else {
        Err(Error::InvalidShape(format!(
            "refractive index must be positive and finite, got {index}"
        )))
    }
}

/// The point tested to know whether a ray from `origin` to `hit` travelled inside a block.
#[inline]
pub(crate) fn midpoint(origin: Vector, hit: Vector) -> Vector {
    (origin + hit) * 0.5
}

/// A disk of transparent material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircularBlock {
    pub circle: Circle,
    index: Float,
}

impl CircularBlock {
    #[inline]
    #[must_use]
    pub fn new(circle: Circle) -> Self {
        Self {
            circle,
            index: DEFAULT_INDEX,
        }
    }

    /// Returns an error if `index` isn't positive and finite.
    pub fn try_new(circle: Circle, index: Float) -> Result<Self> {
        Ok(Self {
            circle,
            index: check_index(index)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> Float {
        self.index
    }

    pub fn set_index(&mut self, index: Float) -> Result<()> {
        self.index = check_index(index)?;
        Ok(())
    }
}

/// The tangent to `circle` at `pt`, a point on it.
pub(crate) fn circle_tangent(circle: &Circle, pt: Vector) -> Result<Unit<Vector>> {
    try_unit((pt - circle.center).orth())
}

impl Optic for CircularBlock {
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        for pt in self.circle.intersect(ctx.probe()) {
            ctx.add_contact(pt, Patch::Whole);
        }
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let tangent = circle_tangent(&self.circle, contact.point)?;
        let leaving = self.circle.contains(&midpoint(ray.origin, contact.point));
        refraction::refract(ray, contact.point, &tangent, self.index, leaving)
    }
}

impl Editable for CircularBlock {
    #[inline]
    fn anchor(&self) -> Vector {
        self.circle.anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.circle.translate(by)
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        self.circle.morph(morph)
    }
}

/// A polygon of transparent material. Doesn't need to be convex.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonalBlock {
    polygon: Polygon,
    index: Float,
    rectangle: bool,
}

impl PolygonalBlock {
    /// Returns an error if there are less than 3 vertices, or `index`
    /// isn't positive and finite.
    pub fn try_new(vertices: Vec<Vector>, index: Float) -> Result<Self> {
        Ok(Self {
            polygon: Polygon::try_new(vertices)?,
            index: check_index(index)?,
            rectangle: false,
        })
    }

    /// An axis-aligned `w` by `h` rectangle with a corner at `(x, y)`.
    ///
    /// Its [`Morph::Resize`] handle is the opposite corner.
    pub fn rectangle(x: Float, y: Float, w: Float, h: Float, index: Float) -> Result<Self> {
        if w == 0. || h == 0. {
            return Err(Error::InvalidShape(format!(
                "rectangle sides must not be zero, got {w} by {h}"
            )));
        }

        let mut block = Self::try_new(
            vec![
                [x, y].into(),
                [x + w, y].into(),
                [x + w, y + h].into(),
                [x, y + h].into(),
            ],
            index,
        )?;
        block.rectangle = true;
        Ok(block)
    }

    #[inline]
    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> Float {
        self.index
    }

    pub fn set_index(&mut self, index: Float) -> Result<()> {
        self.index = check_index(index)?;
        Ok(())
    }

    /// Whether this block was built by [`Self::rectangle`].
    #[inline]
    #[must_use]
    pub fn is_rectangle(&self) -> bool {
        self.rectangle
    }

    fn drag_corner(&mut self, pt: Vector) {
        if let [_, right, _, top] = *self.polygon.vertices() {
            self.polygon.set_vertex(1, [pt.x, right.y].into());
            self.polygon.set_vertex(2, pt);
            self.polygon.set_vertex(3, [top.x, pt.y].into());
        }
    }
}

impl Optic for PolygonalBlock {
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        for (i, edge) in self.polygon.edges().iter().enumerate() {
            if let Some(pt) = edge.intersect(ctx.probe()) {
                ctx.add_contact(pt, Patch::Edge(i));
            }
        }
    }

    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        let edge = match contact.patch {
            Patch::Edge(i) => self.polygon.edges().get(i),
            Patch::Whole => None,
        }
        .ok_or_else(|| Error::InvalidShape(format!("no polygon edge at {:?}", contact.patch)))?;

        let tangent = edge.dir()?;
        let leaving = self.polygon.contains(&midpoint(ray.origin, contact.point));
        refraction::refract(ray, contact.point, &tangent, self.index, leaving)
    }
}

impl Editable for PolygonalBlock {
    #[inline]
    fn anchor(&self) -> Vector {
        self.polygon.anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.polygon.translate(by)
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::Resize(pt) if self.rectangle => self.drag_corner(pt),
            _ => self.polygon.morph(morph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use refract::{resolve, Color};

    #[test]
    fn normal_incidence_goes_straight_through() {
        let block = CircularBlock::new(Circle::new(Vector::zeros(), 5.));
        let ray = Ray::new([-10., 0.], [1., 0.], Color::WHITE).unwrap();

        let scene = [block];
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        assert_abs_diff_eq!(hit.contact.point, Vector::new(-5., 0.), epsilon = 1e-9);

        let out = block.return_ray(&ray, &hit.contact).unwrap();
        assert_eq!(out.len(), 2);

        let (refracted, reflected) = (&out[0], &out[1]);
        assert_abs_diff_eq!(refracted.dir.into_inner(), Vector::new(1., 0.), epsilon = 1e-9);
        assert_relative_eq!(reflected.intensity(), 0.04, epsilon = 1e-9);
        assert_relative_eq!(refracted.intensity(), 0.96, epsilon = 1e-9);
        assert_abs_diff_eq!(reflected.dir.into_inner(), Vector::new(-1., 0.), epsilon = 1e-9);
    }

    #[test]
    fn rays_inside_a_disk_are_leaving() {
        let block = CircularBlock::new(Circle::new(Vector::zeros(), 5.));
        // steep enough for total internal reflection
        let ray = Ray::new([0., 4.], [1., 0.], Color::WHITE).unwrap();

        let scene = [block];
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        let out = block.return_ray(&ray, &hit.contact).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].intensity(), 1.);
    }

    #[test]
    fn polygon_hits_remember_their_edge() {
        let block = PolygonalBlock::rectangle(0., 0., 4., 2., DEFAULT_INDEX).unwrap();
        let ray = Ray::new([2., -3.], [0., 1.], Color::WHITE).unwrap();

        let scene = [block];
        let hit = resolve(&scene, ray.half_line(), 1e-6).unwrap();
        assert_eq!(hit.contact.patch, Patch::Edge(0));

        let bogus = Contact {
            point: hit.contact.point,
            patch: Patch::Whole,
        };
        assert!(scene[0].return_ray(&ray, &bogus).is_err());
    }

    #[test]
    fn rectangles_resize_by_their_far_corner() {
        let mut block = PolygonalBlock::rectangle(0., 0., 4., 2., DEFAULT_INDEX).unwrap();
        block.morph(&Morph::Resize([6., 5.].into()));

        let vertices: Vec<_> = block.polygon().vertices().to_vec();
        assert_eq!(
            vertices,
            [
                Vector::new(0., 0.),
                Vector::new(6., 0.),
                Vector::new(6., 5.),
                Vector::new(0., 5.),
            ]
        );
        assert!(block.polygon().contains(&Vector::new(5., 4.)));
    }

    #[test]
    fn invalid_blocks_are_rejected() {
        assert!(PolygonalBlock::rectangle(0., 0., 0., 2., 1.5).is_err());
        assert!(PolygonalBlock::try_new(vec![Vector::zeros(), Vector::x()], 1.5).is_err());
        assert!(CircularBlock::try_new(Circle::new(Vector::zeros(), 1.), -1.).is_err());
        assert!(CircularBlock::new(Circle::new(Vector::zeros(), 1.))
            .set_index(Float::NAN)
            .is_err());
    }
}
