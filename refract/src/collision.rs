//! Finding the first surface a ray bumps into.

use std::{rc::Rc, sync::Arc};

use arrayvec::ArrayVec;
use core::ops::Deref;

use crate::{
    geometry::{HalfLine, Vector},
    Float, Ray, Result,
};

/// The rays a surface sends back after being hit: none, one, or a reflected/refracted pair.
pub type Emission = ArrayVec<Ray, 2>;

/// Which part of a surface's boundary was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Patch {
    /// The surface's boundary is a single piece (a segment, a circle, an arc).
    Whole,
    /// The `i`th edge of a polygon.
    Edge(usize),
}

/// A point where a ray meets a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub point: Vector,
    pub patch: Patch,
}

/// Keeps track of the closest contact found so far while the scene is being scanned.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionCtx {
    probe: HalfLine,
    eps_sq: Float,
    current: usize,
    closest: Option<(Float, usize, Contact)>,
}

impl CollisionCtx {
    #[inline]
    #[must_use]
    pub fn new(probe: HalfLine, eps_sq: Float) -> Self {
        Self {
            probe,
            eps_sq,
            current: 0,
            closest: None,
        }
    }

    /// The ray being tested against the scene.
    #[inline]
    #[must_use]
    pub fn probe(&self) -> &HalfLine {
        &self.probe
    }

    /// Records a point where the probe meets the surface currently being scanned.
    ///
    /// Points at a squared distance of at most `eps_sq` from the probe's origin are
    /// discarded: they are, most likely, the point the probe just bounced off of.
    ///
    /// On a tie, the contact recorded first is kept.
    #[inline]
    pub fn add_contact(&mut self, point: Vector, patch: Patch) {
        let d = (point - self.probe.origin).norm_squared();

        if d > self.eps_sq && self.closest.as_ref().map(|(t, ..)| d < *t).unwrap_or(true) {
            self.closest = Some((d, self.current, Contact { point, patch }));
        }
    }

    #[inline]
    fn scanning(&mut self, index: usize) {
        self.current = index;
    }
}

/// A surface of an optical scene.
///
/// Implementors decide where a ray meets them, and what becomes of the ray once it does.
pub trait Optic {
    /// Adds the points where [`ctx.probe()`](CollisionCtx::probe) meets this surface,
    /// in no particular order, with [`ctx.add_contact(...)`](CollisionCtx::add_contact).
    ///
    /// Points must lie ahead of the probe's origin and inside the surface's bounds.
    ///
    /// Adds nothing if the probe misses.
    fn add_contacts(&self, ctx: &mut CollisionCtx);

    /// The rays leaving `contact`, after `ray` hit it.
    ///
    /// `ray.end` is already set to `contact.point`. Returns an error
    /// when the outgoing rays can't be computed.
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission>;
}

// It's clear that all these impls use the `Deref` trait, but writing a blanket impl over all types implementing `Deref`
// makes it impossible to implement it for new types downstream.

impl<T: Optic + ?Sized> Optic for &T {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        (*self).add_contacts(ctx)
    }

    #[inline]
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        (*self).return_ray(ray, contact)
    }
}

impl<T: Optic + ?Sized> Optic for Box<T> {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        self.deref().add_contacts(ctx)
    }

    #[inline]
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        self.deref().return_ray(ray, contact)
    }
}

impl<T: Optic + ?Sized> Optic for Rc<T> {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        self.deref().add_contacts(ctx)
    }

    #[inline]
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        self.deref().return_ray(ray, contact)
    }
}

impl<T: Optic + ?Sized> Optic for Arc<T> {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        self.deref().add_contacts(ctx)
    }

    #[inline]
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        self.deref().return_ray(ray, contact)
    }
}

/// The closest contact between a ray and a scene.
#[derive(Debug)]
pub struct Hit<'a, O> {
    /// The surface that was hit.
    pub optic: &'a O,
    /// Its position in the scene.
    pub index: usize,
    pub contact: Contact,
    /// Squared distance between the ray's origin and the contact point.
    pub dist_sq: Float,
}

/// Finds the closest point, strictly further than `sqrt(eps_sq)` from `probe`'s
/// origin, where `probe` meets a surface of `scene`.
///
/// Surfaces are scanned in order, so, on a tie, the one appearing first in `scene` wins.
#[must_use]
pub fn resolve<'a, O: Optic>(scene: &'a [O], probe: HalfLine, eps_sq: Float) -> Option<Hit<'a, O>> {
    let mut ctx = CollisionCtx::new(probe, eps_sq);

    for (i, optic) in scene.iter().enumerate() {
        ctx.scanning(i);
        optic.add_contacts(&mut ctx);
    }

    ctx.closest.map(|(dist_sq, index, contact)| Hit {
        optic: &scene[index],
        index,
        contact,
        dist_sq,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use approx::assert_abs_diff_eq;
    use nalgebra::Unit;

    /// A bare segment, absorbing everything.
    struct Wall(Segment);

    impl Optic for Wall {
        fn add_contacts(&self, ctx: &mut CollisionCtx) {
            if let Some(pt) = self.0.intersect(ctx.probe()) {
                ctx.add_contact(pt, Patch::Whole);
            }
        }

        fn return_ray(&self, _: &Ray, _: &Contact) -> Result<Emission> {
            Ok(Emission::new())
        }
    }

    fn wall(x: Float) -> Wall {
        Wall(Segment::between([x, -1.].into(), [x, 1.].into()))
    }

    fn probe_x(origin_x: Float) -> HalfLine {
        HalfLine::new([origin_x, 0.].into(), Unit::new_normalize([1., 0.].into()))
    }

    #[test]
    fn closest_wall_wins_regardless_of_order() {
        let scene = [wall(5.), wall(2.), wall(9.)];
        let hit = resolve(&scene, probe_x(0.), 1e-6).unwrap();
        assert_eq!(hit.index, 1);
        assert_abs_diff_eq!(hit.contact.point, Vector::new(2., 0.));
        assert_abs_diff_eq!(hit.dist_sq, 4.);
    }

    #[test]
    fn ties_go_to_the_first_surface() {
        let scene = [wall(3.), wall(3.)];
        assert_eq!(resolve(&scene, probe_x(0.), 1e-6).unwrap().index, 0);
    }

    #[test]
    fn contacts_at_the_origin_are_ignored() {
        let scene = [wall(0.), wall(4.)];
        let hit = resolve(&scene, probe_x(-1e-4), 1e-6).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn empty_and_missed_scenes() {
        assert!(resolve::<Wall>(&[], probe_x(0.), 1e-6).is_none());
        assert!(resolve(&[wall(-3.)], probe_x(0.), 1e-6).is_none());
    }

    #[test]
    fn boxed_trait_objects_resolve() {
        let scene: Vec<Box<dyn Optic>> = vec![Box::new(wall(7.)), Box::new(wall(6.))];
        assert_eq!(resolve(&scene, probe_x(0.), 1e-6).unwrap().index, 1);
    }
}
