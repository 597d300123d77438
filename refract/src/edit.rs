//! Hooks an editor uses to reshape scene objects between trace passes.

use crate::geometry::{Circle, Polygon, Segment, Vector};

/// A drag on one of an object's handles, with the point it was dragged to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Morph {
    /// The body: moves the object so that its anchor lands on the point.
    MoveTo(Vector),
    /// The rotation knob: turns the object to face the point.
    Rotate(Vector),
    /// The far end (or corner): stretches the object up to the point.
    Resize(Vector),
    /// The near end: moves it, leaving the far end in place.
    ResizeStart(Vector),
    /// A polygon's `i`th vertex.
    Vertex(usize, Vector),
}

/// Something an editor can drag around.
///
/// None of these methods retrace anything: the caller has to run a new pass afterwards.
pub trait Editable {
    /// The point [`Morph::MoveTo`] moves.
    fn anchor(&self) -> Vector;

    fn translate(&mut self, by: Vector);

    /// Applies a drag. Handles this object doesn't have are ignored.
    fn morph(&mut self, morph: &Morph);

    /// A copy of this object, moved by `offset`.
    #[must_use]
    fn duplicate(&self, offset: Vector) -> Self
    where
        Self: Sized + Clone,
    {
        let mut copy = self.clone();
        copy.translate(offset);
        copy
    }

    /// Applies [`Morph::MoveTo`] through `translate`.
    #[inline]
    fn move_to(&mut self, pt: Vector) {
        let by = pt - self.anchor();
        self.translate(by);
    }
}

impl<T: Editable + ?Sized> Editable for Box<T> {
    #[inline]
    fn anchor(&self) -> Vector {
        self.as_ref().anchor()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.as_mut().translate(by)
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        self.as_mut().morph(morph)
    }
}

impl Editable for Segment {
    #[inline]
    fn anchor(&self) -> Vector {
        self.start
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        Segment::translate(self, by)
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Rotate(pt) => self.aim(pt),
            Morph::Resize(pt) | Morph::Vertex(1, pt) => self.set_end(pt),
            Morph::ResizeStart(pt) | Morph::Vertex(0, pt) => self.set_start(pt),
            Morph::Vertex(..) => {}
        }
    }
}

impl Editable for Circle {
    #[inline]
    fn anchor(&self) -> Vector {
        self.center
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        self.center += by;
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Resize(pt) => self.radius = (pt - self.center).norm(),
            _ => {}
        }
    }
}

impl Editable for Polygon {
    #[inline]
    fn anchor(&self) -> Vector {
        self.centroid()
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        Polygon::translate(self, by)
    }

    fn morph(&mut self, morph: &Morph) {
        match *morph {
            Morph::MoveTo(pt) => self.move_to(pt),
            Morph::Vertex(i, pt) => self.set_vertex(i, pt),
            _ => {}
        }
    }
}
