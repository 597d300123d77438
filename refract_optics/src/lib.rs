//! The surfaces optical scenes are made of.

mod arc;
mod block;
mod filter;
mod lens;
mod line;
pub mod refraction;

pub use arc::*;
pub use block::{CircularBlock, PolygonalBlock, DEFAULT_INDEX};
pub use filter::*;
pub use lens::*;
pub use line::*;

use block::{check_index, circle_tangent, midpoint};
use line::add_segment_contact;
use nalgebra::Unit;
use refract::{
    geometry::{try_unit, ArcSpan, Circle, Planar, Polygon, Segment, Vector},
    CollisionCtx, Color, Contact, Editable, Emission, Error, Float, Morph, Optic, Patch, Ray,
    Result,
};

/// Every kind of surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    Mirror(Mirror),
    Void(Void),
    Filter(Filter),
    Lens(Lens),
    Circular(CircularBlock),
    Polygonal(PolygonalBlock),
    Arc(Arc),
}

macro_rules! for_each_surface {
    ($surface:expr, $s:ident => $body:expr) => {
        match $surface {
            Surface::Mirror($s) => $body,
            Surface::Void($s) => $body,
            Surface::Filter($s) => $body,
            Surface::Lens($s) => $body,
            Surface::Circular($s) => $body,
            Surface::Polygonal($s) => $body,
            Surface::Arc($s) => $body,
        }
    };
}

impl Surface {
    /// A short name for this kind of surface.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mirror(_) => "mirror",
            Self::Void(_) => "void",
            Self::Filter(_) => "filter",
            Self::Lens(_) => "lens",
            Self::Circular(_) => "circular_block",
            Self::Polygonal(_) => "polygonal_block",
            Self::Arc(_) => "arc",
        }
    }
}

impl Optic for Surface {
    #[inline]
    fn add_contacts(&self, ctx: &mut CollisionCtx) {
        for_each_surface!(self, s => s.add_contacts(ctx))
    }

    #[inline]
    fn return_ray(&self, ray: &Ray, contact: &Contact) -> Result<Emission> {
        for_each_surface!(self, s => s.return_ray(ray, contact))
    }
}

impl Editable for Surface {
    #[inline]
    fn anchor(&self) -> Vector {
        for_each_surface!(self, s => s.anchor())
    }

    #[inline]
    fn translate(&mut self, by: Vector) {
        for_each_surface!(self, s => Editable::translate(s, by))
    }

    #[inline]
    fn morph(&mut self, morph: &Morph) {
        for_each_surface!(self, s => s.morph(morph))
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {$(
        impl From<$ty> for Surface {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }
    )*};
}

impl_from!(
    Mirror(Mirror),
    Void(Void),
    Filter(Filter),
    Lens(Lens),
    Circular(CircularBlock),
    Polygonal(PolygonalBlock),
    Arc(Arc),
);
