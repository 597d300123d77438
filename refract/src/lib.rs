//! A 2D ray tracing kernel for optics simulations.
//!
//! Light sources emit rays, which are propagated through a scene of surfaces
//! (anything implementing [`Optic`]), bouncing and splitting at each hit,
//! into trees of rays.

pub use nalgebra;

pub mod collision;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod ray;
pub mod scene;
pub mod source;
pub mod trace;

pub type Float = f64;

pub use collision::{resolve, CollisionCtx, Contact, Emission, Hit, Optic, Patch};
pub use edit::{Editable, Morph};
pub use error::{Error, Result};
pub use geometry::Vector;
pub use ray::{Color, Ray};
pub use scene::Scene;
pub use source::{Beam, Emitter, LightSource, PointLight, RaySource, MAX_RAYS};
pub use trace::{trace_pass, TraceConfig, TracePass, TraceStats, Tracer};
