use core::{f64::consts::TAU, iter};

use nalgebra::Unit;
use refract::{
    geometry::{ArcSpan, Circle, Planar, Segment, Vector},
    Beam, Color, Float, LightSource, PointLight, Ray, RaySource, Scene,
};
use refract_optics::*;

pub use rand;

/// Coordinates of random objects stay within `[-SCENE_HALF_WIDTH, SCENE_HALF_WIDTH]`.
pub const SCENE_HALF_WIDTH: Float = 500.;

pub trait Random: Sized {
    /// Generate a randomized version of this object using the provided `rng`
    ///
    /// This method must not fail. If creating an object is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

pub fn rand_vect(rng: &mut (impl rand::Rng + ?Sized), max_coord_mag: Float) -> Vector {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly
    Vector::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}

pub fn rand_unit(rng: &mut (impl rand::Rng + ?Sized)) -> Unit<Vector> {
    Unit::new_normalize(Vector::from_angle(rng.gen_range(0.0..TAU)))
}

fn rand_point(rng: &mut (impl rand::Rng + ?Sized)) -> Vector {
    rand_vect(rng, SCENE_HALF_WIDTH)
}

/// A segment between 10 and 200 units long.
fn rand_segment(rng: &mut (impl rand::Rng + ?Sized)) -> Segment {
    let length = rng.gen_range(10.0..200.0);
    Segment::new(rand_point(rng), rand_unit(rng).into_inner() * length)
}

fn rand_index(rng: &mut (impl rand::Rng + ?Sized)) -> Float {
    rng.gen_range(1.05..2.5)
}

impl Random for Color {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(rng.gen(), rng.gen_range(0.1..=1.0))
    }
}

impl Random for Ray {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new_unit_dir(rand_point(rng), rand_unit(rng), Color::random(rng))
    }
}

impl Random for Mirror {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self(rand_segment(rng))
    }
}

impl Random for Void {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self(rand_segment(rng))
    }
}

impl Random for Filter {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(rand_segment(rng), rng.gen(), rng.gen())
    }
}

impl Random for Lens {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let segment = rand_segment(rng);
        loop {
            let f = rng.gen_range(-400.0..400.0);
            if let Ok(lens) = Self::try_new(segment, f) {
                break lens;
            }
        }
    }
}

impl Random for CircularBlock {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let circle = Circle::new(rand_point(rng), rng.gen_range(10.0..120.0));
        loop {
            if let Ok(block) = Self::try_new(circle, rand_index(rng)) {
                break block;
            }
        }
    }
}

impl Random for PolygonalBlock {
    /// A star-shaped polygon: vertices at increasing angles around a center, at random distances.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let center = rand_point(rng);
            let n = rng.gen_range(3..9);

            let mut angles: Vec<Float> = iter::repeat_with(|| rng.gen_range(0.0..TAU))
                .take(n)
                .collect();
            angles.sort_by(Float::total_cmp);

            let vertices = angles
                .into_iter()
                .map(|a| center + Vector::from_angle(a) * rng.gen_range(10.0..150.0))
                .collect();

            if let Ok(block) = Self::try_new(vertices, rand_index(rng)) {
                break block;
            }
        }
    }
}

impl Random for Arc {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let circle = Circle::new(rand_point(rng), rng.gen_range(10.0..150.0));
        let span = ArcSpan::new(rng.gen_range(0.0..TAU), rng.gen_range(0.1..TAU));

        if rng.gen_bool(0.5) {
            return Self::mirror(circle, span);
        }

        loop {
            if let Ok(arc) = Self::try_new(circle, span, ArcFinish::Refractive(rand_index(rng))) {
                break arc;
            }
        }
    }
}

impl Random for Surface {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        match rng.gen_range(0..7) {
            0 => Mirror::random(rng).into(),
            1 => Void::random(rng).into(),
            2 => Filter::random(rng).into(),
            3 => Lens::random(rng).into(),
            4 => CircularBlock::random(rng).into(),
            5 => PolygonalBlock::random(rng).into(),
            _ => Arc::random(rng).into(),
        }
    }
}

impl Random for RaySource {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let ray = Ray::random(rng);
            if let Ok(source) = Self::new(ray.origin, ray.dir.into_inner(), ray.color) {
                break source;
            }
        }
    }
}

impl Random for PointLight {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(rand_point(rng), rng.gen_range(1..48), Color::random(rng))
    }
}

impl Random for Beam {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let beam = Self::try_new(
                rand_point(rng),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..200.0),
                rng.gen_range(5.0..40.0),
                Color::random(rng),
            );

            if let Ok(beam) = beam {
                break beam;
            }
        }
    }
}

impl Random for LightSource {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        match rng.gen_range(0..3) {
            0 => RaySource::random(rng).into(),
            1 => PointLight::random(rng).into(),
            _ => Beam::random(rng).into(),
        }
    }
}

/// A scene of `num_surfaces` random surfaces lit by `num_sources` random light sources.
pub fn random_scene(
    rng: &mut (impl rand::Rng + ?Sized),
    num_surfaces: usize,
    num_sources: usize,
) -> Scene<Surface, LightSource> {
    let surfaces = iter::repeat_with(|| Surface::random(rng))
        .take(num_surfaces)
        .collect();

    let sources = iter::repeat_with(|| LightSource::random(rng))
        .take(num_sources)
        .collect();

    Scene::new(surfaces, sources)
}
