//! Snell's law and the Fresnel split shared by all refractive boundaries.

use log::trace;
use nalgebra::Unit;

use refract::{
    geometry::{try_unit, Planar, Vector},
    Emission, Error, Float, Ray, Result,
};

/// Schlick's approximation of the fraction of light reflected at a boundary
/// between vacuum and a medium of index `n`, for an angle of incidence whose cosine is `cos_i`.
#[inline]
#[must_use]
pub fn schlick(n: Float, cos_i: Float) -> Float {
    let r0 = ((1. - n) / (1. + n)).powi(2);
    r0 + (1. - r0) * (1. - cos_i).powi(5)
}

/// The rays leaving a refractive boundary of index `index`, tangent to `tangent` at `at`,
/// hit by `ray`, when `ray` is either leaving the medium or entering it.
///
/// Past the critical angle, there is only a reflected ray, with all of `ray`'s intensity.
/// Otherwise, the refracted ray comes first, then the reflected one, the intensity of
/// `ray` being split between them. Rays left with no intensity are omitted.
pub fn refract(
    ray: &Ray,
    at: Vector,
    tangent: &Unit<Vector>,
    index: Float,
    leaving: bool,
) -> Result<Emission> {
    let d = ray.dir.as_ref();

    // normal pointing back towards the incoming ray
    let mut normal = tangent.orth();
    if d.dot(&normal) > 0. {
        normal = -normal;
    }

    let cos_i = (-d.dot(&normal)).min(1.);
    let eta = if leaving { index } else { index.recip() };
    let sin_t_sq = eta * eta * (1. - cos_i * cos_i);

    let mut emission = Emission::new();

    if sin_t_sq > 1. {
        trace!("total internal reflection at {:?}", at.as_slice());
        emission.push(ray.reflected(at, tangent));
        return Ok(emission);
    }

    let cos_t = (1. - sin_t_sq).sqrt();
    let dir = try_unit(d * eta + normal * (eta * cos_i - cos_t))
        .map_err(|_| Error::NonFinite("a refracted direction"))?;

    let reflectance = Error::check_finite(schlick(index, cos_i), "a fresnel reflectance")?;
    let intensity = ray.intensity();

    let refracted = (1. - reflectance) * intensity;
    if refracted > 0. {
        emission.push(ray.spawn(at, dir, ray.color.with_intensity(refracted)));
    }

    let reflected = reflectance * intensity;
    if reflected > 0. {
        let mut ray = ray.reflected(at, tangent);
        ray.color = ray.color.with_intensity(reflected);
        emission.push(ray);
    }

    Ok(emission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use refract::Color;

    fn ray_at(angle: Float) -> Ray {
        Ray::new([0., 0.], Vector::from_angle(angle), Color::WHITE).unwrap()
    }

    #[test]
    fn normal_incidence_reflects_r0() {
        assert_relative_eq!(schlick(1.5, 1.), 0.04, epsilon = 1e-12);
        assert_relative_eq!(schlick(1.5, 0.), 1., epsilon = 1e-12);
    }

    #[test]
    fn snell_law_holds_when_entering() {
        // the boundary is the x axis, the ray comes from above
        let tangent = Vector::x_axis();
        let incidence: Float = 0.5;
        let ray = ray_at(-core::f64::consts::FRAC_PI_2 + incidence);

        let emission = refract(&ray, Vector::zeros(), &tangent, 1.5, false).unwrap();
        assert_eq!(emission.len(), 2);

        let refracted = &emission[0];
        let sin_t = refracted.dir.x;
        assert_relative_eq!(sin_t * 1.5, incidence.sin(), epsilon = 1e-12);
        assert!(refracted.dir.y < 0.);

        let reflected = &emission[1];
        assert_abs_diff_eq!(reflected.dir.x, ray.dir.x, epsilon = 1e-12);
        assert_abs_diff_eq!(reflected.dir.y, -ray.dir.y, epsilon = 1e-12);

        assert_relative_eq!(
            refracted.intensity() + reflected.intensity(),
            1.,
            epsilon = 1e-12
        );
    }

    #[test]
    fn past_the_critical_angle_everything_is_reflected() {
        let tangent = Vector::x_axis();
        // asin(1 / 1.5) is about 0.73
        let ray = ray_at(-core::f64::consts::FRAC_PI_2 + 0.9);

        let emission = refract(&ray, Vector::zeros(), &tangent, 1.5, true).unwrap();
        assert_eq!(emission.len(), 1);
        assert_eq!(emission[0].intensity(), 1.);
        assert!(emission[0].dir.y > 0.);
    }
}
