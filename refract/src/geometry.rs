//! Planar primitives and the intersection predicates the collision resolver is built on.

use arrayvec::ArrayVec;
use core::f64::consts::TAU;
use nalgebra::{Unit, Vector2};

use crate::{Error, Float, Result};

pub type Vector = Vector2<Float>;

/// Squared distance between the foot of the perpendicular and the center of a circle
/// below which a ray is considered to pass through the center.
const CENTER_HIT_EPS_SQ: Float = 1e-5;

/// Normalizes `angle` into `[0, 2π)`.
#[inline]
#[must_use]
pub fn fix_angle(angle: Float) -> Float {
    let a = angle.rem_euclid(TAU);
    // `rem_euclid` may round up to exactly `TAU` for tiny negative inputs
    if a >= TAU {
        0.
    } else {
        a
    }
}

/// Angle-related helpers `nalgebra` doesn't provide for 2D vectors.
pub trait Planar {
    /// The unit vector pointing at `angle` radians from the `+x` axis.
    fn from_angle(angle: Float) -> Self;

    /// The angle of this vector, measured from the `+x` axis, in `(-π, π]`.
    fn heading(&self) -> Float;

    /// This vector, rotated counterclockwise by `angle` radians.
    fn rotated(&self, angle: Float) -> Self;

    /// This vector, rotated counterclockwise by a quarter turn.
    fn orth(&self) -> Self;
}

impl Planar for Vector {
    #[inline]
    fn from_angle(angle: Float) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    #[inline]
    fn heading(&self) -> Float {
        self.y.atan2(self.x)
    }

    #[inline]
    fn rotated(&self, angle: Float) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn orth(&self) -> Self {
        Self::new(-self.y, self.x)
    }
}

/// Normalizes `v`, failing if it has no usable length.
#[inline]
pub fn try_unit(v: Vector) -> Result<Unit<Vector>> {
    Unit::try_new(v, Float::EPSILON).ok_or(Error::ZeroDirection)
}

/// The geometric part of a ray: a starting point and a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfLine {
    pub origin: Vector,
    pub dir: Unit<Vector>,
}

impl HalfLine {
    #[inline]
    #[must_use]
    pub fn new(origin: Vector, dir: Unit<Vector>) -> Self {
        Self { origin, dir }
    }

    /// Get the point at distance `t` (can be negative) from the origin
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vector {
        self.origin + self.dir.as_ref() * t
    }

    /// Whether `pt` lies on the forward side of the origin, `pt == origin` included.
    #[inline]
    #[must_use]
    pub fn is_ahead(&self, pt: &Vector) -> bool {
        (pt - self.origin).dot(self.dir.as_ref()) >= 0.
    }
}

/// A line segment, stored as a starting point and a displacement to its other end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vector,
    pub displacement: Vector,
}

impl Segment {
    #[inline]
    #[must_use]
    pub fn new(start: Vector, displacement: Vector) -> Self {
        Self {
            start,
            displacement,
        }
    }

    #[inline]
    #[must_use]
    pub fn between(start: Vector, end: Vector) -> Self {
        Self::new(start, end - start)
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> Vector {
        self.start + self.displacement
    }

    #[inline]
    #[must_use]
    pub fn midpoint(&self) -> Vector {
        self.start + self.displacement * 0.5
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> Float {
        self.displacement.norm()
    }

    /// The unit direction from `start` to `end`.
    ///
    /// Fails for zero-length segments.
    #[inline]
    pub fn dir(&self) -> Result<Unit<Vector>> {
        try_unit(self.displacement)
    }

    /// Moves the far end to `end`, keeping `start`.
    #[inline]
    pub fn set_end(&mut self, end: Vector) {
        self.displacement = end - self.start;
    }

    /// Moves the near end, keeping the far end in place.
    #[inline]
    pub fn set_start(&mut self, start: Vector) {
        let end = self.end();
        self.start = start;
        self.displacement = end - start;
    }

    /// Points the segment at `target`, keeping its length.
    ///
    /// Does nothing if `target == self.start`.
    #[inline]
    pub fn aim(&mut self, target: Vector) {
        if let Ok(dir) = try_unit(target - self.start) {
            self.displacement = dir.into_inner() * self.length();
        }
    }

    #[inline]
    pub fn translate(&mut self, by: Vector) {
        self.start += by;
    }

    /// The point where `probe` crosses this segment, if any.
    ///
    /// Both endpoints are excluded, as is the probe's own origin. Parallel
    /// lines (an exactly zero determinant) never intersect.
    #[must_use]
    pub fn intersect(&self, probe: &HalfLine) -> Option<Vector> {
        let [x1, y1]: [Float; 2] = self.start.into();
        let [x2, y2]: [Float; 2] = self.end().into();
        let [x3, y3]: [Float; 2] = probe.origin.into();
        let [x4, y4]: [Float; 2] = (probe.origin + probe.dir.as_ref()).into();

        let den = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if den == 0. {
            return None;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / den;
        let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / den;

        (t > 0. && t < 1. && u > 0.).then(|| self.start + self.displacement * t)
    }
}

/// All points at distance `radius` from `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vector,
    pub radius: Float,
}

impl Circle {
    #[inline]
    #[must_use]
    pub fn new(center: Vector, radius: Float) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Whether `pt` lies inside the disc bounded by this circle (boundary included).
    #[inline]
    #[must_use]
    pub fn contains(&self, pt: &Vector) -> bool {
        (pt - self.center).norm_squared() <= self.radius * self.radius
    }

    /// The points of this circle lying ahead of `probe`, on its supporting line.
    ///
    /// A circle shrunk to a point (or with a non-finite radius) is never hit.
    #[must_use]
    pub fn intersect(&self, probe: &HalfLine) -> ArrayVec<Vector, 2> {
        let mut hits = ArrayVec::new();

        if !(self.radius.is_finite() && self.radius > 0.) {
            return hits;
        }

        // foot of the perpendicular from the center to the probe's line
        let foot = probe.at((self.center - probe.origin).dot(probe.dir.as_ref()));
        let to_foot = foot - self.center;
        let d_sq = to_foot.norm_squared();
        let r = self.radius;

        if d_sq > r * r {
            return hits;
        }

        let candidates = if d_sq <= CENTER_HIT_EPS_SQ {
            let v = probe.dir.as_ref() * r;
            [self.center + v, self.center - v]
        } else {
            let a = (d_sq.sqrt() / r).min(1.).acos();
            let base = to_foot.normalize() * r;
            [
                self.center + base.rotated(a),
                self.center + base.rotated(-a),
            ]
        };

        hits.extend(candidates.into_iter().filter(|pt| probe.is_ahead(pt)));
        hits
    }
}

/// An angular range `[start, start + span]`, used to cut arcs out of circles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSpan {
    start: Float,
    span: Float,
}

impl ArcSpan {
    #[inline]
    #[must_use]
    pub fn new(start: Float, span: Float) -> Self {
        Self {
            start: fix_angle(start),
            span: fix_angle(span),
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> Float {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn span(&self) -> Float {
        self.span
    }

    #[inline]
    pub fn set_start(&mut self, start: Float) {
        self.start = fix_angle(start);
    }

    #[inline]
    pub fn set_span(&mut self, span: Float) {
        self.span = fix_angle(span);
    }

    #[must_use]
    pub fn contains_angle(&self, angle: Float) -> bool {
        let a = fix_angle(angle);
        let end = self.start + self.span;

        if end > TAU {
            a >= self.start || a <= end - TAU
        } else {
            a >= self.start && a <= end
        }
    }
}

/// Even-odd point-in-polygon test, casting a ray along `+x` from `pt`.
///
/// [`Segment::intersect`] excludes endpoints, so a cast passing exactly through a vertex
/// counts neither of its edges, and `pt` may be misreported.
#[must_use]
pub fn polygon_contains<'a>(edges: impl IntoIterator<Item = &'a Segment>, pt: &Vector) -> bool {
    let probe = HalfLine::new(*pt, Vector::x_axis());
    edges
        .into_iter()
        .filter(|edge| edge.intersect(&probe).is_some())
        .count()
        % 2
        == 1
}

/// A closed polygon, whose edges always join consecutive vertices (the last one joining back
/// to the first).
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector>,
    edges: Vec<Segment>,
}

impl Polygon {
    /// Returns an error if there are less than 3 vertices, or any of them isn't finite.
    pub fn try_new(vertices: Vec<Vector>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::InvalidShape(format!(
                "a polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        if !vertices.iter().all(|v| v.iter().all(|c| c.is_finite())) {
            return Err(Error::NonFinite("polygon vertices"));
        }

        let mut polygon = Self {
            vertices,
            edges: Vec::new(),
        };
        polygon.regenerate_edges();
        Ok(polygon)
    }

    fn edge_at(&self, i: usize) -> Segment {
        let n = self.vertices.len();
        Segment::between(self.vertices[i], self.vertices[(i + 1) % n])
    }

    fn regenerate_edges(&mut self) {
        self.edges = (0..self.vertices.len()).map(|i| self.edge_at(i)).collect();
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vector] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Moves vertex `i` to `pt`, rebuilding both edges touching it.
    ///
    /// Out of range indices are ignored.
    pub fn set_vertex(&mut self, i: usize, pt: Vector) {
        let n = self.vertices.len();
        if i >= n {
            return;
        }
        self.vertices[i] = pt;
        let prev = (i + n - 1) % n;
        self.edges[prev] = self.edge_at(prev);
        self.edges[i] = self.edge_at(i);
    }

    pub fn translate(&mut self, by: Vector) {
        self.vertices.iter_mut().for_each(|v| *v += by);
        self.edges.iter_mut().for_each(|e| e.translate(by));
    }

    /// The average of all vertices.
    #[must_use]
    pub fn centroid(&self) -> Vector {
        self.vertices.iter().sum::<Vector>() / self.vertices.len() as Float
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, pt: &Vector) -> bool {
        polygon_contains(&self.edges, pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::{FRAC_PI_2, PI};

    fn probe(origin: [Float; 2], dir: [Float; 2]) -> HalfLine {
        HalfLine::new(origin.into(), Unit::new_normalize(dir.into()))
    }

    #[test]
    fn fix_angle_wraps_into_one_turn() {
        assert_abs_diff_eq!(fix_angle(-FRAC_PI_2), 3. * FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(fix_angle(5. * PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(fix_angle(-7. * TAU + 1.), 1., epsilon = 1e-9);
        assert!(fix_angle(TAU) < TAU);
    }

    #[test]
    fn planar_helpers() {
        let v = Vector::new(1., 0.);
        assert_abs_diff_eq!(v.rotated(FRAC_PI_2), Vector::new(0., 1.), epsilon = 1e-12);
        assert_abs_diff_eq!(v.orth(), Vector::new(0., 1.));
        assert_abs_diff_eq!(Vector::new(0., -2.).heading(), -FRAC_PI_2);
        assert_abs_diff_eq!(Vector::from_angle(PI), Vector::new(-1., 0.), epsilon = 1e-12);
    }

    #[test]
    fn segment_hit_in_the_middle() {
        let seg = Segment::between([10., -10.].into(), [10., 10.].into());
        let hit = seg.intersect(&probe([0., 0.], [1., 0.])).unwrap();
        assert_abs_diff_eq!(hit, Vector::new(10., 0.), epsilon = 1e-12);
    }

    #[test]
    fn segment_rejects_behind_parallel_and_endpoints() {
        let seg = Segment::between([10., -10.].into(), [10., 10.].into());
        assert!(seg.intersect(&probe([0., 0.], [-1., 0.])).is_none());
        assert!(seg.intersect(&probe([0., 0.], [0., 1.])).is_none());
        // exactly through an endpoint
        assert!(seg.intersect(&probe([0., 10.], [1., 0.])).is_none());
        // beyond the far end
        assert!(seg.intersect(&probe([0., 20.], [1., 0.])).is_none());
    }

    #[test]
    fn circle_through_center() {
        let c = Circle::new([5., 0.].into(), 2.);
        let hits = c.intersect(&probe([0., 0.], [1., 0.]));
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0], Vector::new(7., 0.), epsilon = 1e-12);
        assert_abs_diff_eq!(hits[1], Vector::new(3., 0.), epsilon = 1e-12);
    }

    #[test]
    fn circle_off_center_and_miss() {
        let c = Circle::new([5., 0.].into(), 2.);
        let mut hits = c.intersect(&probe([0., 1.], [1., 0.])).to_vec();
        hits.sort_by(|a, b| a.x.total_cmp(&b.x));
        let dx = 3f64.sqrt();
        assert_abs_diff_eq!(hits[0], Vector::new(5. - dx, 1.), epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1], Vector::new(5. + dx, 1.), epsilon = 1e-9);

        assert!(c.intersect(&probe([0., 3.], [1., 0.])).is_empty());
        assert!(c.intersect(&probe([0., 0.], [-1., 0.])).is_empty());
    }

    #[test]
    fn circle_from_inside_only_hits_ahead() {
        let c = Circle::new([0., 0.].into(), 1.);
        let hits = c.intersect(&probe([0., 0.5], [1., 0.]));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].x > 0.);
    }

    #[test]
    fn point_circles_are_never_hit() {
        let dot = Circle::new([5., 0.].into(), 0.);
        assert!(dot.intersect(&probe([0., 0.], [1., 0.])).is_empty());

        let mut c = Circle::new([5., 0.].into(), 2.);
        c.radius = Float::NAN;
        assert!(c.intersect(&probe([0., 0.], [1., 0.])).is_empty());
    }

    #[test]
    fn arc_span_wraps_past_a_full_turn() {
        let span = ArcSpan::new(3. * FRAC_PI_2, PI);
        assert!(span.contains_angle(0.));
        assert!(span.contains_angle(-0.1));
        assert!(span.contains_angle(FRAC_PI_2 - 0.01));
        assert!(!span.contains_angle(PI));

        let plain = ArcSpan::new(0., FRAC_PI_2);
        assert!(plain.contains_angle(0.5));
        assert!(!plain.contains_angle(-0.5));
    }

    #[test]
    fn concave_polygon_containment() {
        // an "L" shape
        let l = Polygon::try_new(vec![
            [0., 0.].into(),
            [4., 0.].into(),
            [4., 1.].into(),
            [1., 1.].into(),
            [1., 4.].into(),
            [0., 4.].into(),
        ])
        .unwrap();

        assert!(l.contains(&[0.5, 3.5].into()));
        assert!(l.contains(&[3.5, 0.5].into()));
        assert!(!l.contains(&[3., 3.].into()));
        assert!(!l.contains(&[-1., 0.5].into()));
    }

    #[test]
    fn casts_through_a_vertex_cross_nothing() {
        let tri =
            Polygon::try_new(vec![[0., 0.].into(), [4., 2.].into(), [0., 4.].into()]).unwrap();

        // the cast from (1, 2) grazes the vertex at (4, 2), and no edge counts it
        assert!(!tri.contains(&[1., 2.].into()));
        assert!(tri.contains(&[1., 2.5].into()));
        assert!(tri.contains(&[1., 1.5].into()));
    }

    #[test]
    fn polygon_edges_follow_vertices() {
        let mut tri =
            Polygon::try_new(vec![[0., 0.].into(), [2., 0.].into(), [0., 2.].into()]).unwrap();
        tri.set_vertex(1, [4., 0.].into());
        assert_eq!(tri.edges()[0].end(), Vector::new(4., 0.));
        assert_eq!(tri.edges()[1].start, Vector::new(4., 0.));

        tri.translate([1., 1.].into());
        for (i, edge) in tri.edges().iter().enumerate() {
            assert_eq!(edge.start, tri.vertices()[i]);
            assert_eq!(edge.end(), tri.vertices()[(i + 1) % 3]);
        }
        assert_abs_diff_eq!(tri.centroid(), Vector::new(7. / 3., 5. / 3.), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_polygons_are_rejected() {
        assert!(Polygon::try_new(vec![[0., 0.].into(), [1., 0.].into()]).is_err());
        assert!(
            Polygon::try_new(vec![[0., 0.].into(), [1., Float::NAN].into(), [0., 1.].into()])
                .is_err()
        );
    }
}
