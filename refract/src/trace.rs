//! The propagation engine: expands rays into trees by bouncing them around a scene.

use log::{debug, trace, warn};

use crate::{
    collision::{resolve, Emission},
    source::Emitter,
    Error, Float, Optic, Ray, Result,
};

/// Knobs of a trace pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceConfig {
    /// Half the width of the visible scene. Rays escaping the scene are
    /// drawn `2 * half_width` units long.
    pub half_width: Float,
    /// Contacts closer than `sqrt(self_hit_eps_sq)` to a ray's origin are ignored.
    pub self_hit_eps_sq: Float,
    /// Rays dimmer than this are dropped.
    pub min_intensity: Float,
    /// Maximum number of bounces followed from a root ray, `None` for no limit.
    pub max_depth: Option<usize>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            half_width: 1000.,
            self_hit_eps_sq: 1e-6,
            min_intensity: 1. / 255.,
            max_depth: Some(50),
        }
    }
}

impl TraceConfig {
    #[inline]
    #[must_use]
    pub fn with_half_width(self, half_width: Float) -> Self {
        Self { half_width, ..self }
    }

    #[inline]
    #[must_use]
    pub fn with_self_hit_eps_sq(self, self_hit_eps_sq: Float) -> Self {
        Self {
            self_hit_eps_sq,
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn with_min_intensity(self, min_intensity: Float) -> Self {
        Self {
            min_intensity,
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn with_max_depth(self, max_depth: Option<usize>) -> Self {
        Self { max_depth, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.half_width.is_finite() && self.half_width > 0.) {
            return Err(Error::InvalidConfig(format!(
                "half_width must be positive and finite, got {}",
                self.half_width
            )));
        }

        if !(self.self_hit_eps_sq.is_finite() && self.self_hit_eps_sq >= 0.) {
            return Err(Error::InvalidConfig(format!(
                "self_hit_eps_sq must be non-negative and finite, got {}",
                self.self_hit_eps_sq
            )));
        }

        if !(0. ..=1.).contains(&self.min_intensity) {
            return Err(Error::InvalidConfig(format!(
                "min_intensity must be in [0, 1], got {}",
                self.min_intensity
            )));
        }

        Ok(())
    }
}

/// Counters filled during a trace pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Rays propagated.
    pub nodes: usize,
    /// Rays that hit a surface.
    pub hits: usize,
    /// Rays that left the scene.
    pub escaped: usize,
    /// Rays that hit a surface sending nothing back.
    pub absorbed: usize,
    /// Outgoing rays dropped for being too dim.
    pub pruned: usize,
    /// Outgoing rays left unresolved for being too deep.
    pub truncated: usize,
    /// Numerical faults, at most one per pass.
    pub faults: usize,
}

/// State of one trace pass: the scene snapshot, the configuration, and the
/// warning flag that stops everything once a numerical fault happened.
#[derive(Debug)]
pub struct Tracer<'a, O> {
    scene: &'a [O],
    config: &'a TraceConfig,
    warning: bool,
    stats: TraceStats,
}

impl<'a, O: Optic> Tracer<'a, O> {
    #[inline]
    #[must_use]
    pub fn new(scene: &'a [O], config: &'a TraceConfig) -> Self {
        Self {
            scene,
            config,
            warning: false,
            stats: TraceStats::default(),
        }
    }

    /// Whether a numerical fault stopped this pass.
    #[inline]
    #[must_use]
    pub fn warning(&self) -> bool {
        self.warning
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// Clears the warning flag and the counters, to start a new pass.
    #[inline]
    pub fn reset(&mut self) {
        self.warning = false;
        self.stats = TraceStats::default();
    }

    /// Recomputes `ray`'s end and children against the scene, recursively.
    ///
    /// Does nothing once the warning flag is set.
    #[inline]
    pub fn propagate(&mut self, ray: &mut Ray) {
        if !self.warning {
            self.propagate_at(ray, 0);
        }
    }

    fn propagate_at(&mut self, ray: &mut Ray, depth: usize) {
        let scene = self.scene;

        ray.children.clear();
        ray.end = None;
        self.stats.nodes += 1;

        let Some(hit) = resolve(scene, ray.half_line(), self.config.self_hit_eps_sq) else {
            ray.end = Some(ray.at(2. * self.config.half_width));
            self.stats.escaped += 1;
            return;
        };

        self.stats.hits += 1;
        ray.end = Some(hit.contact.point);

        trace!(
            "depth {depth}: hit surface #{} at {:?}",
            hit.index,
            hit.contact.point.as_slice()
        );

        let emission = match hit
            .optic
            .return_ray(ray, &hit.contact)
            .and_then(check_emission)
        {
            Ok(emission) => emission,
            Err(e) => {
                self.trip(&e, hit.index, depth);
                return;
            }
        };

        if emission.is_empty() {
            self.stats.absorbed += 1;
        }

        for mut child in emission {
            if child.intensity() < self.config.min_intensity {
                self.stats.pruned += 1;
                continue;
            }

            if !self.warning {
                if self.config.max_depth.is_some_and(|max| depth >= max) {
                    self.stats.truncated += 1;
                    debug!("bounce limit reached after surface #{}", hit.index);
                } else {
                    self.propagate_at(&mut child, depth + 1);
                }
            }

            ray.children.push(child);
        }
    }

    fn trip(&mut self, e: &Error, index: usize, depth: usize) {
        warn!("tracing stopped at surface #{index} (depth {depth}): {e}");
        self.warning = true;
        self.stats.faults += 1;
    }
}

fn check_emission(emission: Emission) -> Result<Emission> {
    if emission.iter().all(Ray::is_finite) {
        Ok(emission)
    } else {
        Err(Error::NonFinite("an outgoing ray"))
    }
}

/// The outcome of a trace pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TracePass {
    /// The rays of each light source, in order, with their children filled in.
    pub trees: Vec<Vec<Ray>>,
    /// Whether a numerical fault cut the pass short.
    pub warning: bool,
    pub stats: TraceStats,
}

impl TracePass {
    /// All root rays, of all sources.
    #[inline]
    pub fn roots(&self) -> impl Iterator<Item = &Ray> + '_ {
        self.trees.iter().flatten()
    }

    /// All rays, of all trees, in pre-order.
    #[inline]
    pub fn rays(&self) -> impl Iterator<Item = &Ray> + '_ {
        self.roots().flat_map(Ray::walk)
    }
}

/// Emits the rays of every source and propagates them through `scene`.
///
/// Returns an error if `config` is invalid.
pub fn trace_pass<O: Optic, E: Emitter>(
    scene: &[O],
    sources: &[E],
    config: &TraceConfig,
) -> Result<TracePass> {
    config.validate()?;

    let mut tracer = Tracer::new(scene, config);

    let trees = sources
        .iter()
        .map(|source| {
            let mut rays = source.emit();
            rays.iter_mut().for_each(|ray| tracer.propagate(ray));
            rays
        })
        .collect();

    let stats = *tracer.stats();

    debug!(
        "trace pass: {} surfaces, {} sources, {stats:?}",
        scene.len(),
        sources.len()
    );

    Ok(TracePass {
        trees,
        warning: tracer.warning(),
        stats,
    })
}
