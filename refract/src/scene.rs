use log::debug;

use crate::{
    source::Emitter,
    trace::{trace_pass, TraceConfig, TracePass},
    Optic, Result,
};

/// Surfaces and light sources, along with the last trace pass run over them.
///
/// Any mutable access marks the scene as dirty, and only dirty scenes are retraced.
#[derive(Clone, Debug)]
pub struct Scene<O, S> {
    surfaces: Vec<O>,
    sources: Vec<S>,
    dirty: bool,
    last_pass: Option<(TraceConfig, TracePass)>,
}

impl<O, S> Default for Scene<O, S> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl<O, S> Scene<O, S> {
    #[inline]
    #[must_use]
    pub fn new(surfaces: Vec<O>, sources: Vec<S>) -> Self {
        Self {
            surfaces,
            sources,
            dirty: true,
            last_pass: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &[O] {
        &self.surfaces
    }

    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[S] {
        &self.sources
    }

    #[inline]
    pub fn surfaces_mut(&mut self) -> &mut Vec<O> {
        self.dirty = true;
        &mut self.surfaces
    }

    #[inline]
    pub fn sources_mut(&mut self) -> &mut Vec<S> {
        self.dirty = true;
        &mut self.sources
    }

    #[inline]
    pub fn push_surface(&mut self, surface: O) {
        self.surfaces_mut().push(surface);
    }

    #[inline]
    pub fn push_source(&mut self, source: S) {
        self.sources_mut().push(source);
    }

    /// Removes and returns the `i`th surface, if there is one.
    pub fn remove_surface(&mut self, i: usize) -> Option<O> {
        (i < self.surfaces.len()).then(|| self.surfaces_mut().remove(i))
    }

    /// Removes and returns the `i`th source, if there is one.
    pub fn remove_source(&mut self, i: usize) -> Option<S> {
        (i < self.sources.len()).then(|| self.sources_mut().remove(i))
    }

    /// Whether the next call to [`Self::retrace`] will run a new pass, whatever its configuration.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.last_pass.is_none()
    }

    /// Forces the next call to [`Self::retrace`] to run a new pass.
    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// The last pass run, stale if the scene is dirty.
    #[inline]
    #[must_use]
    pub fn last_pass(&self) -> Option<&TracePass> {
        self.last_pass.as_ref().map(|(_, pass)| pass)
    }
}

impl<O: Optic, S: Emitter> Scene<O, S> {
    /// Runs a trace pass if anything, `config` included, changed since the last one,
    /// and returns the up-to-date pass.
    pub fn retrace(&mut self, config: &TraceConfig) -> Result<&TracePass> {
        let stale = self.dirty
            || self
                .last_pass
                .as_ref()
                .map_or(true, |(last_config, _)| last_config != config);

        if stale {
            let pass = trace_pass(&self.surfaces, &self.sources, config)?;
            self.dirty = false;
            self.last_pass = Some((config.clone(), pass));
        } else {
            debug!("scene unchanged, reusing the last trace pass");
        }

        let (_, pass) = self
            .last_pass
            .get_or_insert_with(|| (config.clone(), TracePass::default()));
        Ok(pass)
    }
}
