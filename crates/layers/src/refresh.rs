//! Replaces the rendered track layers as one transaction.
//!
//! A refresh diffs the surface against the known resource ids, removes
//! everything stale, then installs the new generation. If any install step
//! fails, whatever was installed is removed again, so the surface ends with
//! either all six layers bound to the latest data or none of them.

use formats::{FeatureCollection, TrackRecord};
use runtime::Metrics;
use runtime::metrics::names;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::interaction::{Effect, InteractionState, PointerEvent};
use crate::layer::{Resource, TrackLayer, TrackSource};
use crate::surface::{FitOptions, LayerSpec, MapSurface, SurfaceError};
use crate::synthesis::{TrackFeatureSet, synthesize};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RefreshConfig {
    pub fit_padding_px: f64,
    /// Zoom ceiling when fitting, so a single fix does not zoom to street level.
    pub fit_max_zoom: f64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            fit_padding_px: 50.0,
            fit_max_zoom: 9.0,
        }
    }
}

impl RefreshConfig {
    fn fit_options(&self) -> FitOptions {
        FitOptions {
            padding_px: self.fit_padding_px,
            max_zoom: self.fit_max_zoom,
        }
    }
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to remove stale track resources: {0}")]
    Teardown(#[source] SurfaceError),
    #[error("failed to install track layers, rolled back: {0}")]
    Install(#[source] SurfaceError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub tracks: usize,
    pub features: usize,
    pub skipped_fixes: usize,
    pub skipped_forecasts: usize,
    pub fitted: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The surface had not finished loading; nothing was touched.
    NotReady,
    Installed(RefreshSummary),
}

/// Known resources currently present on a surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Teardown {
    pub bindings: Vec<TrackLayer>,
    pub layers: Vec<TrackLayer>,
    pub sources: Vec<TrackSource>,
}

impl Teardown {
    pub fn diff<S: MapSurface + ?Sized>(surface: &S) -> Self {
        Self {
            bindings: TrackLayer::INTERACTIVE
                .into_iter()
                .filter(|l| surface.has_pointer_binding(l.id()))
                .collect(),
            // Topmost first.
            layers: TrackLayer::ALL
                .into_iter()
                .rev()
                .filter(|l| surface.has_layer(l.id()))
                .collect(),
            sources: TrackSource::ALL
                .into_iter()
                .filter(|s| surface.has_source(s.id()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.layers.is_empty() && self.sources.is_empty()
    }

    /// Handlers go first, then layers, then the sources they read from.
    fn apply<S: MapSurface + ?Sized>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        for layer in &self.bindings {
            surface.unbind_pointer_events(layer.id());
        }
        for layer in &self.layers {
            surface.remove_layer(layer.id())?;
        }
        for source in &self.sources {
            surface.remove_source(source.id())?;
        }
        Ok(())
    }
}

/// A new generation of sources and layers, ready to install.
#[derive(Debug, Clone, PartialEq)]
pub struct Install {
    pub sources: Vec<(TrackSource, FeatureCollection)>,
    pub layers: Vec<LayerSpec>,
    pub fit: Option<[[f64; 2]; 2]>,
}

impl Install {
    pub fn from_features(features: &TrackFeatureSet) -> Self {
        Self {
            sources: TrackSource::ALL
                .into_iter()
                .map(|s| (s, features.collection(s).clone()))
                .collect(),
            layers: TrackLayer::ALL.into_iter().map(TrackLayer::spec).collect(),
            fit: features.bounds.to_box(),
        }
    }
}

/// What a refresh will do, computed before the surface is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshPlan {
    pub teardown: Teardown,
    pub install: Install,
}

/// Resources added so far by an in-progress install.
#[derive(Default)]
struct Installed {
    sources: Vec<&'static str>,
    layers: Vec<&'static str>,
    bindings: Vec<&'static str>,
}

impl Installed {
    fn roll_back<S: MapSurface + ?Sized>(self, surface: &mut S) {
        for id in self.bindings.iter().rev() {
            surface.unbind_pointer_events(id);
        }
        for id in self.layers.iter().rev() {
            if let Err(err) = surface.remove_layer(id) {
                warn!(layer = id, %err, "rollback could not remove layer");
            }
        }
        for id in self.sources.iter().rev() {
            if let Err(err) = surface.remove_source(id) {
                warn!(source = id, %err, "rollback could not remove source");
            }
        }
    }
}

impl RefreshPlan {
    pub fn new<S: MapSurface + ?Sized>(surface: &S, features: &TrackFeatureSet) -> Self {
        Self {
            teardown: Teardown::diff(surface),
            install: Install::from_features(features),
        }
    }

    pub fn commit<S: MapSurface + ?Sized>(
        self,
        surface: &mut S,
        config: &RefreshConfig,
    ) -> Result<Option<[[f64; 2]; 2]>, RefreshError> {
        self.teardown.apply(surface).map_err(RefreshError::Teardown)?;

        let mut installed = Installed::default();
        if let Err(err) = self.install_into(surface, &mut installed) {
            installed.roll_back(surface);
            return Err(RefreshError::Install(err));
        }

        if let Some(bounds) = self.install.fit {
            surface.fit_bounds(bounds, config.fit_options());
        }
        Ok(self.install.fit)
    }

    fn install_into<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        installed: &mut Installed,
    ) -> Result<(), SurfaceError> {
        for (source, data) in &self.install.sources {
            surface.add_source(source.id(), data)?;
            installed.sources.push(source.id());
        }
        for layer in &self.install.layers {
            surface.add_layer(layer)?;
            installed.layers.push(layer.id);
        }
        for layer in TrackLayer::INTERACTIVE {
            surface.bind_pointer_events(layer.id())?;
            installed.bindings.push(layer.id());
        }
        Ok(())
    }
}

/// Owns a map surface and everything the track pipeline keeps about it.
pub struct TrackMap<S: MapSurface> {
    surface: S,
    config: RefreshConfig,
    interaction: InteractionState,
    metrics: Metrics,
}

impl<S: MapSurface> TrackMap<S> {
    pub fn create(surface: S, config: RefreshConfig) -> Self {
        Self {
            surface,
            config,
            interaction: InteractionState::new(),
            metrics: Metrics::new(),
        }
    }

    /// Removes every track resource and hands the surface back.
    pub fn destroy(mut self) -> S {
        if let Err(err) = self.clear() {
            warn!(%err, "track layers were not fully removed");
        }
        self.surface
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Rebuilds all track layers from `tracks`.
    pub fn refresh(&mut self, tracks: &[TrackRecord]) -> Result<RefreshOutcome, RefreshError> {
        if !self.surface.is_loaded() {
            warn!("map is not loaded yet, skipping track refresh");
            self.metrics.inc_counter(names::REFRESH_NOT_READY, 1);
            return Ok(RefreshOutcome::NotReady);
        }

        self.clear()?;
        let features = synthesize(tracks);

        let plan = RefreshPlan::new(&self.surface, &features);
        if !plan.teardown.is_empty() {
            debug!(teardown = ?plan.teardown, "removing leftovers before install");
        }
        let fitted = match plan.commit(&mut self.surface, &self.config) {
            Ok(fitted) => fitted,
            Err(err) => {
                self.metrics.inc_counter(names::REFRESH_ROLLED_BACK, 1);
                return Err(err);
            }
        };

        let summary = RefreshSummary {
            tracks: features.tracks,
            features: features.feature_count(),
            skipped_fixes: features.skipped_fixes,
            skipped_forecasts: features.skipped_forecasts,
            fitted,
        };
        self.metrics.inc_counter(names::REFRESH_COUNT, 1);
        self.metrics.inc_counter(names::TRACKS_REFRESHED, summary.tracks as u64);
        self.metrics.inc_counter(names::FIXES_SKIPPED, summary.skipped_fixes as u64);
        self.metrics.inc_counter(names::FORECASTS_SKIPPED, summary.skipped_forecasts as u64);
        self.metrics.set_gauge(names::FEATURES_INSTALLED, summary.features as i64);
        info!(
            tracks = summary.tracks,
            features = summary.features,
            skipped_fixes = summary.skipped_fixes,
            "track layers refreshed"
        );
        Ok(RefreshOutcome::Installed(summary))
    }

    /// Removes all track resources and closes the popup. Safe when nothing exists.
    pub fn clear(&mut self) -> Result<(), RefreshError> {
        let effects = self.interaction.reset();
        self.apply(effects);
        if self.surface.popup_is_open() {
            self.surface.close_popup();
        }
        Teardown::diff(&self.surface)
            .apply(&mut self.surface)
            .map_err(RefreshError::Teardown)
    }

    pub fn close_popup(&mut self) {
        self.interaction.sync_popup(self.surface.popup_is_open());
        let effects = self.interaction.close();
        self.apply(effects);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.interaction.sync_popup(self.surface.popup_is_open());
        let effects = self.interaction.handle(event);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClosePopup => self.surface.close_popup(),
                Effect::OpenPopup { at, html } => self.surface.open_popup(at, &html),
                Effect::SetCursor(cursor) => self.surface.set_cursor(cursor),
            }
        }
    }
}
