//! In-memory [`MapSurface`] for tests and offline rendering.

use std::collections::{BTreeMap, BTreeSet};

use foundation::LngLat;
use formats::FeatureCollection;

use crate::surface::{Cursor, FitOptions, LayerSpec, MapSurface, SurfaceError};

/// One mutating call, in the order it reached the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    AddSource(String),
    AddLayer(String),
    RemoveLayer(String),
    RemoveSource(String),
    Bind(String),
    Unbind(String),
    Fit([[f64; 2]; 2]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup {
    pub at: LngLat,
    pub html: String,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    loaded: bool,
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    bindings: BTreeMap<String, usize>,
    cursor: Cursor,
    popup: Option<OpenPopup>,
    last_fit: Option<([[f64; 2]; 2], FitOptions)>,
    reject_layers: BTreeSet<String>,
    ops: Vec<SurfaceOp>,
}

impl HeadlessSurface {
    /// A surface whose style has finished loading.
    pub fn loaded() -> Self {
        Self {
            loaded: true,
            ..Self::default()
        }
    }

    /// A surface still waiting on its style.
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Make the next `add_layer` calls for `id` fail.
    pub fn reject_layer(&mut self, id: &str) {
        self.reject_layers.insert(id.to_string());
    }

    pub fn accept_all_layers(&mut self) {
        self.reject_layers.clear();
    }

    pub fn source(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &FeatureCollection)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn layer_ids(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// How many live handler sets are attached to `layer_id`.
    pub fn binding_count(&self, layer_id: &str) -> usize {
        self.bindings.get(layer_id).copied().unwrap_or(0)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn popup(&self) -> Option<&OpenPopup> {
        self.popup.as_ref()
    }

    /// Simulates the user pressing the popup's close button.
    pub fn dismiss_popup(&mut self) {
        self.popup = None;
    }

    pub fn last_fit(&self) -> Option<([[f64; 2]; 2], FitOptions)> {
        self.last_fit
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl MapSurface for HeadlessSurface {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), SurfaceError> {
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), data.clone());
        self.ops.push(SurfaceOp::AddSource(id.to_string()));
        Ok(())
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), SurfaceError> {
        if self.reject_layers.contains(layer.id) {
            return Err(SurfaceError::Backend(format!("layer {} rejected", layer.id)));
        }
        if self.has_layer(layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id.to_string()));
        }
        if !self.sources.contains_key(layer.source) {
            return Err(SurfaceError::MissingSource(layer.source.to_string()));
        }
        self.layers.push(layer.clone());
        self.ops.push(SurfaceOp::AddLayer(layer.id.to_string()));
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return Err(SurfaceError::MissingLayer(id.to_string()));
        };
        self.layers.remove(pos);
        self.ops.push(SurfaceOp::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        if let Some(user) = self.layers.iter().find(|l| l.source == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer_id: user.id.to_string(),
            });
        }
        if self.sources.remove(id).is_none() {
            return Err(SurfaceError::MissingSource(id.to_string()));
        }
        self.ops.push(SurfaceOp::RemoveSource(id.to_string()));
        Ok(())
    }

    fn has_pointer_binding(&self, layer_id: &str) -> bool {
        self.binding_count(layer_id) > 0
    }

    fn bind_pointer_events(&mut self, layer_id: &str) -> Result<(), SurfaceError> {
        if !self.has_layer(layer_id) {
            return Err(SurfaceError::MissingLayer(layer_id.to_string()));
        }
        *self.bindings.entry(layer_id.to_string()).or_insert(0) += 1;
        self.ops.push(SurfaceOp::Bind(layer_id.to_string()));
        Ok(())
    }

    fn unbind_pointer_events(&mut self, layer_id: &str) {
        if self.bindings.remove(layer_id).is_some() {
            self.ops.push(SurfaceOp::Unbind(layer_id.to_string()));
        }
    }

    fn fit_bounds(&mut self, bounds: [[f64; 2]; 2], options: FitOptions) {
        self.last_fit = Some((bounds, options));
        self.ops.push(SurfaceOp::Fit(bounds));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn popup_is_open(&self) -> bool {
        self.popup.is_some()
    }

    fn open_popup(&mut self, at: LngLat, html: &str) {
        self.popup = Some(OpenPopup {
            at,
            html: html.to_string(),
        });
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::HeadlessSurface;
    use crate::layer::TrackLayer;
    use crate::surface::{MapSurface, SurfaceError};
    use formats::FeatureCollection;

    #[test]
    fn engine_rules_are_enforced() {
        let mut s = HeadlessSurface::loaded();
        let spec = TrackLayer::PointsObserved.spec();

        assert!(matches!(s.add_layer(&spec), Err(SurfaceError::MissingSource(_))));
        s.add_source(spec.source, &FeatureCollection::new()).unwrap();
        assert!(matches!(
            s.add_source(spec.source, &FeatureCollection::new()),
            Err(SurfaceError::DuplicateSource(_))
        ));
        s.add_layer(&spec).unwrap();
        assert!(matches!(
            s.remove_source(spec.source),
            Err(SurfaceError::SourceInUse { .. })
        ));
        s.remove_layer(spec.id).unwrap();
        s.remove_source(spec.source).unwrap();
        assert_eq!(s.source_count(), 0);
    }

    #[test]
    fn bindings_are_counted() {
        let mut s = HeadlessSurface::loaded();
        let spec = TrackLayer::PointsForecast.spec();
        s.add_source(spec.source, &FeatureCollection::new()).unwrap();
        s.add_layer(&spec).unwrap();
        s.bind_pointer_events(spec.id).unwrap();
        s.bind_pointer_events(spec.id).unwrap();
        assert_eq!(s.binding_count(spec.id), 2);
        s.unbind_pointer_events(spec.id);
        assert!(!s.has_pointer_binding(spec.id));
    }
}
