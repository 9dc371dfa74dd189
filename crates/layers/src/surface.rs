use foundation::LngLat;
use formats::{FeatureCollection, GeometryKind};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Line,
    Circle,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Line => "line",
            LayerKind::Circle => "circle",
        }
    }
}

/// Everything a surface needs to add one styled layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: &'static str,
    pub kind: LayerKind,
    pub source: &'static str,
    pub filter: Option<GeometryKind>,
    pub layout: Value,
    pub paint: Value,
}

impl LayerSpec {
    /// Style-document form accepted by `map.addLayer`.
    pub fn to_style_json(&self) -> Value {
        let mut v = json!({
            "id": self.id,
            "type": self.kind.as_str(),
            "source": self.source,
            "layout": self.layout,
            "paint": self.paint,
        });
        if let Some(kind) = self.filter {
            v["filter"] = json!(["==", "$type", kind.as_str()]);
        }
        v
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitOptions {
    pub padding_px: f64,
    pub max_zoom: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS value for the canvas cursor.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("source already exists: {0}")]
    DuplicateSource(String),
    #[error("layer already exists: {0}")]
    DuplicateLayer(String),
    #[error("no such source: {0}")]
    MissingSource(String),
    #[error("no such layer: {0}")]
    MissingLayer(String),
    #[error("source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },
    #[error("surface rejected the call: {0}")]
    Backend(String),
}

/// The slice of a map rendering engine the track pipeline drives.
///
/// Implementations mirror the engine's own rules: adding an existing id or
/// removing a missing one is an error, and a source cannot be removed while a
/// layer still reads from it.
pub trait MapSurface {
    /// Style is loaded and resources may be added.
    fn is_loaded(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;
    fn has_layer(&self, id: &str) -> bool;

    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), SurfaceError>;
    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), SurfaceError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError>;
    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError>;

    /// Click, enter and leave handlers currently attached to `layer_id`.
    fn has_pointer_binding(&self, layer_id: &str) -> bool;
    fn bind_pointer_events(&mut self, layer_id: &str) -> Result<(), SurfaceError>;
    /// No-op when nothing is bound.
    fn unbind_pointer_events(&mut self, layer_id: &str);

    /// `bounds` is `[[min_lng, min_lat], [max_lng, max_lat]]`.
    fn fit_bounds(&mut self, bounds: [[f64; 2]; 2], options: FitOptions);
    fn set_cursor(&mut self, cursor: Cursor);

    fn popup_is_open(&self) -> bool;
    fn open_popup(&mut self, at: LngLat, html: &str);
    fn close_popup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::{LayerKind, LayerSpec};
    use formats::GeometryKind;
    use serde_json::json;

    #[test]
    fn style_json_includes_type_filter() {
        let spec = LayerSpec {
            id: "points",
            kind: LayerKind::Circle,
            source: "data",
            filter: Some(GeometryKind::Point),
            layout: json!({}),
            paint: json!({ "circle-radius": 8.0 }),
        };
        let v = spec.to_style_json();
        assert_eq!(v["type"], json!("circle"));
        assert_eq!(v["filter"], json!(["==", "$type", "Point"]));
    }

    #[test]
    fn unfiltered_layer_omits_filter() {
        let spec = LayerSpec {
            id: "ring",
            kind: LayerKind::Line,
            source: "rings",
            filter: None,
            layout: json!({}),
            paint: json!({}),
        };
        assert!(spec.to_style_json().get("filter").is_none());
    }
}
