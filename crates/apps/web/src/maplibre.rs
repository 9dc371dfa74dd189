//! [`MapSurface`] backed by a MapLibre GL map running in the page.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::LngLat;
use formats::FeatureCollection;
use js_sys::{Array, Reflect};
use layers::interaction::{FeatureHit, PointerEvent};
use layers::{Cursor, FitOptions, LayerSpec, MapSurface, SurfaceError, TrackLayer};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
export function typhoon_map_create(options) {
    return new maplibregl.Map(options);
}

export function typhoon_popup_create() {
    return new maplibregl.Popup({ closeButton: true, closeOnClick: false });
}

export function typhoon_map_has_layer(map, id) {
    return !!map.getLayer(id);
}

export function typhoon_map_has_source(map, id) {
    return !!map.getSource(id);
}

export function typhoon_map_add_source(map, id, data) {
    map.addSource(id, { type: 'geojson', data });
}

export function typhoon_map_add_layer(map, layer) {
    map.addLayer(layer);
}

export function typhoon_map_remove_layer(map, id) {
    map.removeLayer(id);
}

export function typhoon_map_remove_source(map, id) {
    map.removeSource(id);
}

export function typhoon_map_on_layer(map, event, layerId, handler) {
    map.on(event, layerId, handler);
}

export function typhoon_map_off_layer(map, event, layerId, handler) {
    map.off(event, layerId, handler);
}

export function typhoon_map_on_load(map, handler) {
    map.on('load', handler);
}

export function typhoon_map_fit_bounds(map, bounds, padding, maxZoom) {
    map.fitBounds(bounds, { padding, maxZoom });
}

export function typhoon_map_set_cursor(map, cursor) {
    map.getCanvas().style.cursor = cursor;
}

export function typhoon_map_remove(map) {
    map.remove();
}

export function typhoon_popup_open(popup, map, lng, lat, html) {
    popup.setLngLat([lng, lat]).setHTML(html).addTo(map);
}

export function typhoon_popup_close(popup) {
    popup.remove();
}

export function typhoon_popup_is_open(popup) {
    return popup.isOpen();
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    pub fn typhoon_map_create(options: &JsValue) -> Result<JsValue, JsValue>;
    fn typhoon_popup_create() -> JsValue;
    fn typhoon_map_has_layer(map: &JsValue, id: &str) -> bool;
    fn typhoon_map_has_source(map: &JsValue, id: &str) -> bool;
    #[wasm_bindgen(catch)]
    fn typhoon_map_add_source(map: &JsValue, id: &str, data: &JsValue) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn typhoon_map_add_layer(map: &JsValue, layer: &JsValue) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn typhoon_map_remove_layer(map: &JsValue, id: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn typhoon_map_remove_source(map: &JsValue, id: &str) -> Result<(), JsValue>;
    fn typhoon_map_on_layer(map: &JsValue, event: &str, layer_id: &str, handler: &js_sys::Function);
    fn typhoon_map_off_layer(map: &JsValue, event: &str, layer_id: &str, handler: &js_sys::Function);
    pub fn typhoon_map_on_load(map: &JsValue, handler: &js_sys::Function);
    fn typhoon_map_fit_bounds(map: &JsValue, bounds: &JsValue, padding: f64, max_zoom: f64);
    fn typhoon_map_set_cursor(map: &JsValue, cursor: &str);
    fn typhoon_map_remove(map: &JsValue);
    fn typhoon_popup_open(popup: &JsValue, map: &JsValue, lng: f64, lat: f64, html: &str);
    fn typhoon_popup_close(popup: &JsValue);
    fn typhoon_popup_is_open(popup: &JsValue) -> bool;
}

/// Receives pointer events from the point layers.
pub type PointerSink = Rc<dyn Fn(PointerEvent)>;

type Handler = Closure<dyn FnMut(JsValue)>;

/// Click, enter and leave listeners attached to one layer.
struct LayerHandlers {
    click: Handler,
    enter: Handler,
    leave: Handler,
}

impl LayerHandlers {
    fn each(&self) -> [(&'static str, &Handler); 3] {
        [
            ("click", &self.click),
            ("mouseenter", &self.enter),
            ("mouseleave", &self.leave),
        ]
    }
}

pub struct JsMapSurface {
    map: JsValue,
    popup: JsValue,
    loaded: Rc<Cell<bool>>,
    sink: PointerSink,
    handlers: BTreeMap<String, LayerHandlers>,
}

impl JsMapSurface {
    pub fn new(map: JsValue, loaded: Rc<Cell<bool>>, sink: PointerSink) -> Self {
        Self {
            map,
            popup: typhoon_popup_create(),
            loaded,
            sink,
            handlers: BTreeMap::new(),
        }
    }

    /// Tears down the underlying map. The surface is unusable afterwards.
    pub fn remove_map(&mut self) {
        let ids: Vec<String> = self.handlers.keys().cloned().collect();
        for id in ids {
            self.unbind_pointer_events(&id);
        }
        typhoon_popup_close(&self.popup);
        typhoon_map_remove(&self.map);
        self.loaded.set(false);
    }
}

fn backend(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(
        err.as_string()
            .or_else(|| js_sys::JSON::stringify(&err).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| "unknown MapLibre error".to_string()),
    )
}

fn to_js(value: &Value) -> Result<JsValue, SurfaceError> {
    let text = serde_json::to_string(value).map_err(|e| SurfaceError::Backend(e.to_string()))?;
    js_sys::JSON::parse(&text).map_err(backend)
}

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn event_lng_lat(event: &JsValue) -> Option<LngLat> {
    let at = get(event, "lngLat")?;
    Some(LngLat::new(get(&at, "lng")?.as_f64()?, get(&at, "lat")?.as_f64()?))
}

/// The topmost rendered feature under a click.
fn first_feature(event: &JsValue) -> Option<FeatureHit> {
    let features: Array = get(event, "features")?.dyn_into().ok()?;
    let feature = features.get(0);
    let coords: Array = get(&get(&feature, "geometry")?, "coordinates")?
        .dyn_into()
        .ok()?;
    let description = get(&feature, "properties")
        .and_then(|p| get(&p, "description"))
        .and_then(|d| d.as_string())
        .unwrap_or_default();
    Some(FeatureHit {
        coordinates: LngLat::new(coords.get(0).as_f64()?, coords.get(1).as_f64()?),
        description,
    })
}

impl MapSurface for JsMapSurface {
    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    fn has_source(&self, id: &str) -> bool {
        typhoon_map_has_source(&self.map, id)
    }

    fn has_layer(&self, id: &str) -> bool {
        typhoon_map_has_layer(&self.map, id)
    }

    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), SurfaceError> {
        let data = to_js(&data.to_geojson_value())?;
        typhoon_map_add_source(&self.map, id, &data).map_err(backend)
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), SurfaceError> {
        let style = to_js(&layer.to_style_json())?;
        typhoon_map_add_layer(&self.map, &style).map_err(backend)
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        typhoon_map_remove_layer(&self.map, id).map_err(backend)
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        typhoon_map_remove_source(&self.map, id).map_err(backend)
    }

    fn has_pointer_binding(&self, layer_id: &str) -> bool {
        self.handlers.contains_key(layer_id)
    }

    fn bind_pointer_events(&mut self, layer_id: &str) -> Result<(), SurfaceError> {
        let layer = TrackLayer::from_id(layer_id)
            .ok_or_else(|| SurfaceError::MissingLayer(layer_id.to_string()))?;
        if self.handlers.contains_key(layer_id) {
            return Ok(());
        }

        let sink = self.sink.clone();
        let click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let Some(at) = event_lng_lat(&event) else {
                return;
            };
            sink(PointerEvent::Click {
                layer,
                at,
                hit: first_feature(&event),
            });
        });
        let sink = self.sink.clone();
        let enter = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            sink(PointerEvent::Enter { layer });
        });
        let sink = self.sink.clone();
        let leave = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            sink(PointerEvent::Leave { layer });
        });

        let handlers = LayerHandlers {
            click,
            enter,
            leave,
        };
        for (event, handler) in handlers.each() {
            typhoon_map_on_layer(&self.map, event, layer_id, handler.as_ref().unchecked_ref());
        }
        self.handlers.insert(layer_id.to_string(), handlers);
        Ok(())
    }

    fn unbind_pointer_events(&mut self, layer_id: &str) {
        if let Some(handlers) = self.handlers.remove(layer_id) {
            for (event, handler) in handlers.each() {
                typhoon_map_off_layer(&self.map, event, layer_id, handler.as_ref().unchecked_ref());
            }
        }
    }

    fn fit_bounds(&mut self, bounds: [[f64; 2]; 2], options: FitOptions) {
        let js_bounds = Array::new();
        for corner in bounds {
            js_bounds.push(&Array::of2(&corner[0].into(), &corner[1].into()));
        }
        typhoon_map_fit_bounds(&self.map, &js_bounds, options.padding_px, options.max_zoom);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        typhoon_map_set_cursor(&self.map, cursor.as_css());
    }

    fn popup_is_open(&self) -> bool {
        typhoon_popup_is_open(&self.popup)
    }

    fn open_popup(&mut self, at: LngLat, html: &str) {
        typhoon_popup_open(&self.popup, &self.map, at.lng, at.lat, html);
    }

    fn close_popup(&mut self) {
        typhoon_popup_close(&self.popup);
    }
}
