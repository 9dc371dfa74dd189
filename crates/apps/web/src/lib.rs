use std::cell::{Cell, RefCell};
use std::rc::Rc;

use feeds::Dashboard;
use layers::interaction::PointerEvent;
use layers::{RefreshConfig, TrackMap};
use serde::Deserialize;
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod dom;
mod feed;
mod maplibre;

use dom::DomStatusView;
use feed::GlooFeed;
use maplibre::JsMapSurface;

type WebDashboard = Dashboard<GlooFeed, DomStatusView, JsMapSurface>;

/// Page settings; every field may be overridden from JS.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MapConfig {
    container: String,
    style_url: String,
    center: [f64; 2],
    zoom: f64,
    /// Origin of the data service; empty means same origin.
    api_base: String,
    fit_padding_px: f64,
    fit_max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        let refresh = RefreshConfig::default();
        Self {
            container: "typhoon-map".to_string(),
            style_url: "https://tiles.stadiamaps.com/styles/osm_bright.json".to_string(),
            center: [120.9, 23.6],
            zoom: 7.0,
            api_base: String::new(),
            fit_padding_px: refresh.fit_padding_px,
            fit_max_zoom: refresh.fit_max_zoom,
        }
    }
}

impl MapConfig {
    fn from_js(options: &JsValue) -> Result<Self, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        let text = js_sys::JSON::stringify(options)?
            .as_string()
            .unwrap_or_default();
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&format!("bad options: {e}")))
    }

    fn map_options(&self) -> serde_json::Value {
        json!({
            "container": self.container,
            "style": self.style_url,
            "center": self.center,
            "zoom": self.zoom,
            "pitch": 0,
            "bearing": 0,
        })
    }
}

thread_local! {
    static STATE: RefCell<Option<Rc<WebDashboard>>> = const { RefCell::new(None) };
}

/// Safe TLS access helper that returns a default on teardown instead of panicking.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<Option<Rc<WebDashboard>>>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn dashboard() -> Option<Rc<WebDashboard>> {
    with_state(|state| state.borrow().clone())
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn on_pointer(event: PointerEvent) {
    if let Some(dash) = dashboard() {
        dash.handle_pointer(event);
    }
}

fn on_weather_item(index: usize) {
    if let Some(dash) = dashboard() {
        dash.toggle_weather_item(index);
    }
}

fn listen(target: &web_sys::Element, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(handler);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // Section titles live as long as the page.
    closure.forget();
    Ok(())
}

fn bind_section_titles(document: &web_sys::Document) -> Result<(), JsValue> {
    if let Some(title) = document.query_selector("#current-weather h2")? {
        let el = title.clone();
        listen(&title, move || {
            if let Some(dash) = dashboard() {
                dash.toggle_all_weather();
            }
            dom::report(el.class_list().toggle("active"));
        })?;
    }
    if let Some(title) = document.query_selector("#typhoon h2")? {
        let el = title.clone();
        listen(&title, move || {
            if let Some(dash) = dashboard() {
                dash.on_typhoon_title();
            }
            dom::report(el.class_list().toggle("active"));
        })?;
    }
    Ok(())
}

/// Creates the map and both panels, then starts the weather fetch.
///
/// Track data is fetched once the map reports `load`.
#[wasm_bindgen]
pub fn start_dashboard(options: JsValue) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if dashboard().is_some() {
        log("dashboard already started");
        return Ok(());
    }

    let config = MapConfig::from_js(&options)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let view = DomStatusView::new(document.clone(), Rc::new(on_weather_item))?;
    let map_options = js_sys::JSON::parse(&config.map_options().to_string())?;
    let map = maplibre::typhoon_map_create(&map_options)?;
    let loaded = Rc::new(Cell::new(false));
    let surface = JsMapSurface::new(map.clone(), loaded.clone(), Rc::new(on_pointer));
    let refresh = RefreshConfig {
        fit_padding_px: config.fit_padding_px,
        fit_max_zoom: config.fit_max_zoom,
    };
    let dash = Rc::new(Dashboard::new(
        GlooFeed::new(config.api_base.as_str()),
        view,
        TrackMap::create(surface, refresh),
    ));
    with_state(|state| *state.borrow_mut() = Some(dash.clone()));

    let on_load = Closure::<dyn FnMut()>::new(move || {
        loaded.set(true);
        refresh_typhoons();
    });
    maplibre::typhoon_map_on_load(&map, on_load.as_ref().unchecked_ref());
    on_load.forget();

    bind_section_titles(&document)?;
    refresh_weather();
    Ok(())
}

#[wasm_bindgen]
pub fn refresh_weather() {
    let Some(dash) = dashboard() else {
        log("refresh_weather called before start_dashboard");
        return;
    };
    spawn_local(async move { dash.load_weather().await });
}

#[wasm_bindgen]
pub fn refresh_typhoons() {
    let Some(dash) = dashboard() else {
        log("refresh_typhoons called before start_dashboard");
        return;
    };
    spawn_local(async move { dash.load_typhoons().await });
}

/// Removes the track layers and the map itself.
#[wasm_bindgen]
pub fn stop_dashboard() {
    let Some(dash) = with_state(|state| state.borrow_mut().take()) else {
        return;
    };
    let mut map = dash.map().borrow_mut();
    if let Err(err) = map.clear() {
        log(&format!("track layers were not fully removed: {err}"));
    }
    map.surface_mut().remove_map();
}

#[cfg(test)]
mod tests {
    use super::MapConfig;

    #[test]
    fn partial_options_keep_defaults() {
        let cfg: MapConfig = serde_json::from_str(r#"{"zoom": 5, "apiBase": "http://localhost:5000"}"#).unwrap();
        assert_eq!(cfg.zoom, 5.0);
        assert_eq!(cfg.api_base, "http://localhost:5000");
        assert_eq!(cfg.container, "typhoon-map");
        assert_eq!(cfg.center, [120.9, 23.6]);
        assert_eq!(cfg.fit_max_zoom, 9.0);
    }

    #[test]
    fn map_options_use_style_url() {
        let v = MapConfig::default().map_options();
        assert_eq!(v["style"], "https://tiles.stadiamaps.com/styles/osm_bright.json");
        assert_eq!(v["zoom"], 7.0);
    }
}
