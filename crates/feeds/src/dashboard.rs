//! Fetch-and-display orchestration for the weather list and the track map.
//!
//! Everything runs on one thread; the only suspension points are the two
//! fetches. Each panel owns a [`RequestGate`], so when triggers overlap only
//! the newest response is shown and older ones are dropped on arrival.

use std::cell::RefCell;

use layers::interaction::PointerEvent;
use layers::{MapSurface, RefreshOutcome, RefreshSummary, TrackMap};
use runtime::RequestGate;
use tracing::{debug, error, info, warn};

use crate::feed::{DataFeed, fetch_forecasts, fetch_tracks};
use crate::protocol::FeedError;
use crate::weather::{NO_WEATHER_DATA, WeatherPanel};

#[derive(Debug)]
pub enum WeatherStatus<'a> {
    Loading,
    Empty,
    Failed(&'a FeedError),
    Ready(&'a WeatherPanel),
}

impl WeatherStatus<'_> {
    /// Inline message for the panel, if this status shows one.
    pub fn message(&self) -> Option<String> {
        match self {
            WeatherStatus::Empty => Some(NO_WEATHER_DATA.to_string()),
            WeatherStatus::Failed(err) => Some(format!("Unable to load weather forecasts: {err}")),
            WeatherStatus::Loading | WeatherStatus::Ready(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum TyphoonStatus<'a> {
    Loading,
    /// The map was not ready; nothing was drawn.
    NotReady,
    Failed(String),
    Ready(&'a RefreshSummary),
}

impl TyphoonStatus<'_> {
    pub fn message(&self) -> Option<String> {
        match self {
            TyphoonStatus::Failed(reason) => Some(format!(
                "Unable to load tropical cyclone track forecasts: {reason}"
            )),
            _ => None,
        }
    }
}

/// Where panel state is shown to the user.
pub trait StatusView {
    fn show_weather(&self, status: WeatherStatus<'_>);
    fn show_typhoon(&self, status: TyphoonStatus<'_>);
    /// Expand/collapse flags after a toggle, one per weather item.
    fn sync_weather_open(&self, open: &[bool]);
}

pub struct Dashboard<F, V, S: MapSurface> {
    feed: F,
    view: V,
    map: RefCell<TrackMap<S>>,
    weather: RefCell<WeatherPanel>,
    weather_gate: RefCell<RequestGate>,
    typhoon_gate: RefCell<RequestGate>,
}

impl<F: DataFeed, V: StatusView, S: MapSurface> Dashboard<F, V, S> {
    pub fn new(feed: F, view: V, map: TrackMap<S>) -> Self {
        Self {
            feed,
            view,
            map: RefCell::new(map),
            weather: RefCell::new(WeatherPanel::default()),
            weather_gate: RefCell::new(RequestGate::new()),
            typhoon_gate: RefCell::new(RequestGate::new()),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn map(&self) -> &RefCell<TrackMap<S>> {
        &self.map
    }

    pub fn weather(&self) -> std::cell::Ref<'_, WeatherPanel> {
        self.weather.borrow()
    }

    pub async fn load_weather(&self) {
        let ticket = self.weather_gate.borrow_mut().begin();
        self.view.show_weather(WeatherStatus::Loading);

        let result = fetch_forecasts(&self.feed).await;
        if !self.weather_gate.borrow_mut().settle(ticket) {
            debug!(generation = ticket.generation(), "dropping superseded weather response");
            return;
        }

        match result {
            Ok(locations) => {
                let panel = WeatherPanel::from_forecasts(&locations);
                info!(locations = panel.items().len(), "weather forecasts loaded");
                *self.weather.borrow_mut() = panel;
                let panel = self.weather.borrow();
                if panel.is_empty() {
                    self.view.show_weather(WeatherStatus::Empty);
                } else {
                    self.view.show_weather(WeatherStatus::Ready(&panel));
                }
            }
            Err(err) => {
                error!(%err, "failed to fetch weather forecasts");
                *self.weather.borrow_mut() = WeatherPanel::default();
                self.view.show_weather(WeatherStatus::Failed(&err));
            }
        }
    }

    pub async fn load_typhoons(&self) {
        if !self.map.borrow().surface().is_loaded() {
            warn!("map is not loaded yet, not fetching tracks");
            self.view.show_typhoon(TyphoonStatus::NotReady);
            return;
        }

        let ticket = self.typhoon_gate.borrow_mut().begin();
        self.view.show_typhoon(TyphoonStatus::Loading);
        // Stale tracks never stay up while a newer fetch is pending or failed.
        let cleared = self.map.borrow_mut().clear();
        if let Err(err) = cleared {
            warn!(%err, "could not clear track layers before fetching");
        }

        let result = fetch_tracks(&self.feed).await;
        if !self.typhoon_gate.borrow_mut().settle(ticket) {
            debug!(generation = ticket.generation(), "dropping superseded track response");
            return;
        }

        let tracks = match result {
            Ok(tracks) => tracks,
            Err(err) => {
                error!(%err, "failed to fetch tropical cyclone tracks");
                self.view.show_typhoon(TyphoonStatus::Failed(err.to_string()));
                return;
            }
        };

        let refreshed = self.map.borrow_mut().refresh(&tracks);
        match refreshed {
            Ok(RefreshOutcome::Installed(summary)) => {
                self.view.show_typhoon(TyphoonStatus::Ready(&summary));
            }
            Ok(RefreshOutcome::NotReady) => self.view.show_typhoon(TyphoonStatus::NotReady),
            Err(err) => {
                error!(%err, "failed to draw tropical cyclone tracks");
                self.view.show_typhoon(TyphoonStatus::Failed(err.to_string()));
            }
        }
    }

    pub fn toggle_weather_item(&self, index: usize) {
        let mut panel = self.weather.borrow_mut();
        if panel.toggle(index).is_some() {
            self.view.sync_weather_open(&panel.open_states());
        }
    }

    /// Section title click: collapse all if any is open, else expand all.
    pub fn toggle_all_weather(&self) {
        let mut panel = self.weather.borrow_mut();
        panel.toggle_all();
        self.view.sync_weather_open(&panel.open_states());
    }

    /// Section title click on the track panel dismisses the map popup.
    pub fn on_typhoon_title(&self) {
        self.map.borrow_mut().close_popup();
    }

    pub fn handle_pointer(&self, event: PointerEvent) {
        match self.map.try_borrow_mut() {
            Ok(mut map) => map.handle_pointer(event),
            Err(_) => debug!("pointer event arrived mid-refresh, ignored"),
        }
    }
}
