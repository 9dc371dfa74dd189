use formats::timestamp::{display_clock, display_minute};
use formats::{ForecastPeriod, LocationForecast, NOT_APPLICABLE};

/// Shown when the service returns no locations.
pub const NO_WEATHER_DATA: &str = "No weather forecast data to display.";

/// Shown inside a location that has no periods.
pub const NO_PERIOD_DETAIL: &str = "No detailed forecast available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCard {
    /// `YYYY/MM/DD HH:MM ~ HH:MM`
    pub span: String,
    pub weather: String,
    pub min_temp: String,
    pub max_temp: String,
    pub rain_chance: String,
}

impl PeriodCard {
    pub fn from_period(period: &ForecastPeriod) -> Self {
        let element = |v: &Option<String>| match v.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NOT_APPLICABLE.to_string(),
        };
        Self {
            span: format!(
                "{} ~ {}",
                display_minute(&period.start_time),
                display_clock(&period.end_time)
            ),
            weather: element(&period.data.wx),
            min_temp: element(&period.data.min_t),
            max_temp: element(&period.data.max_t),
            rain_chance: element(&period.data.pop),
        }
    }

    pub fn temperature(&self) -> String {
        format!("{}°C ~ {}°C", self.min_temp, self.max_temp)
    }

    pub fn rain(&self) -> String {
        format!("{}%", self.rain_chance)
    }
}

/// One collapsible location entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationItem {
    pub name: String,
    pub periods: Vec<PeriodCard>,
    pub open: bool,
}

/// The weather list and its expand/collapse state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeatherPanel {
    items: Vec<LocationItem>,
}

impl WeatherPanel {
    pub fn from_forecasts(locations: &[LocationForecast]) -> Self {
        Self {
            items: locations
                .iter()
                .map(|loc| LocationItem {
                    name: loc.location_name.clone(),
                    periods: loc.forecasts.iter().map(PeriodCard::from_period).collect(),
                    open: false,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[LocationItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn open_states(&self) -> Vec<bool> {
        self.items.iter().map(|i| i.open).collect()
    }

    /// Flips one item. Returns its new state, or `None` for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.open = !item.open;
        Some(item.open)
    }

    /// Collapses everything if any item is open, otherwise expands everything.
    pub fn toggle_all(&mut self) -> bool {
        let open = !self.items.iter().any(|i| i.open);
        for item in &mut self.items {
            item.open = open;
        }
        open
    }
}
