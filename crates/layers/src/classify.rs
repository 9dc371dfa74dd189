//! Turns raw fixes and forecast points into annotated point features.

use std::fmt::Write as _;

use foundation::LngLat;
use foundation::math::circle_ring;
use formats::timestamp::display_timestamp;
use formats::{Feature, ForecastPoint, Geometry, Measure, ObservedFix, TrackRecord};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointRole {
    Historical,
    CurrentObserved,
    Forecast,
}

impl PointRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PointRole::Historical => "historical",
            PointRole::CurrentObserved => "current-observed",
            PointRole::Forecast => "forecast",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PointRole::Historical => "Past position",
            PointRole::CurrentObserved => "Current position",
            PointRole::Forecast => "Forecast position",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPointFeature {
    pub position: LngLat,
    pub role: PointRole,
    /// HTML shown in the popup.
    pub description: String,
    pub track_name: String,
}

impl GeoPointFeature {
    pub fn to_feature(&self) -> Feature {
        Feature::new(Geometry::Point {
            coordinates: self.position.as_array(),
        })
        .with_property("description", self.description.as_str())
        .with_property("trackName", self.track_name.as_str())
        .with_property("role", self.role.as_str())
        .with_property("isCurrentObserved", self.role == PointRole::CurrentObserved)
        .with_property("isHistorical", self.role == PointRole::Historical)
        .with_property("isForecast", self.role == PointRole::Forecast)
    }
}

/// Approximated 15 m/s wind radius around one point.
#[derive(Debug, Clone, PartialEq)]
pub struct StormSurgeRing {
    pub center: LngLat,
    pub radius_km: f64,
    pub ring: Vec<LngLat>,
    pub track_name: String,
}

impl StormSurgeRing {
    fn around(center: LngLat, radius: Measure, track_name: &str) -> Option<Self> {
        let radius_km = radius.positive()?;
        let ring = circle_ring(center.lat, center.lng, radius_km)?;
        Some(Self {
            center,
            radius_km,
            ring,
            track_name: track_name.to_string(),
        })
    }

    pub fn to_feature(&self) -> Feature {
        Feature::new(Geometry::LineString {
            coordinates: self.ring.iter().map(|p| p.as_array()).collect(),
        })
        .with_property("trackName", self.track_name.as_str())
        .with_property("radiusKm", Value::from(self.radius_km))
    }
}

/// One track after classification, positions in feed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedTrack {
    pub name: String,
    pub observed: Vec<GeoPointFeature>,
    pub forecast: Vec<GeoPointFeature>,
    pub surge_observed: Option<StormSurgeRing>,
    pub surge_forecast: Vec<StormSurgeRing>,
    pub skipped_fixes: usize,
    pub skipped_forecasts: usize,
}

impl ClassifiedTrack {
    pub fn observed_positions(&self) -> Vec<LngLat> {
        self.observed.iter().map(|p| p.position).collect()
    }

    pub fn forecast_positions(&self) -> Vec<LngLat> {
        self.forecast.iter().map(|p| p.position).collect()
    }
}

fn position(latitude: Measure, longitude: Measure) -> Option<LngLat> {
    let p = LngLat::from_lat_lng(latitude.value()?, longitude.value()?);
    p.is_finite().then_some(p)
}

pub fn classify_track(track: &TrackRecord) -> ClassifiedTrack {
    let name = track.name.as_str();
    let mut out = ClassifiedTrack {
        name: name.to_string(),
        ..ClassifiedTrack::default()
    };

    let fixes: Vec<(&ObservedFix, LngLat)> = track
        .analysis_fixes
        .iter()
        .enumerate()
        .filter_map(|(index, fix)| match position(fix.latitude, fix.longitude) {
            Some(p) => Some((fix, p)),
            None => {
                warn!(track = name, index, "skipping observed fix without a usable position");
                None
            }
        })
        .collect();
    out.skipped_fixes = track.analysis_fixes.len() - fixes.len();

    let last = fixes.len().saturating_sub(1);
    for (i, (fix, p)) in fixes.iter().enumerate() {
        let role = if i == last {
            PointRole::CurrentObserved
        } else {
            PointRole::Historical
        };
        if role == PointRole::CurrentObserved {
            out.surge_observed = StormSurgeRing::around(*p, fix.radius_15ms, name);
        }
        out.observed.push(GeoPointFeature {
            position: *p,
            role,
            description: describe_fix(name, role, *p, fix),
            track_name: name.to_string(),
        });
    }

    for (index, point) in track.forecast_points.iter().enumerate() {
        let Some(p) = position(point.latitude, point.longitude) else {
            warn!(track = name, index, "skipping forecast point without a usable position");
            out.skipped_forecasts += 1;
            continue;
        };
        if let Some(ring) = StormSurgeRing::around(p, point.radius_15ms, name) {
            out.surge_forecast.push(ring);
        }
        out.forecast.push(GeoPointFeature {
            position: p,
            role: PointRole::Forecast,
            description: describe_forecast(name, p, point),
            track_name: name.to_string(),
        });
    }

    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn coordinate_text(p: LngLat) -> String {
    let ns = if p.lat < 0.0 { 'S' } else { 'N' };
    let ew = if p.lng < 0.0 { 'W' } else { 'E' };
    format!("{:.2}°{ns}, {:.2}°{ew}", p.lat.abs(), p.lng.abs())
}

fn time_text(raw: Option<&str>) -> String {
    match raw {
        Some(t) => escape_html(&display_timestamp(t)),
        None => formats::NOT_APPLICABLE.to_string(),
    }
}

fn header(track_name: &str, role: PointRole, time: Option<&str>, p: LngLat) -> String {
    format!(
        "<div class=\"info-window-content\"><strong>{} - {}</strong><br>Time: {}<br>Position: {}<br>",
        escape_html(track_name),
        role.label(),
        time_text(time),
        coordinate_text(p),
    )
}

fn describe_fix(track_name: &str, role: PointRole, p: LngLat, fix: &ObservedFix) -> String {
    let mut html = header(track_name, role, fix.time.as_deref(), p);
    let direction = fix
        .moving_direction
        .as_deref()
        .map_or_else(|| formats::NOT_APPLICABLE.to_string(), escape_html);
    let _ = write!(
        html,
        "Max wind: {} m/s<br>Gust: {} m/s<br>Pressure: {} hPa<br>Moving: {} at {} km/h<br>",
        fix.max_wind_speed, fix.max_gust_speed, fix.pressure, direction, fix.moving_speed,
    );
    if role == PointRole::CurrentObserved {
        if let Some(r) = fix.radius_15ms.positive() {
            let _ = write!(html, "15 m/s radius: {} km<br>", Measure::Value(r));
        }
    }
    html.push_str("</div>");
    html
}

fn describe_forecast(track_name: &str, p: LngLat, point: &ForecastPoint) -> String {
    let mut html = header(track_name, PointRole::Forecast, point.forecast_time.as_deref(), p);
    let _ = write!(
        html,
        "Max wind: {} m/s<br>Pressure: {} hPa<br>",
        point.max_wind_speed, point.pressure,
    );
    if let Some(r) = point.radius_15ms.positive() {
        let _ = write!(html, "15 m/s radius: {} km<br>", Measure::Value(r));
    }
    html.push_str("</div>");
    html
}
