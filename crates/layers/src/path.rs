use foundation::LngLat;
use formats::{Feature, Geometry};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathCategory {
    Observed,
    Forecast,
}

impl PathCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PathCategory::Observed => "observed",
            PathCategory::Forecast => "forecast",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPathFeature {
    pub coordinates: Vec<LngLat>,
    pub category: PathCategory,
    pub track_name: String,
}

impl GeoPathFeature {
    pub fn to_feature(&self) -> Feature {
        Feature::new(Geometry::LineString {
            coordinates: self.coordinates.iter().map(|p| p.as_array()).collect(),
        })
        .with_property("trackName", self.track_name.as_str())
        .with_property("category", self.category.as_str())
        .with_property("isForecast", self.category == PathCategory::Forecast)
        .with_property("isPath", true)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackPaths {
    pub observed: Option<GeoPathFeature>,
    pub forecast: Option<GeoPathFeature>,
}

/// Builds the observed and forecast lines for one track.
///
/// The forecast line starts at the last observed position so both segments
/// join on the map. Fewer than two positions yields no line.
pub fn assemble_paths(track_name: &str, observed: &[LngLat], forecast: &[LngLat]) -> TrackPaths {
    let line = |coordinates: Vec<LngLat>, category| {
        (coordinates.len() >= 2).then(|| GeoPathFeature {
            coordinates,
            category,
            track_name: track_name.to_string(),
        })
    };

    let forecast_line = if forecast.is_empty() {
        Vec::new()
    } else {
        observed.last().into_iter().chain(forecast).copied().collect()
    };

    TrackPaths {
        observed: line(observed.to_vec(), PathCategory::Observed),
        forecast: line(forecast_line, PathCategory::Forecast),
    }
}

#[cfg(test)]
mod tests {
    use super::{PathCategory, assemble_paths};
    use foundation::LngLat;

    fn pts(raw: &[[f64; 2]]) -> Vec<LngLat> {
        raw.iter().copied().map(LngLat::from).collect()
    }

    #[test]
    fn single_observed_prefixes_forecast() {
        let observed = pts(&[[121.0, 22.0]]);
        let forecast = pts(&[[120.5, 22.5], [120.0, 23.0], [119.5, 23.5]]);
        let paths = assemble_paths("DANAS", &observed, &forecast);
        assert!(paths.observed.is_none());
        let f = paths.forecast.expect("forecast path");
        assert_eq!(f.category, PathCategory::Forecast);
        assert_eq!(f.coordinates.len(), 4);
        assert_eq!(f.coordinates[0], observed[0]);
    }

    #[test]
    fn forecast_joins_the_last_observed_fix() {
        let observed = pts(&[[125.0, 18.0], [124.0, 19.0], [123.0, 20.0]]);
        let forecast = pts(&[[122.0, 21.0], [121.0, 22.0]]);
        let paths = assemble_paths("X", &observed, &forecast);

        assert_eq!(paths.observed.expect("observed path").coordinates, observed);
        assert_eq!(
            paths.forecast.expect("forecast path").coordinates,
            pts(&[[123.0, 20.0], [122.0, 21.0], [121.0, 22.0]])
        );
    }

    #[test]
    fn forecast_only_track_keeps_its_own_points() {
        let forecast = pts(&[[122.0, 21.0], [121.0, 22.0], [120.0, 23.0]]);
        let paths = assemble_paths("X", &[], &forecast);
        assert!(paths.observed.is_none());
        assert_eq!(paths.forecast.expect("forecast path").coordinates, forecast);
    }

    #[test]
    fn single_forecast_without_observed_is_dropped() {
        let paths = assemble_paths("X", &[], &pts(&[[120.0, 20.0]]));
        assert_eq!(paths.observed, None);
        assert_eq!(paths.forecast, None);
    }

    #[test]
    fn observed_only_track() {
        let paths = assemble_paths("X", &pts(&[[121.0, 22.0], [121.5, 22.5]]), &[]);
        let o = paths.observed.expect("observed path");
        assert_eq!(
            o.coordinates.iter().map(|p| p.as_array()).collect::<Vec<_>>(),
            vec![[121.0, 22.0], [121.5, 22.5]]
        );
        assert!(paths.forecast.is_none());
    }

    #[test]
    fn path_feature_properties() {
        let paths = assemble_paths("X", &pts(&[[121.0, 22.0], [121.5, 22.5]]), &[]);
        let f = paths.observed.expect("path").to_feature();
        assert_eq!(f.property_str("category"), Some("observed"));
        assert_eq!(f.properties["isPath"], serde_json::json!(true));
    }
}
