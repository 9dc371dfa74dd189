use foundation::LngLatBounds;
use formats::{FeatureCollection, TrackRecord};

use crate::classify::classify_track;
use crate::layer::TrackSource;
use crate::path::assemble_paths;

/// Everything one refresh installs, built from scratch each time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackFeatureSet {
    /// Observed points and paths.
    pub observed: FeatureCollection,
    /// Forecast points and paths.
    pub forecast: FeatureCollection,
    pub surge_observed: FeatureCollection,
    pub surge_forecast: FeatureCollection,
    /// Extent of every observed and forecast position.
    pub bounds: LngLatBounds,
    pub tracks: usize,
    pub skipped_fixes: usize,
    pub skipped_forecasts: usize,
}

impl TrackFeatureSet {
    pub fn collection(&self, source: TrackSource) -> &FeatureCollection {
        match source {
            TrackSource::Observed => &self.observed,
            TrackSource::Forecast => &self.forecast,
            TrackSource::SurgeObserved => &self.surge_observed,
            TrackSource::SurgeForecast => &self.surge_forecast,
        }
    }

    pub fn feature_count(&self) -> usize {
        TrackSource::ALL
            .iter()
            .map(|s| self.collection(*s).len())
            .sum()
    }
}

pub fn synthesize(tracks: &[TrackRecord]) -> TrackFeatureSet {
    let mut set = TrackFeatureSet {
        tracks: tracks.len(),
        ..TrackFeatureSet::default()
    };

    for track in tracks {
        let classified = classify_track(track);
        set.skipped_fixes += classified.skipped_fixes;
        set.skipped_forecasts += classified.skipped_forecasts;

        for point in classified.observed.iter().chain(&classified.forecast) {
            set.bounds.extend(point.position);
        }
        set.observed
            .features
            .extend(classified.observed.iter().map(|p| p.to_feature()));
        set.forecast
            .features
            .extend(classified.forecast.iter().map(|p| p.to_feature()));

        let paths = assemble_paths(
            &classified.name,
            &classified.observed_positions(),
            &classified.forecast_positions(),
        );
        if let Some(path) = paths.observed {
            set.observed.push(path.to_feature());
        }
        if let Some(path) = paths.forecast {
            set.forecast.push(path.to_feature());
        }

        if let Some(ring) = &classified.surge_observed {
            set.surge_observed.push(ring.to_feature());
        }
        set.surge_forecast
            .features
            .extend(classified.surge_forecast.iter().map(|r| r.to_feature()));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::synthesize;
    use crate::layer::TrackSource;
    use formats::{GeometryKind, parse_tracks};

    const TWO_TRACKS: &str = r#"[
        {"typhoonName": "A", "analysisFixes": [
            {"latitude": "21", "longitude": "120"},
            {"latitude": "22", "longitude": "121", "radius15Ms": "150"}
        ], "forecastPoints": [
            {"latitude": 23, "longitude": 121.5, "radius15Ms": 120}
        ]},
        {"typhoonName": "B", "analysisFixes": [
            {"latitude": 25, "longitude": 122}
        ], "forecastPoints": []}
    ]"#;

    #[test]
    fn collections_accumulate_across_tracks() {
        let tracks = parse_tracks(TWO_TRACKS).unwrap();
        let set = synthesize(&tracks);

        assert_eq!(set.tracks, 2);
        assert_eq!(set.observed.count_kind(GeometryKind::Point), 3);
        assert_eq!(set.observed.count_kind(GeometryKind::LineString), 1);
        assert_eq!(set.forecast.count_kind(GeometryKind::Point), 1);
        assert_eq!(set.forecast.count_kind(GeometryKind::LineString), 1);
        assert_eq!(set.surge_observed.len(), 1);
        assert_eq!(set.surge_forecast.len(), 1);
        assert_eq!(set.bounds.to_box(), Some([[120.0, 21.0], [122.0, 25.0]]));
        assert_eq!(set.feature_count(), 8);
    }

    #[test]
    fn empty_input_yields_empty_collections() {
        let set = synthesize(&[]);
        for s in TrackSource::ALL {
            assert!(set.collection(s).is_empty());
        }
        assert!(set.bounds.is_empty());
    }
}
