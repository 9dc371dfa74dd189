use serde::{Deserialize, Deserializer, Serialize};

use crate::measure::{Measure, lenient_list, lenient_text, parse_entries, text_or};

pub const UNNAMED_TRACK: &str = "Unnamed cyclone";

fn unnamed_track() -> String {
    UNNAMED_TRACK.to_string()
}

fn track_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    text_or(deserializer, UNNAMED_TRACK)
}

/// One tropical cyclone as served by `/api/typhoon_warning`.
///
/// Fixes and forecast points arrive time-ordered; order is preserved and never
/// re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    #[serde(
        rename = "typhoonName",
        alias = "name",
        default = "unnamed_track",
        deserialize_with = "track_name"
    )]
    pub name: String,
    #[serde(default)]
    pub year: Measure,
    #[serde(default, deserialize_with = "lenient_list")]
    pub analysis_fixes: Vec<ObservedFix>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub forecast_points: Vec<ForecastPoint>,
}

/// An observed (analyzed) position and intensity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedFix {
    #[serde(default)]
    pub latitude: Measure,
    #[serde(default)]
    pub longitude: Measure,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: Option<String>,
    #[serde(default)]
    pub max_wind_speed: Measure,
    #[serde(default)]
    pub max_gust_speed: Measure,
    #[serde(default)]
    pub pressure: Measure,
    #[serde(default, deserialize_with = "lenient_text")]
    pub moving_direction: Option<String>,
    #[serde(default)]
    pub moving_speed: Measure,
    #[serde(rename = "radius15Ms", default)]
    pub radius_15ms: Measure,
}

/// A predicted future position and intensity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[serde(default)]
    pub latitude: Measure,
    #[serde(default)]
    pub longitude: Measure,
    #[serde(default, deserialize_with = "lenient_text")]
    pub forecast_time: Option<String>,
    #[serde(default)]
    pub max_wind_speed: Measure,
    #[serde(default)]
    pub pressure: Measure,
    #[serde(rename = "radius15Ms", default)]
    pub radius_15ms: Measure,
}

/// Decodes a `/api/typhoon_warning` payload.
///
/// A track that cannot be decoded at all is dropped with a warning; the rest
/// of the payload survives.
pub fn parse_tracks(payload: &str) -> Result<Vec<TrackRecord>, serde_json::Error> {
    parse_entries(payload)
}

#[cfg(test)]
mod tests {
    use super::{ForecastPoint, ObservedFix, TrackRecord, UNNAMED_TRACK, parse_tracks};
    use crate::measure::Measure;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_backend_shape() {
        let payload = json!([{
            "typhoonName": "DANAS",
            "year": "2025",
            "analysisFixes": [{
                "time": "2025-07-06T08:00:00+08:00",
                "latitude": 22.0,
                "longitude": "121.0",
                "maxWindSpeed": 33,
                "maxGustSpeed": 43,
                "pressure": 965,
                "movingDirection": "NNE",
                "movingSpeed": 12,
                "radius15Ms": "N/A",
                "quadrantRadii15Ms": {}
            }],
            "forecastPoints": [{
                "forecastTime": "2025-07-07T08:00:00+08:00",
                "latitude": 24.0,
                "longitude": 120.0,
                "maxWindSpeed": 28,
                "pressure": 975,
                "radius15Ms": 150
            }]
        }])
        .to_string();

        let tracks = parse_tracks(&payload).expect("tracks");
        assert_eq!(tracks.len(), 1);
        let t = &tracks[0];
        assert_eq!(t.name, "DANAS");
        assert_eq!(t.year, Measure::Value(2025.0));

        let fix = &t.analysis_fixes[0];
        assert_eq!(fix.longitude, Measure::Value(121.0));
        assert_eq!(fix.radius_15ms, Measure::NotApplicable);
        assert_eq!(fix.moving_direction.as_deref(), Some("NNE"));

        assert_eq!(
            t.forecast_points[0],
            ForecastPoint {
                latitude: Measure::Value(24.0),
                longitude: Measure::Value(120.0),
                forecast_time: Some("2025-07-07T08:00:00+08:00".to_string()),
                max_wind_speed: Measure::Value(28.0),
                pressure: Measure::Value(975.0),
                radius_15ms: Measure::Value(150.0),
            }
        );
    }

    #[test]
    fn missing_and_null_fields_default() {
        let t: TrackRecord = serde_json::from_value(json!({
            "analysisFixes": null,
            "forecastPoints": [{ "latitude": null }]
        }))
        .expect("track");
        assert_eq!(t.name, UNNAMED_TRACK);
        assert!(t.analysis_fixes.is_empty());
        assert_eq!(t.forecast_points.len(), 1);
        assert_eq!(t.forecast_points[0].latitude, Measure::NotApplicable);
    }

    #[test]
    fn name_alias_is_accepted() {
        let t: TrackRecord = serde_json::from_value(json!({ "name": "KROSA" })).expect("track");
        assert_eq!(t.name, "KROSA");
    }

    #[test]
    fn bad_coordinates_stay_in_the_record() {
        let t: TrackRecord = serde_json::from_value(json!({
            "typhoonName": "X",
            "analysisFixes": [
                { "latitude": "bogus", "longitude": 120.0 },
                "not an object",
                { "latitude": 21.0, "longitude": 121.0 }
            ]
        }))
        .expect("track");

        // The non-object entry is dropped; the bad latitude is kept for the
        // classifier to skip.
        assert_eq!(t.analysis_fixes.len(), 2);
        assert_eq!(t.analysis_fixes[0], ObservedFix {
            longitude: Measure::Value(120.0),
            ..ObservedFix::default()
        });
    }

    #[test]
    fn numeric_direction_is_kept_as_text() {
        let fix: ObservedFix =
            serde_json::from_value(json!({ "movingDirection": 45 })).expect("fix");
        assert_eq!(fix.moving_direction.as_deref(), Some("45"));
    }

    #[test]
    fn one_malformed_track_does_not_sink_the_payload() {
        let payload = json!([
            { "typhoonName": 7, "analysisFixes": [{ "latitude": 20.0, "longitude": 130.0 }] },
            { "typhoonName": "BAD", "analysisFixes": "oops", "forecastPoints": 3 },
            "not a track",
            { "typhoonName": "OK", "analysisFixes": [{ "latitude": 22.0, "longitude": 121.0 }] }
        ])
        .to_string();

        let tracks = parse_tracks(&payload).expect("tracks");
        let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["7", "BAD", "OK"]);
        assert_eq!(tracks[0].analysis_fixes.len(), 1);
        assert!(tracks[1].analysis_fixes.is_empty());
        assert!(tracks[1].forecast_points.is_empty());
    }

    #[test]
    fn blank_or_non_text_name_is_unnamed() {
        let tracks = parse_tracks(r#"[{"typhoonName": "  "}, {"typhoonName": {"x": 1}}]"#)
            .expect("tracks");
        assert!(tracks.iter().all(|t| t.name == UNNAMED_TRACK));
    }

    #[test]
    fn null_payload_is_empty_and_non_array_is_an_error() {
        assert!(parse_tracks("null").expect("tracks").is_empty());
        assert!(parse_tracks(r#"{"typhoonName": "X"}"#).is_err());
    }
}
