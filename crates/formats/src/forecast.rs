use serde::{Deserialize, Serialize};

use crate::measure::{lenient_list, lenient_text, parse_entries, text_or_empty};

/// Weather outlook for one location, as served by `/api/all_locations_forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForecast {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub location_name: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub forecasts: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub start_time: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub end_time: String,
    #[serde(default)]
    pub data: PeriodElements,
}

/// Weather elements for a period. Every element may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodElements {
    /// Weather phenomenon text.
    #[serde(rename = "Wx", default, deserialize_with = "lenient_text")]
    pub wx: Option<String>,
    #[serde(rename = "MinT", default, deserialize_with = "lenient_text")]
    pub min_t: Option<String>,
    #[serde(rename = "MaxT", default, deserialize_with = "lenient_text")]
    pub max_t: Option<String>,
    /// Probability of precipitation, percent.
    #[serde(rename = "PoP", default, deserialize_with = "lenient_text")]
    pub pop: Option<String>,
}

/// Decodes a `/api/all_locations_forecast` payload. `null` reads as no locations,
/// and a location that cannot be decoded is dropped.
pub fn parse_forecasts(payload: &str) -> Result<Vec<LocationForecast>, serde_json::Error> {
    parse_entries(payload)
}

#[cfg(test)]
mod tests {
    use super::{PeriodElements, parse_forecasts};
    use serde_json::json;

    #[test]
    fn decodes_locations_and_periods() {
        let payload = json!([{
            "locationName": "Taipei",
            "forecasts": [{
                "startTime": "2025-07-28 18:00:00",
                "endTime": "2025-07-29 06:00:00",
                "data": { "Wx": "Cloudy", "MinT": "27", "MaxT": 33, "PoP": "20" }
            }]
        }])
        .to_string();

        let locs = parse_forecasts(&payload).expect("forecasts");
        assert_eq!(locs[0].location_name, "Taipei");
        let data = &locs[0].forecasts[0].data;
        assert_eq!(data.wx.as_deref(), Some("Cloudy"));
        assert_eq!(data.max_t.as_deref(), Some("33"));
    }

    #[test]
    fn missing_elements_are_none() {
        let payload = json!([{
            "locationName": "Keelung",
            "forecasts": [{ "startTime": "a", "endTime": "b" }]
        }])
        .to_string();
        let locs = parse_forecasts(&payload).expect("forecasts");
        assert_eq!(locs[0].forecasts[0].data, PeriodElements::default());
    }

    #[test]
    fn null_payload_is_empty() {
        assert!(parse_forecasts("null").expect("forecasts").is_empty());
    }

    #[test]
    fn malformed_locations_and_periods_are_dropped_individually() {
        let payload = json!([
            { "locationName": 101, "forecasts": "none" },
            42,
            { "locationName": "Tainan", "forecasts": [
                "garbage",
                { "startTime": 5, "endTime": "2025-07-29 06:00:00" }
            ]}
        ])
        .to_string();

        let locs = parse_forecasts(&payload).expect("forecasts");
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].location_name, "101");
        assert!(locs[0].forecasts.is_empty());
        assert_eq!(locs[1].location_name, "Tainan");
        assert_eq!(locs[1].forecasts.len(), 1);
        assert_eq!(locs[1].forecasts[0].start_time, "5");
    }
}

