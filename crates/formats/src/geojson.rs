use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometry kinds the map layers filter on (`["==", "$type", kind]`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
}

impl GeometryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
        }
    }
}

/// The subset of GeoJSON geometry this crate emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn count_kind(&self, kind: GeometryKind) -> usize {
        self.features
            .iter()
            .filter(|f| f.geometry.kind() == kind)
            .count()
    }

    pub fn to_geojson_value(&self) -> Value {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureCollection, Geometry, GeometryKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_as_geojson() {
        let fc: FeatureCollection = [
            Feature::new(Geometry::Point {
                coordinates: [121.5, 22.5],
            })
            .with_property("trackName", "DANAS"),
            Feature::new(Geometry::LineString {
                coordinates: vec![[121.0, 22.0], [121.5, 22.5]],
            }),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            fc.to_geojson_value(),
            json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [121.5, 22.5] },
                        "properties": { "trackName": "DANAS" }
                    },
                    {
                        "type": "Feature",
                        "geometry": {
                            "type": "LineString",
                            "coordinates": [[121.0, 22.0], [121.5, 22.5]]
                        },
                        "properties": {}
                    }
                ]
            })
        );
    }

    #[test]
    fn parses_back_and_counts_kinds() {
        let text = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } }
            ]
        })
        .to_string();
        let fc: FeatureCollection = serde_json::from_str(&text).expect("collection");
        assert_eq!(fc.count_kind(GeometryKind::Point), 1);
        assert_eq!(fc.count_kind(GeometryKind::LineString), 0);
    }
}
