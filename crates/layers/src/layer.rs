use formats::GeometryKind;

use crate::surface::LayerSpec;
use crate::symbology::{self, Symbology};

/// A named resource on the rendering surface.
pub trait Resource: Copy {
    fn id(self) -> &'static str;
}

/// Data sources backing the track layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackSource {
    Observed,
    Forecast,
    SurgeObserved,
    SurgeForecast,
}

impl TrackSource {
    pub const ALL: [TrackSource; 4] = [
        TrackSource::Observed,
        TrackSource::Forecast,
        TrackSource::SurgeObserved,
        TrackSource::SurgeForecast,
    ];
}

impl Resource for TrackSource {
    fn id(self) -> &'static str {
        match self {
            TrackSource::Observed => "typhoon-observed-data",
            TrackSource::Forecast => "typhoon-forecast-data",
            TrackSource::SurgeObserved => "typhoon-storm-surge-observed-data",
            TrackSource::SurgeForecast => "typhoon-storm-surge-forecast-data",
        }
    }
}

/// The six rendered layers, in install (bottom to top) order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackLayer {
    PathObserved,
    PathForecast,
    PointsObserved,
    PointsForecast,
    SurgeObserved,
    SurgeForecast,
}

impl TrackLayer {
    pub const ALL: [TrackLayer; 6] = [
        TrackLayer::PathObserved,
        TrackLayer::PathForecast,
        TrackLayer::PointsObserved,
        TrackLayer::PointsForecast,
        TrackLayer::SurgeObserved,
        TrackLayer::SurgeForecast,
    ];

    /// Layers that open popups and change the cursor.
    pub const INTERACTIVE: [TrackLayer; 2] = [TrackLayer::PointsObserved, TrackLayer::PointsForecast];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.id() == id)
    }

    pub fn source(self) -> TrackSource {
        match self {
            TrackLayer::PathObserved | TrackLayer::PointsObserved => TrackSource::Observed,
            TrackLayer::PathForecast | TrackLayer::PointsForecast => TrackSource::Forecast,
            TrackLayer::SurgeObserved => TrackSource::SurgeObserved,
            TrackLayer::SurgeForecast => TrackSource::SurgeForecast,
        }
    }

    /// Geometry filter. Surge sources only hold rings, so they need none.
    pub fn filter(self) -> Option<GeometryKind> {
        match self {
            TrackLayer::PathObserved | TrackLayer::PathForecast => Some(GeometryKind::LineString),
            TrackLayer::PointsObserved | TrackLayer::PointsForecast => Some(GeometryKind::Point),
            TrackLayer::SurgeObserved | TrackLayer::SurgeForecast => None,
        }
    }

    pub fn symbology(self) -> Symbology {
        match self {
            TrackLayer::PathObserved => Symbology::Line(symbology::OBSERVED_PATH),
            TrackLayer::PathForecast => Symbology::Line(symbology::FORECAST_PATH),
            TrackLayer::PointsObserved => Symbology::Circle(symbology::OBSERVED_POINTS),
            TrackLayer::PointsForecast => Symbology::Circle(symbology::FORECAST_POINTS),
            TrackLayer::SurgeObserved | TrackLayer::SurgeForecast => {
                Symbology::Line(symbology::SURGE_RING)
            }
        }
    }

    pub fn is_interactive(self) -> bool {
        Self::INTERACTIVE.contains(&self)
    }

    pub fn spec(self) -> LayerSpec {
        let symbology = self.symbology();
        LayerSpec {
            id: self.id(),
            kind: symbology.kind(),
            source: self.source().id(),
            filter: self.filter(),
            layout: symbology.layout(),
            paint: symbology.paint(),
        }
    }
}

impl Resource for TrackLayer {
    fn id(self) -> &'static str {
        match self {
            TrackLayer::PathObserved => "typhoon-path-observed",
            TrackLayer::PathForecast => "typhoon-path-forecast",
            TrackLayer::PointsObserved => "typhoon-points-observed",
            TrackLayer::PointsForecast => "typhoon-points-forecast",
            TrackLayer::SurgeObserved => "typhoon-storm-surge-observed",
            TrackLayer::SurgeForecast => "typhoon-storm-surge-forecast",
        }
    }
}
