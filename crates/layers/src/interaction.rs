//! Popup and cursor behavior for the point layers as a pure state machine.
//!
//! Handlers return [`Effect`]s instead of touching the map, so the click and
//! hover rules are testable without a rendering surface.

use foundation::LngLat;
use foundation::math::unwrap_lng_toward;

use crate::layer::TrackLayer;
use crate::surface::Cursor;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    Closed,
    Open { at: LngLat, html: String },
}

/// The topmost feature under a click.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureHit {
    pub coordinates: LngLat,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Click {
        layer: TrackLayer,
        at: LngLat,
        hit: Option<FeatureHit>,
    },
    Enter {
        layer: TrackLayer,
    },
    Leave {
        layer: TrackLayer,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ClosePopup,
    OpenPopup { at: LngLat, html: String },
    SetCursor(Cursor),
}

/// One shared popup and the canvas cursor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    popup: PopupState,
    cursor: Cursor,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Forget a popup the user dismissed with its own close button.
    pub fn sync_popup(&mut self, surface_open: bool) {
        if !surface_open {
            self.popup = PopupState::Closed;
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> Vec<Effect> {
        match event {
            PointerEvent::Click { layer, at, hit } => {
                let Some(hit) = hit.filter(|_| layer.is_interactive()) else {
                    return Vec::new();
                };
                self.click(at, hit)
            }
            PointerEvent::Enter { layer } if layer.is_interactive() => {
                self.cursor = Cursor::Pointer;
                vec![Effect::SetCursor(Cursor::Pointer)]
            }
            PointerEvent::Leave { layer } if layer.is_interactive() => {
                self.cursor = Cursor::Default;
                vec![Effect::SetCursor(Cursor::Default)]
            }
            PointerEvent::Enter { .. } | PointerEvent::Leave { .. } => Vec::new(),
        }
    }

    fn click(&mut self, at: LngLat, hit: FeatureHit) -> Vec<Effect> {
        let mut effects = self.close();
        let anchor = LngLat::new(unwrap_lng_toward(hit.coordinates.lng, at.lng), hit.coordinates.lat);
        self.popup = PopupState::Open {
            at: anchor,
            html: hit.description.clone(),
        };
        effects.push(Effect::OpenPopup {
            at: anchor,
            html: hit.description,
        });
        effects
    }

    /// Close the popup if it is open.
    pub fn close(&mut self) -> Vec<Effect> {
        match std::mem::take(&mut self.popup) {
            PopupState::Open { .. } => vec![Effect::ClosePopup],
            PopupState::Closed => Vec::new(),
        }
    }

    /// State after the point layers were torn down: no popup and no hover.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = self.close();
        if self.cursor != Cursor::Default {
            self.cursor = Cursor::Default;
            effects.push(Effect::SetCursor(Cursor::Default));
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::{Effect, FeatureHit, InteractionState, PointerEvent, PopupState};
    use crate::layer::TrackLayer;
    use crate::surface::Cursor;
    use foundation::LngLat;
    use pretty_assertions::assert_eq;

    fn click(layer: TrackLayer, click_lng: f64, feature_lng: f64) -> PointerEvent {
        PointerEvent::Click {
            layer,
            at: LngLat::new(click_lng, 20.0),
            hit: Some(FeatureHit {
                coordinates: LngLat::new(feature_lng, 20.0),
                description: "<div>fix</div>".to_string(),
            }),
        }
    }

    #[test]
    fn click_opens_popup_at_feature() {
        let mut s = InteractionState::new();
        let effects = s.handle(click(TrackLayer::PointsObserved, 121.4, 121.5));
        assert_eq!(
            effects,
            vec![Effect::OpenPopup {
                at: LngLat::new(121.5, 20.0),
                html: "<div>fix</div>".to_string(),
            }]
        );
    }

    #[test]
    fn second_click_closes_first_popup() {
        let mut s = InteractionState::new();
        s.handle(click(TrackLayer::PointsObserved, 121.0, 121.0));
        let effects = s.handle(click(TrackLayer::PointsForecast, 122.0, 122.0));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect::ClosePopup);
        assert!(matches!(effects[1], Effect::OpenPopup { .. }));
    }

    #[test]
    fn popup_anchor_follows_click_across_antimeridian() {
        let mut s = InteractionState::new();
        s.handle(click(TrackLayer::PointsForecast, -179.9, 179.9));
        match s.popup() {
            PopupState::Open { at, .. } => assert!((at.lng - -180.1).abs() < 1e-9),
            PopupState::Closed => panic!("popup should be open"),
        }
    }

    #[test]
    fn hover_toggles_cursor() {
        let mut s = InteractionState::new();
        assert_eq!(
            s.handle(PointerEvent::Enter { layer: TrackLayer::PointsObserved }),
            vec![Effect::SetCursor(Cursor::Pointer)]
        );
        assert_eq!(s.cursor(), Cursor::Pointer);
        s.handle(PointerEvent::Leave { layer: TrackLayer::PointsObserved });
        assert_eq!(s.cursor(), Cursor::Default);
    }

    #[test]
    fn non_point_layers_are_inert() {
        let mut s = InteractionState::new();
        assert!(s.handle(click(TrackLayer::PathObserved, 1.0, 1.0)).is_empty());
        assert!(s.handle(PointerEvent::Enter { layer: TrackLayer::SurgeForecast }).is_empty());
        let miss = PointerEvent::Click {
            layer: TrackLayer::PointsObserved,
            at: LngLat::new(0.0, 0.0),
            hit: None,
        };
        assert!(s.handle(miss).is_empty());
    }

    #[test]
    fn externally_dismissed_popup_is_not_closed_again() {
        let mut s = InteractionState::new();
        s.handle(click(TrackLayer::PointsObserved, 1.0, 1.0));
        s.sync_popup(false);
        let effects = s.handle(click(TrackLayer::PointsObserved, 2.0, 2.0));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn reset_clears_popup_and_cursor() {
        let mut s = InteractionState::new();
        s.handle(PointerEvent::Enter { layer: TrackLayer::PointsObserved });
        s.handle(click(TrackLayer::PointsObserved, 1.0, 1.0));
        assert_eq!(
            s.reset(),
            vec![Effect::ClosePopup, Effect::SetCursor(Cursor::Default)]
        );
        assert_eq!(s.popup(), &PopupState::Closed);
    }
}
