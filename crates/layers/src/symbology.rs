use serde_json::{Value, json};

use crate::surface::LayerKind;

/// Stroke style for path and ring layers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
    pub opacity: Option<f64>,
    pub dash: Option<[f64; 2]>,
    /// Round joins and caps.
    pub rounded: bool,
}

/// Marker style for point layers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleStyle {
    pub radius: f64,
    pub color: &'static str,
    pub stroke_width: f64,
    pub stroke_color: &'static str,
}

pub const OBSERVED_PATH: LineStyle = LineStyle {
    color: "#FF0000",
    width: 4.0,
    opacity: Some(0.8),
    dash: None,
    rounded: true,
};

pub const FORECAST_PATH: LineStyle = LineStyle {
    color: "#FF8080",
    width: 4.0,
    opacity: Some(0.8),
    dash: Some([1.0, 2.0]),
    rounded: true,
};

pub const SURGE_RING: LineStyle = LineStyle {
    color: "#ffffff",
    width: 2.0,
    opacity: None,
    dash: Some([2.0, 2.0]),
    rounded: false,
};

pub const OBSERVED_POINTS: CircleStyle = CircleStyle {
    radius: 8.0,
    color: "#3498db",
    stroke_width: 2.0,
    stroke_color: "#ffffff",
};

pub const FORECAST_POINTS: CircleStyle = CircleStyle {
    radius: 7.0,
    color: "#e67e22",
    stroke_width: 2.0,
    stroke_color: "#ffffff",
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Symbology {
    Line(LineStyle),
    Circle(CircleStyle),
}

impl Symbology {
    pub fn kind(&self) -> LayerKind {
        match self {
            Symbology::Line(_) => LayerKind::Line,
            Symbology::Circle(_) => LayerKind::Circle,
        }
    }

    pub fn layout(&self) -> Value {
        match self {
            Symbology::Line(s) if s.rounded => json!({
                "line-join": "round",
                "line-cap": "round",
            }),
            _ => json!({}),
        }
    }

    pub fn paint(&self) -> Value {
        match self {
            Symbology::Line(s) => {
                let mut paint = json!({
                    "line-color": s.color,
                    "line-width": s.width,
                });
                if let Some(opacity) = s.opacity {
                    paint["line-opacity"] = json!(opacity);
                }
                if let Some(dash) = s.dash {
                    paint["line-dasharray"] = json!(dash);
                }
                paint
            }
            Symbology::Circle(s) => json!({
                "circle-radius": s.radius,
                "circle-color": s.color,
                "circle-stroke-width": s.stroke_width,
                "circle-stroke-color": s.stroke_color,
            }),
        }
    }
}
