/// Geographic position in decimal degrees.
///
/// Field order follows the map convention (`[lng, lat]`), which is the reverse
/// of how fixes are usually written.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Builds a position from latitude-first input, the order data feeds use.
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        p.as_array()
    }
}
