use crate::math::LngLat;

/// Running lon/lat extent of every position seen so far.
///
/// Starts empty; `extend` widens it. No antimeridian handling: a set of points
/// straddling 180 degrees yields a box spanning the whole globe.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LngLatBounds {
    extent: Option<(LngLat, LngLat)>,
}

impl LngLatBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.extent.is_none()
    }

    pub fn extend(&mut self, p: LngLat) {
        self.extent = Some(match self.extent {
            None => (p, p),
            Some((min, max)) => (
                LngLat::new(min.lng.min(p.lng), min.lat.min(p.lat)),
                LngLat::new(max.lng.max(p.lng), max.lat.max(p.lat)),
            ),
        });
    }

    pub fn min(&self) -> Option<LngLat> {
        self.extent.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<LngLat> {
        self.extent.map(|(_, max)| max)
    }

    /// `[[min_lng, min_lat], [max_lng, max_lat]]`, the shape map viewports take.
    pub fn to_box(&self) -> Option<[[f64; 2]; 2]> {
        self.extent
            .map(|(min, max)| [min.as_array(), max.as_array()])
    }
}

impl FromIterator<LngLat> for LngLatBounds {
    fn from_iter<I: IntoIterator<Item = LngLat>>(iter: I) -> Self {
        let mut b = Self::new();
        for p in iter {
            b.extend(p);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::LngLatBounds;
    use crate::math::LngLat;

    #[test]
    fn empty_has_no_box() {
        let b = LngLatBounds::new();
        assert!(b.is_empty());
        assert_eq!(b.to_box(), None);
    }

    #[test]
    fn box_covers_all_points() {
        let b: LngLatBounds = [
            LngLat::from_lat_lng(21.0, 120.0),
            LngLat::from_lat_lng(25.0, 122.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(b.to_box(), Some([[120.0, 21.0], [122.0, 25.0]]));
    }

    #[test]
    fn single_point_is_degenerate_box() {
        let mut b = LngLatBounds::new();
        b.extend(LngLat::new(121.5, 22.5));
        assert_eq!(b.min(), b.max());
    }
}
