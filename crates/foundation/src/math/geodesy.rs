use super::LngLat;

/// Mean Earth radius (kilometers) used by the small-circle approximation.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// Vertices on an approximated circle, before the closing vertex.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Approximates a circle of `radius_km` around a center as a closed ring.
///
/// Returns `CIRCLE_SEGMENTS + 1` vertices in `[lng, lat]` order with the first
/// vertex repeated at the end, or `None` when the radius is not a positive
/// number.
///
/// Longitude offsets are scaled by `1 / cos(lat)`, so the ring stretches without
/// bound as the center approaches a pole. Radii of a few hundred kilometers at
/// mid-latitudes are the intended range.
pub fn circle_ring(center_lat_deg: f64, center_lng_deg: f64, radius_km: f64) -> Option<Vec<LngLat>> {
    if radius_km.is_nan() || radius_km <= 0.0 {
        return None;
    }

    let lat_scale = (radius_km / EARTH_MEAN_RADIUS_KM).to_degrees();
    let lng_scale =
        (radius_km / (EARTH_MEAN_RADIUS_KM * center_lat_deg.to_radians().cos())).to_degrees();

    let mut ring = Vec::with_capacity(CIRCLE_SEGMENTS + 1);
    for i in 0..CIRCLE_SEGMENTS {
        let theta = (i as f64 / CIRCLE_SEGMENTS as f64) * 2.0 * std::f64::consts::PI;
        ring.push(LngLat::new(
            center_lng_deg + lng_scale * theta.cos(),
            center_lat_deg + lat_scale * theta.sin(),
        ));
    }
    ring.push(ring[0]);
    Some(ring)
}

/// Shifts `feature_lng` by whole turns so it lies within 180 degrees of `click_lng`.
///
/// Produces the same value as repeatedly adding or subtracting 360 toward the
/// click until the gap is at most 180, but in constant time. The result keeps
/// the sign of the original gap: `(-180, 180]` when the click was east of the
/// feature, `[-180, 180)` when it was west. Non-finite input, or a gap too large
/// to represent, returns `feature_lng` as is.
pub fn unwrap_lng_toward(feature_lng: f64, click_lng: f64) -> f64 {
    if !feature_lng.is_finite() || !click_lng.is_finite() {
        return feature_lng;
    }

    let diff = click_lng - feature_lng;
    // Opposite-signed inputs near f64::MAX overflow the difference.
    if !diff.is_finite() || diff.abs() <= 180.0 {
        return feature_lng;
    }

    let turns = ((diff.abs() - 180.0) / 360.0).ceil();
    let mut lng = feature_lng + diff.signum() * turns * 360.0;

    // Rounding at large magnitudes can leave the gap one turn short.
    for _ in 0..2 {
        let gap = click_lng - lng;
        if gap.abs() <= 180.0 {
            break;
        }
        lng += gap.signum() * 360.0;
    }
    if lng.is_finite() { lng } else { feature_lng }
}
