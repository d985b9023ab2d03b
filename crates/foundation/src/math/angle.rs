//! Longitude arithmetic on the `[-180, 180)` circle.

/// Wraps a longitude in degrees into `[-180, 180)`.
#[inline]
pub fn normalize_longitude(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can land exactly on 360.0 for tiny negative inputs.
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Returns the shortest signed delta from `from` to `to`, in `[-180, 180)`.
#[inline]
pub fn shortest_longitude_delta(from: f64, to: f64) -> f64 {
    normalize_longitude(to - from)
}

/// Interpolates longitude along the shorter arc and re-wraps the result.
#[inline]
pub fn lerp_longitude(from: f64, to: f64, t: f64) -> f64 {
    normalize_longitude(from + shortest_longitude_delta(from, to) * t)
}
