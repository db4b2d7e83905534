/// Equatorial Earth radius used for the great-circle distance
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Great-circle distance between two latitude/longitude pairs (degrees), in meters.
///
/// Uses the haversine form: half-angle sine products for the latitude and
/// longitude deltas, combined through `atan2` for stability near antipodes.
pub fn distance_in_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
