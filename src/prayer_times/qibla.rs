use crate::prayer_times::Coordinates;

/// The Kaaba in Makkah.
pub const KAABA: Coordinates = Coordinates {
    latitude: 21.4225,
    longitude: 39.8262,
};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Initial great-circle bearing from `from` to the Kaaba, degrees clockwise from true north in `[0, 360)`.
pub fn qibla_bearing(from: Coordinates) -> f64 {
    let phi = from.latitude.to_radians();
    let phi_k = KAABA.latitude.to_radians();
    let delta_lambda = KAABA.longitude.to_radians() - from.longitude.to_radians();

    let y = delta_lambda.sin();
    let x = phi.cos() * phi_k.tan() - phi.sin() * delta_lambda.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// 16-wind compass label for a bearing, e.g. `WNW`.
pub fn compass_point(bearing: f64) -> &'static str {
    let index = ((bearing.rem_euclid(360.0) / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.05,
            "expected {expected:.2}, got {actual:.2}"
        );
    }

    #[test]
    fn known_city_bearings() {
        assert_close(qibla_bearing(Coordinates::new(51.5074, -0.1278)), 118.99);
        assert_close(qibla_bearing(Coordinates::new(40.7128, -74.0060)), 58.48);
    }

    #[test]
    fn due_north_and_south_on_the_kaaba_meridian() {
        assert_close(qibla_bearing(Coordinates::new(0.0, KAABA.longitude)), 0.0);
        assert_close(qibla_bearing(Coordinates::new(50.0, KAABA.longitude)), 180.0);
    }

    #[test]
    fn bearing_stays_in_range() {
        for (lat, lon) in [(-33.86, 151.21), (12.97, 77.59), (64.0, -150.0), (-54.8, -68.3)] {
            let bearing = qibla_bearing(Coordinates::new(lat, lon));
            assert!((0.0..360.0).contains(&bearing), "{bearing} out of range");
        }
    }

    #[test]
    fn compass_labels() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(118.99), "ESE");
        assert_eq!(compass_point(292.0), "WNW");
    }
}
