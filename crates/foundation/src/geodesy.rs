/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Earth-centered, Earth-fixed Cartesian coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Surface point (altitude 0) for a longitude/latitude pair in degrees.
pub fn lon_lat_to_ecef(lon_deg: f64, lat_deg: f64) -> Ecef {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Ecef::new(
        n * cos_lat * lon.cos(),
        n * cos_lat * lon.sin(),
        n * (1.0 - WGS84_E2) * sin_lat,
    )
}

/// Longitude/latitude in degrees for an ECEF position (Bowring's method).
///
/// The altitude is discarded, so interior points project radially-ish onto
/// the ellipsoid. Returns `None` at the Earth's center where direction is undefined.
pub fn ecef_to_lon_lat(ecef: Ecef) -> Option<(f64, f64)> {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    if p < 1e-9 && ecef.z.abs() < 1e-9 {
        return None;
    }
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta.powi(3));

    Some((lon.to_degrees(), lat.to_degrees()))
}

/// Centroid of a set of lon/lat points, averaged in ECEF so that
/// rings straddling the antimeridian do not collapse towards 0°.
pub fn centroid_lon_lat<I>(points: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut sz = 0.0;
    let mut n = 0usize;
    for (lon, lat) in points {
        let e = lon_lat_to_ecef(lon, lat);
        sx += e.x;
        sy += e.y;
        sz += e.z;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = n as f64;
    ecef_to_lon_lat(Ecef::new(sx / n, sy / n, sz / n))
}

#[cfg(test)]
mod tests {
    use super::{WGS84_A, centroid_lon_lat, ecef_to_lon_lat, lon_lat_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_is_on_x_axis() {
        let e = lon_lat_to_ecef(0.0, 0.0);
        assert_close(e.x, WGS84_A, 1e-6);
        assert_close(e.y, 0.0, 1e-6);
        assert_close(e.z, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_lon_lat() {
        let (lon, lat) = ecef_to_lon_lat(lon_lat_to_ecef(-60.0, 30.0)).unwrap();
        assert_close(lon, -60.0, 1e-9);
        assert_close(lat, 30.0, 1e-9);
    }

    #[test]
    fn centroid_across_antimeridian() {
        let (lon, lat) = centroid_lon_lat([(179.0, 0.0), (-179.0, 0.0)]).unwrap();
        assert_close(lon.abs(), 180.0, 1e-6);
        assert_close(lat, 0.0, 1e-6);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert!(centroid_lon_lat(std::iter::empty()).is_none());
    }
}
