use foundation::{CountryId, LonLatBounds};
use formats::{BoundaryFeature, GeoPoint, Ring};
use tracing::debug;

struct PickEntry {
    id: CountryId,
    bounds: LonLatBounds,
    polygons: Vec<Vec<Ring>>,
}

/// Point-in-country lookup over boundary polygons.
///
/// Ordering contract:
/// - If several countries contain the point, the lower `CountryId::index()` wins.
///
/// Notes:
/// - Longitudes are wrapped into `[-180, 180]` before testing.
/// - Rings are tested with the even-odd rule per polygon, so holes
///   (enclaves such as Lesotho inside South Africa) are respected.
/// - Countries with empty geometry never match.
pub struct PickIndex {
    entries: Vec<PickEntry>,
}

impl PickIndex {
    /// Builds the index; `CountryId`s are positions in `boundaries`.
    pub fn build(boundaries: &[BoundaryFeature]) -> Self {
        let entries = boundaries
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.geometry.is_empty())
            .map(|(i, b)| PickEntry {
                id: CountryId::from_usize(i),
                bounds: b.bounds(),
                polygons: b
                    .geometry
                    .polygons()
                    .into_iter()
                    .map(|rings| rings.to_vec())
                    .collect(),
            })
            .collect::<Vec<_>>();
        debug!(countries = entries.len(), "pick index built");
        Self { entries }
    }

    pub fn pick(&self, lon_deg: f64, lat_deg: f64) -> Option<CountryId> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return None;
        }
        let lon = wrap_lon(lon_deg);
        self.entries
            .iter()
            .filter(|e| e.bounds.contains(lon, lat_deg))
            .find(|e| {
                e.polygons
                    .iter()
                    .any(|rings| polygon_contains(rings, lon, lat_deg))
            })
            .map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn wrap_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

fn polygon_contains(rings: &[Ring], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring_crossings_odd(ring, lon, lat) {
            inside = !inside;
        }
    }
    inside
}

fn ring_crossings_odd(ring: &[GeoPoint], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut odd = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat_deg > y) != (b.lat_deg > y) {
            let t = (y - a.lat_deg) / (b.lat_deg - a.lat_deg);
            if x < a.lon_deg + t * (b.lon_deg - a.lon_deg) {
                odd = !odd;
            }
        }
        j = i;
    }
    odd
}
