use serde::{Deserialize, Serialize};

/// Longitude/latitude bounding box in degrees.
///
/// A box built from an empty point set is "empty" and contains nothing.
/// Boxes are not antimeridian-aware: a polygon that crosses 180° gets a box
/// spanning the whole longitude range, which is still a valid prefilter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLatBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl LonLatBounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        LonLatBounds {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn empty() -> Self {
        LonLatBounds {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        !self.is_empty()
            && lon >= self.min_lon
            && lon <= self.max_lon
            && lat >= self.min_lat
            && lat <= self.max_lat
    }
}

impl Default for LonLatBounds {
    fn default() -> Self {
        Self::empty()
    }
}
