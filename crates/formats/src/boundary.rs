use foundation::{LonLatBounds, centroid_lon_lat};
use serde_json::{Map, Value};

/// Property keys that may carry a boundary's display name, in priority order.
pub const NAME_KEYS: [&str; 4] = ["NAME", "name", "ADMIN", "NAME_EN"];

/// Display name used when none of [`NAME_KEYS`] is present.
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

/// Natural Earth writes `-99` where an ISO code does not exist.
const MISSING_CODE: &str = "-99";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// A closed ring of points; the first ring of a polygon is its outer shell.
pub type Ring = Vec<GeoPoint>;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// Features whose geometry is `null` in the source document.
    Empty,
}

impl BoundaryGeometry {
    /// Every polygon as a slice of rings, outer ring first.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            BoundaryGeometry::Polygon(rings) => vec![rings.as_slice()],
            BoundaryGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
            BoundaryGeometry::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons()
            .iter()
            .all(|rings| rings.first().is_none_or(|outer| outer.is_empty()))
    }

    pub fn to_geojson_value(&self) -> Value {
        match self {
            BoundaryGeometry::Polygon(rings) => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::String("Polygon".to_string()));
                obj.insert("coordinates".to_string(), rings_coords(rings));
                Value::Object(obj)
            }
            BoundaryGeometry::MultiPolygon(polys) => {
                let mut obj = Map::new();
                obj.insert(
                    "type".to_string(),
                    Value::String("MultiPolygon".to_string()),
                );
                let coords = polys.iter().map(|rings| rings_coords(rings)).collect();
                obj.insert("coordinates".to_string(), Value::Array(coords));
                Value::Object(obj)
            }
            BoundaryGeometry::Empty => Value::Null,
        }
    }
}

/// One country shape from the world-boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub id: Option<String>,
    /// Display name taken from the first non-empty [`NAME_KEYS`] property.
    pub name: String,
    pub iso_a2: Option<String>,
    pub iso_a3: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: BoundaryGeometry,
}

impl BoundaryFeature {
    pub fn new(
        id: Option<String>,
        properties: Map<String, Value>,
        geometry: BoundaryGeometry,
    ) -> Self {
        let name = display_name(&properties);
        let iso_a3 = code_property(&properties, &["ISO_A3", "ADM0_A3"]);
        let iso_a2 = code_property(&properties, &["ISO_A2"]);
        Self {
            id,
            name,
            iso_a2,
            iso_a3,
            properties,
            geometry,
        }
    }

    pub fn bounds(&self) -> LonLatBounds {
        let mut b = LonLatBounds::empty();
        for rings in self.geometry.polygons() {
            if let Some(outer) = rings.first() {
                for p in outer {
                    b.extend(p.lon_deg, p.lat_deg);
                }
            }
        }
        b
    }

    /// Centroid of the largest polygon's outer ring.
    ///
    /// Overseas territories stay out of the average, so France anchors in
    /// Europe rather than somewhere in the Atlantic.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let outer = self
            .geometry
            .polygons()
            .into_iter()
            .filter_map(|rings| rings.first())
            .max_by(|a, b| planar_area(a).total_cmp(&planar_area(b)))?;
        // Closed rings repeat the first vertex; drop it so it is not double-weighted.
        let open = match (outer.first(), outer.last()) {
            (Some(f), Some(l)) if outer.len() > 1 && f == l => &outer[..outer.len() - 1],
            _ => &outer[..],
        };
        centroid_lon_lat(open.iter().map(|p| (p.lon_deg, p.lat_deg)))
    }

    /// GeoJSON `Feature` with the original properties plus the resolved `name`.
    pub fn to_geojson_value(&self) -> Value {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        if let Some(id) = &self.id {
            fobj.insert("id".to_string(), Value::String(id.clone()));
        }
        let mut props = self.properties.clone();
        props.insert("name".to_string(), Value::String(self.name.clone()));
        fobj.insert("properties".to_string(), Value::Object(props));
        fobj.insert("geometry".to_string(), self.geometry.to_geojson_value());
        Value::Object(fobj)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
    #[error(transparent)]
    Topology(#[from] crate::topojson::TopologyError),
}

pub fn boundaries_from_geojson_str(payload: &str) -> Result<Vec<BoundaryFeature>, BoundaryError> {
    let value: Value = serde_json::from_str(payload)?;
    boundaries_from_geojson_value(value)
}

pub fn boundaries_from_geojson_value(value: Value) -> Result<Vec<BoundaryFeature>, BoundaryError> {
    let obj = value
        .as_object()
        .ok_or(BoundaryError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(BoundaryError::NotAFeatureCollection)?;
    if ty != "FeatureCollection" {
        return Err(BoundaryError::NotAFeatureCollection);
    }

    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(BoundaryError::NotAFeatureCollection)?;

    let mut features = Vec::with_capacity(features_val.len());
    for (index, feat_val) in features_val.iter().enumerate() {
        let invalid = |reason: &str| BoundaryError::InvalidFeature {
            index,
            reason: reason.to_string(),
        };
        let feat_obj = feat_val
            .as_object()
            .ok_or_else(|| invalid("feature must be an object"))?;

        let feat_type = feat_obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid("feature missing type"))?;
        if feat_type != "Feature" {
            return Err(BoundaryError::InvalidFeature {
                index,
                reason: format!("unexpected feature type: {feat_type}"),
            });
        }

        let properties = feat_obj
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let geometry = match feat_obj.get("geometry") {
            None | Some(Value::Null) => BoundaryGeometry::Empty,
            Some(g) => parse_geometry(g)
                .map_err(|reason| BoundaryError::InvalidFeature { index, reason })?,
        };

        features.push(BoundaryFeature::new(
            feature_id(feat_obj.get("id")),
            properties,
            geometry,
        ));
    }

    Ok(features)
}

pub(crate) fn feature_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Display name from the first present, non-blank [`NAME_KEYS`] property.
pub fn display_name(properties: &Map<String, Value>) -> String {
    NAME_KEYS
        .iter()
        .filter_map(|key| properties.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_string()
}

fn code_property(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty() && *s != MISSING_CODE)
        .map(str::to_string)
}

fn planar_area(ring: &[GeoPoint]) -> f64 {
    let mut twice = 0.0;
    for w in ring.windows(2) {
        twice += w[0].lon_deg * w[1].lat_deg - w[1].lon_deg * w[0].lat_deg;
    }
    (twice * 0.5).abs()
}

fn rings_coords(rings: &[Ring]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
            .collect(),
    )
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn parse_geometry(value: &Value) -> Result<BoundaryGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(BoundaryGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(BoundaryGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("boundary geometry must be areal, got {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}
