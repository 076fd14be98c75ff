pub mod attributes;
pub mod boundary;
pub mod builtin;
pub mod topojson;

pub use attributes::*;
pub use boundary::*;
pub use builtin::*;
pub use topojson::*;

/// Decodes a boundary document, accepting either a GeoJSON
/// `FeatureCollection` or a TopoJSON `Topology`.
pub fn boundaries_from_str(payload: &str) -> Result<Vec<BoundaryFeature>, BoundaryError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let is_topology = value.get("type").and_then(|v| v.as_str()) == Some("Topology");
    if is_topology {
        Ok(topology_features(value)?)
    } else {
        boundaries_from_geojson_value(value)
    }
}
