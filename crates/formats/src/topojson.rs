//! TopoJSON decoding for world-atlas style boundary documents.
//!
//! A topology stores shared borders once as "arcs"; polygons reference arcs
//! by index, with a negative index `!i` meaning arc `i` walked backwards.
//! Quantized topologies carry a `transform` and delta-encode arc positions.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::boundary::{BoundaryFeature, BoundaryGeometry, GeoPoint, Ring, feature_id};

/// Object name preferred when a topology carries several collections.
pub const COUNTRIES_OBJECT: &str = "countries";

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("expected TopoJSON Topology: {0}")]
    NotATopology(String),
    #[error("topology has no objects")]
    NoObjects,
    #[error("arc index {index} out of range ({len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },
    #[error("invalid geometry at index {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: Map<String, Value>,
}

/// Decodes the country collection of a topology into boundary features.
///
/// Uses the `countries` object when present, otherwise the first object.
pub fn topology_features(value: Value) -> Result<Vec<BoundaryFeature>, TopologyError> {
    let topo: Topology =
        serde_json::from_value(value).map_err(|e| TopologyError::NotATopology(e.to_string()))?;
    if topo.kind != "Topology" {
        return Err(TopologyError::NotATopology(format!(
            "unexpected type {}",
            topo.kind
        )));
    }

    let arcs = decode_arcs(&topo.arcs, topo.transform);
    let object = topo
        .objects
        .get(COUNTRIES_OBJECT)
        .or_else(|| topo.objects.values().next())
        .ok_or(TopologyError::NoObjects)?;

    let geometries: Vec<&Value> = match object.get("type").and_then(|v| v.as_str()) {
        Some("GeometryCollection") => object
            .get("geometries")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().collect())
            .unwrap_or_default(),
        _ => vec![object],
    };

    let mut features = Vec::with_capacity(geometries.len());
    for (index, geom) in geometries.into_iter().enumerate() {
        let properties = geom
            .get("properties")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();
        let geometry = decode_geometry(geom, &arcs).map_err(|e| match e {
            DecodeError::Arc(index, len) => TopologyError::ArcOutOfRange { index, len },
            DecodeError::Shape(reason) => TopologyError::InvalidGeometry { index, reason },
        })?;
        features.push(BoundaryFeature::new(
            feature_id(geom.get("id")),
            properties,
            geometry,
        ));
    }
    Ok(features)
}

enum DecodeError {
    Arc(i64, usize),
    Shape(String),
}

fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Vec<Vec<GeoPoint>> {
    raw.iter()
        .map(|arc| {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| match transform {
                    Some(t) => {
                        x += pos[0];
                        y += pos[1];
                        GeoPoint::new(
                            x * t.scale[0] + t.translate[0],
                            y * t.scale[1] + t.translate[1],
                        )
                    }
                    None => GeoPoint::new(pos[0], pos[1]),
                })
                .collect()
        })
        .collect()
}

fn decode_geometry(geom: &Value, arcs: &[Vec<GeoPoint>]) -> Result<BoundaryGeometry, DecodeError> {
    let ty = geom.get("type").and_then(|v| v.as_str());
    let refs = geom.get("arcs");
    match (ty, refs) {
        (None, _) | (Some(_), None) => Ok(BoundaryGeometry::Empty),
        (Some("Polygon"), Some(refs)) => Ok(BoundaryGeometry::Polygon(polygon(refs, arcs)?)),
        (Some("MultiPolygon"), Some(refs)) => {
            let polys = refs
                .as_array()
                .ok_or_else(|| DecodeError::Shape("MultiPolygon arcs must be an array".into()))?;
            let decoded = polys
                .iter()
                .map(|p| polygon(p, arcs))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BoundaryGeometry::MultiPolygon(decoded))
        }
        (Some(other), Some(_)) => Err(DecodeError::Shape(format!(
            "boundary geometry must be areal, got {other}"
        ))),
    }
}

fn polygon(refs: &Value, arcs: &[Vec<GeoPoint>]) -> Result<Vec<Ring>, DecodeError> {
    let rings = refs
        .as_array()
        .ok_or_else(|| DecodeError::Shape("Polygon arcs must be an array of rings".into()))?;
    rings.iter().map(|r| ring(r, arcs)).collect()
}

fn ring(refs: &Value, arcs: &[Vec<GeoPoint>]) -> Result<Ring, DecodeError> {
    let indices = refs
        .as_array()
        .ok_or_else(|| DecodeError::Shape("ring must be an array of arc indices".into()))?;

    let mut out: Ring = Vec::new();
    for idx in indices {
        let i = idx
            .as_i64()
            .ok_or_else(|| DecodeError::Shape("arc index must be an integer".into()))?;
        let (arc_index, reversed) = if i < 0 { (!i, true) } else { (i, false) };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|a| arcs.get(a))
            .ok_or(DecodeError::Arc(i, arcs.len()))?;

        let points: Box<dyn Iterator<Item = &GeoPoint>> = if reversed {
            Box::new(arc.iter().rev())
        } else {
            Box::new(arc.iter())
        };
        // Consecutive arcs share their joining vertex.
        let skip = usize::from(!out.is_empty());
        out.extend(points.skip(skip).copied());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{TopologyError, topology_features};
    use crate::boundary::{BoundaryGeometry, GeoPoint};
    use pretty_assertions::assert_eq;

    #[test]
    fn stitches_shared_arcs_with_reversal() {
        // Two unit squares sharing the edge x=1, stored once as arc 1.
        let topo = serde_json::json!({
            "type": "Topology",
            "arcs": [
                [[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
                [[1.0, 0.0], [1.0, 1.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 0.0], [1.0, 0.0]]
            ],
            "objects": {"countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[0, -2]], "id": "001", "properties": {"name": "West"}},
                {"type": "Polygon", "arcs": [[2, 1]], "properties": {"name": "East"}}
            ]}}
        });

        let features = topology_features(topo).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id.as_deref(), Some("001"));

        let BoundaryGeometry::Polygon(west) = &features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(
            west[0],
            vec![
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0, 1.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.0, 0.0),
            ]
        );

        let BoundaryGeometry::Polygon(east) = &features[1].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(east[0].len(), 5);
        assert_eq!(east[0][4], GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn applies_quantization_transform() {
        let topo = serde_json::json!({
            "type": "Topology",
            "transform": {"scale": [0.5, 0.25], "translate": [-10.0, 20.0]},
            "arcs": [[[0, 0], [4, 0], [0, 4], [-4, -4]]],
            "objects": {"land": {"type": "Polygon", "arcs": [[0]], "properties": {"NAME": "Box"}}}
        });

        let features = topology_features(topo).unwrap();
        assert_eq!(features[0].name, "Box");
        let BoundaryGeometry::Polygon(rings) = &features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0][1], GeoPoint::new(-8.0, 20.0));
        assert_eq!(rings[0][2], GeoPoint::new(-8.0, 21.0));
        assert_eq!(rings[0][3], GeoPoint::new(-10.0, 20.0));
    }

    #[test]
    fn null_geometry_is_kept_as_empty() {
        let topo = serde_json::json!({
            "type": "Topology", "arcs": [],
            "objects": {"countries": {"type": "GeometryCollection", "geometries": [
                {"type": null, "properties": {"name": "Nowhere"}}
            ]}}
        });
        let features = topology_features(topo).unwrap();
        assert_eq!(features[0].geometry, BoundaryGeometry::Empty);
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let topo = serde_json::json!({
            "type": "Topology", "arcs": [],
            "objects": {"countries": {"type": "Polygon", "arcs": [[3]]}}
        });
        assert!(matches!(
            topology_features(topo),
            Err(TopologyError::ArcOutOfRange { index: 3, len: 0 })
        ));
    }
}
