// geo_utils.rs
use crate::error_utils::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Plain polygon rings: each ring is a closed sequence of
/// `[longitude, latitude]` positions, outer ring first.
pub type Rings = Vec<Vec<[f64; 2]>>;

/// Region outline, flattened out of GeoJSON into plain serializable
/// vectors so no consumer ever sees a library-specific geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionShape {
    Polygon(Rings),
    MultiPolygon(Vec<Rings>),
}

/// A named region outline. `name` is the exact-match join key against
/// `MuseumRecord::region`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub name: String,
    pub shape: RegionShape,
}

/// Represents the set of region outlines loaded once from the GeoJSON
/// file, in file order.
#[derive(Debug, Clone)]
pub struct RegionGeometrySet {
    geometries: Vec<RegionGeometry>,
}

impl RegionGeometrySet {
    /// Reads a GeoJSON FeatureCollection from `file_path`. Unreadable file
    /// or malformed GeoJSON is fatal; there is no degraded mode.
    pub fn from_geojson_file(file_path: &str) -> PipelineResult<Self> {
        let path = Path::new(file_path);
        let raw = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(&raw)
    }

    /// Parses a GeoJSON FeatureCollection. Each feature must carry a `nom`
    /// (or `name`) string property and a Polygon or MultiPolygon geometry.
    ///
    /// ```
    /// use museefr::geo_utils::RegionGeometrySet;
    ///
    /// let raw = r#"{"type":"FeatureCollection","features":[
    ///   {"type":"Feature","properties":{"nom":"Bretagne"},
    ///    "geometry":{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]}}
    /// ]}"#;
    /// let set = RegionGeometrySet::from_geojson_str(raw).unwrap();
    /// assert_eq!(set.geometries()[0].name, "Bretagne");
    /// ```
    pub fn from_geojson_str(raw: &str) -> PipelineResult<Self> {
        let root: Value = serde_json::from_str(raw)?;

        if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(PipelineError::Geometry(
                "root object is not a FeatureCollection".to_string(),
            ));
        }

        let features = root
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| PipelineError::Geometry("missing 'features' array".to_string()))?;

        let mut geometries = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            geometries.push(parse_feature(feature).map_err(|msg| {
                PipelineError::Geometry(format!("feature {}: {}", idx, msg))
            })?);
        }

        Ok(RegionGeometrySet { geometries })
    }

    pub fn from_geometries(geometries: Vec<RegionGeometry>) -> Self {
        RegionGeometrySet { geometries }
    }

    pub fn geometries(&self) -> &[RegionGeometry] {
        &self.geometries
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Region names in file order.
    pub fn names(&self) -> Vec<String> {
        self.geometries.iter().map(|g| g.name.clone()).collect()
    }
}

fn parse_feature(feature: &Value) -> Result<RegionGeometry, String> {
    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .ok_or("missing 'properties' object")?;

    // The French regions file names its join key 'nom'; 'name' is accepted
    // for datasets published in English.
    let name = properties
        .get("nom")
        .or_else(|| properties.get("name"))
        .and_then(Value::as_str)
        .ok_or("missing 'nom'/'name' property")?
        .to_string();

    let geometry = feature.get("geometry").ok_or("missing 'geometry'")?;
    let coordinates = geometry.get("coordinates").ok_or("missing 'coordinates'")?;

    let shape = match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => RegionShape::Polygon(parse_rings(coordinates)?),
        Some("MultiPolygon") => {
            let polygons = coordinates
                .as_array()
                .ok_or("MultiPolygon coordinates are not an array")?
                .iter()
                .map(parse_rings)
                .collect::<Result<Vec<Rings>, String>>()?;
            RegionShape::MultiPolygon(polygons)
        }
        Some(other) => return Err(format!("unsupported geometry type '{}'", other)),
        None => return Err("missing geometry type".to_string()),
    };

    Ok(RegionGeometry { name, shape })
}

fn parse_rings(coordinates: &Value) -> Result<Rings, String> {
    coordinates
        .as_array()
        .ok_or("Polygon coordinates are not an array")?
        .iter()
        .map(|ring| {
            ring.as_array()
                .ok_or_else(|| "ring is not an array".to_string())?
                .iter()
                .map(parse_position)
                .collect::<Result<Vec<[f64; 2]>, String>>()
        })
        .collect()
}

fn parse_position(position: &Value) -> Result<[f64; 2], String> {
    let pair = position
        .as_array()
        .ok_or_else(|| "position is not an array".to_string())?;
    if pair.len() < 2 {
        return Err("position has fewer than two coordinates".to_string());
    }
    let lon = pair[0]
        .as_f64()
        .ok_or_else(|| "longitude is not a number".to_string())?;
    let lat = pair[1]
        .as_f64()
        .ok_or_else(|| "latitude is not a number".to_string())?;
    Ok([lon, lat])
}
