//! GeoJSON polygon types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A position: `[longitude, latitude]`, optionally with more components.
pub type Position = Vec<f64>;

/// A closed linear ring.
pub type Ring = Vec<Position>;

/// A point to test against a polygon: `[longitude, latitude]`.
pub type Point = [f64; 2];

/// Polygon geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Outer ring followed by holes.
    Polygon { coordinates: Vec<Ring> },

    /// A list of polygons.
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    /// Flattens a MultiPolygon into a single Polygon holding every member's
    /// rings in order. A Polygon is returned unchanged.
    pub fn flattened(&self) -> Geometry {
        match self {
            Geometry::MultiPolygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.iter().flatten().cloned().collect(),
            },
            polygon @ Geometry::Polygon { .. } => polygon.clone(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Geometry::MultiPolygon { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

/// A geometry with optional identifier and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,

    pub geometry: Geometry,
}

impl Feature {
    /// Creates a feature without id or properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: FeatureTag::Feature,
            id: None,
            properties: None,
            geometry,
        }
    }

    /// Sets the feature id.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A list of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionTag,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionTag::FeatureCollection,
            features,
        }
    }
}

/// Any polygon-bearing GeoJSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoJson {
    Geometry(Geometry),
    Feature(Feature),
    FeatureCollection(FeatureCollection),
}

impl GeoJson {
    /// Feature id, if this is a feature that has one.
    pub fn id(&self) -> Option<&Value> {
        match self {
            GeoJson::Feature(feature) => feature.id.as_ref(),
            _ => None,
        }
    }

    /// Wraps a bare geometry into a feature; other shapes are kept.
    pub fn into_feature(self) -> GeoJson {
        match self {
            GeoJson::Geometry(geometry) => GeoJson::Feature(Feature::new(geometry)),
            other => other,
        }
    }
}

impl From<Geometry> for GeoJson {
    fn from(geometry: Geometry) -> Self {
        GeoJson::Geometry(geometry)
    }
}

impl From<Feature> for GeoJson {
    fn from(feature: Feature) -> Self {
        GeoJson::Feature(feature)
    }
}

impl From<FeatureCollection> for GeoJson {
    fn from(collection: FeatureCollection) -> Self {
        GeoJson::FeatureCollection(collection)
    }
}
