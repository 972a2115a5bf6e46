//! Vector data model: attribute values, features, feature collections.
//!
//! A [`FeatureCollection`] is an ordered sequence of [`Feature`] values with
//! an ordered attribute column list and a CRS. The positional index of a
//! feature within the collection is its stable identity; overlay operations
//! treat input collections as immutable and always build fresh outputs.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::crs::CRS;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// True for the explicit null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Geometry<f64>,
    /// Feature attributes, keyed by column name
    pub properties: HashMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with geometry and no attributes
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: HashMap::new(),
        }
    }

    /// Set an attribute
    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value.into());
        self
    }

    /// Get an attribute
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// True when the attribute is absent or the explicit null sentinel
    pub fn is_null(&self, key: &str) -> bool {
        self.get(key).map_or(true, AttributeValue::is_null)
    }
}

/// Ordered collection of features with a shared attribute schema and CRS.
///
/// `columns` lists the non-geometry attribute columns in order; the geometry
/// lives on each feature. A feature may omit a column, which reads as null.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    /// Ordered attribute column names
    pub columns: Vec<String>,
    /// Features in positional-identity order
    pub features: Vec<Feature>,
    /// Coordinate reference system of all geometries
    pub crs: CRS,
}

impl FeatureCollection {
    /// Create an empty collection with no attribute columns
    pub fn new(crs: CRS) -> Self {
        Self {
            columns: Vec::new(),
            features: Vec::new(),
            crs,
        }
    }

    /// Create an empty collection with the given attribute schema
    pub fn with_columns(crs: CRS, columns: Vec<String>) -> Self {
        Self {
            columns,
            features: Vec::new(),
            crs,
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// Human-readable geometry class name, used in type errors.
pub fn geometry_type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
