//! Place node datasets (`<id>-nodes.geojson`).
//!
//! Each category publishes a GeoJSON FeatureCollection of Point features
//! whose properties are language-keyed labels. The raw document is kept
//! alongside the parsed view and handed to the renderer untouched, so
//! whatever extra detail the pipeline adds later survives the trip.

use serde_json::{Map, Value};

use foundation::{LngLat, LngLatBounds};

use crate::labels::LabelRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub labels: LabelRecord,
    pub position: LngLat,
}

#[derive(Debug)]
pub enum PlaceError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            PlaceError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for PlaceError {}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCollection {
    places: Vec<Place>,
    raw: Value,
}

impl PlaceCollection {
    /// An empty FeatureCollection, used to blank a source after a failed
    /// load or an invalidated selection.
    pub fn empty() -> Self {
        Self {
            places: Vec::new(),
            raw: empty_feature_collection(),
        }
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, PlaceError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| PlaceError::InvalidFeature {
                index: 0,
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::from_geojson_value(value)
    }

    /// Walks the FeatureCollection and extracts one [`Place`] per Point
    /// feature. Features with other geometry kinds stay in the raw document
    /// for the renderer but contribute no label or bounds data.
    pub fn from_geojson_value(value: Value) -> Result<Self, PlaceError> {
        let obj = value.as_object().ok_or(PlaceError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(PlaceError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(PlaceError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(PlaceError::NotAFeatureCollection)?;

        let mut places = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val.as_object().ok_or(PlaceError::InvalidFeature {
                index,
                reason: "feature must be an object".to_string(),
            })?;

            let feat_type = feat_obj.get("type").and_then(|v| v.as_str()).ok_or(
                PlaceError::InvalidFeature {
                    index,
                    reason: "feature missing type".to_string(),
                },
            )?;
            if feat_type != "Feature" {
                return Err(PlaceError::InvalidFeature {
                    index,
                    reason: format!("unexpected feature type: {feat_type}"),
                });
            }

            let Some(position) = point_position(feat_obj) else {
                continue;
            };

            let labels = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .map(LabelRecord::from_properties)
                .unwrap_or_default();

            places.push(Place { labels, position });
        }

        Ok(Self { places, raw: value })
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// The original document, for the renderer.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Extent of every finite position, or `None` for an empty collection.
    pub fn bounds(&self) -> Option<LngLatBounds> {
        LngLatBounds::from_points(self.places.iter().map(|p| p.position))
    }
}

fn point_position(feature: &Map<String, Value>) -> Option<LngLat> {
    let geometry = feature.get("geometry")?.as_object()?;
    if geometry.get("type")?.as_str()? != "Point" {
        return None;
    }
    let coords = geometry.get("coordinates")?.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    let lng = coords[0].as_f64()?;
    let lat = coords[1].as_f64()?;
    Some(LngLat::new(lng, lat))
}

fn empty_feature_collection() -> Value {
    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );
    root.insert("features".to_string(), Value::Array(Vec::new()));
    Value::Object(root)
}
