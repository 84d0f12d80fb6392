//! Link datasets (`<id>-links.geojson`).
//!
//! The pipeline publishes one geometry document per category connecting each
//! place to its parent, today a bare `MultiLineString`. The viewer never
//! inspects the coordinates; it validates the envelope and passes the
//! document straight to the renderer.

use serde_json::{Map, Value};

#[derive(Debug)]
pub enum LinkError {
    Json(String),
    NotGeoJson,
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::Json(reason) => write!(f, "JSON parse error: {reason}"),
            LinkError::NotGeoJson => write!(f, "expected a GeoJSON object with a type"),
        }
    }
}

impl std::error::Error for LinkError {}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDoc {
    raw: Value,
}

impl LinkDoc {
    /// A `MultiLineString` with no segments, used to blank the links source.
    pub fn empty() -> Self {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("MultiLineString".to_string()),
        );
        root.insert("coordinates".to_string(), Value::Array(Vec::new()));
        Self {
            raw: Value::Object(root),
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, LinkError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| LinkError::Json(e.to_string()))?;
        Self::from_json_value(value)
    }

    /// Accepts any GeoJSON object (geometry or FeatureCollection); the
    /// renderer copes with either.
    pub fn from_json_value(value: Value) -> Result<Self, LinkError> {
        let has_type = value
            .as_object()
            .and_then(|obj| obj.get("type"))
            .and_then(|v| v.as_str())
            .is_some();
        if !has_type {
            return Err(LinkError::NotGeoJson);
        }
        Ok(Self { raw: value })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_a_multi_line_string() {
        let payload = r#"{
            "type": "MultiLineString",
            "coordinates": [[[2.3, 48.8], [2.4, 48.9]]]
        }"#;
        let doc = LinkDoc::from_json_str(payload).expect("parse links");
        assert_eq!(doc.raw()["type"], "MultiLineString");
    }

    #[test]
    fn accepts_a_feature_collection() {
        let payload = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(LinkDoc::from_json_str(payload).is_ok());
    }

    #[test]
    fn rejects_typeless_documents() {
        assert!(LinkDoc::from_json_str(r#"{"coordinates": []}"#).is_err());
        assert!(LinkDoc::from_json_str("42").is_err());
    }

    #[test]
    fn empty_links_have_no_segments() {
        let empty = LinkDoc::empty();
        assert_eq!(empty.raw()["type"], "MultiLineString");
        assert_eq!(empty.raw()["coordinates"].as_array().unwrap().len(), 0);
    }
}
