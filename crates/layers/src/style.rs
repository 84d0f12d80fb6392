//! Source names and layer definitions for the place-graph view.
//!
//! Paint and layout values follow the published style: grey coastline
//! background, light link lines that only appear once zoomed in, blue place
//! circles that grow with zoom, and optional halo'd labels.

use serde_json::{Value, json};

use crate::expr::label_expression;

pub const BACKGROUND_SOURCE: &str = "background";
pub const PLACES_SOURCE: &str = "places";
pub const LINKS_SOURCE: &str = "places_links";

pub const BACKGROUND_LAYER: &str = "background";
pub const LINKS_LAYER: &str = "links";
pub const PLACES_LAYER: &str = "places";
pub const LABELS_LAYER: &str = "labels";

/// Layers whose visible features are narrowed by the name filter.
pub const FILTERED_LAYERS: [&str; 2] = [PLACES_LAYER, LABELS_LAYER];

pub fn background_layer() -> Value {
    json!({
        "id": BACKGROUND_LAYER,
        "type": "line",
        "source": BACKGROUND_SOURCE,
        "layout": {
            "line-join": "round",
            "line-cap": "round"
        },
        "paint": {
            "line-color": "#888",
            "line-width": 2
        }
    })
}

pub fn links_layer() -> Value {
    json!({
        "id": LINKS_LAYER,
        "type": "line",
        "minzoom": 7,
        "source": LINKS_SOURCE,
        "paint": {
            "line-color": "#cdcdcd"
        }
    })
}

pub fn places_layer() -> Value {
    json!({
        "id": PLACES_LAYER,
        "type": "circle",
        "source": PLACES_SOURCE,
        "paint": {
            "circle-color": "#5470c6",
            "circle-radius": [
                "interpolate", ["linear"], ["zoom"],
                5, 1,
                10, 5
            ]
        }
    })
}

pub fn labels_layer(language: &str) -> Value {
    json!({
        "id": LABELS_LAYER,
        "type": "symbol",
        "source": PLACES_SOURCE,
        "layout": {
            "text-field": label_expression(language),
            "text-variable-anchor": ["top", "bottom", "left", "right"],
            "text-radial-offset": 0.5,
            "text-justify": "auto",
            "text-font": ["Noto Sans Regular"],
            "text-padding": 4,
            "text-optional": true
        },
        "paint": {
            "text-halo-color": "#ffffff",
            "text-halo-width": 1
        }
    })
}

/// Category layers in paint order: links under circles under labels.
pub fn category_layers(language: &str) -> Vec<Value> {
    vec![links_layer(), places_layer(), labels_layer(language)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn layer_ids_match_their_constants() {
        assert_eq!(background_layer()["id"], BACKGROUND_LAYER);
        assert_eq!(links_layer()["id"], LINKS_LAYER);
        assert_eq!(places_layer()["id"], PLACES_LAYER);
        assert_eq!(labels_layer("en")["id"], LABELS_LAYER);
    }

    #[test]
    fn category_layers_paint_labels_last() {
        let ids: Vec<String> = category_layers("fr")
            .iter()
            .map(|layer| layer["id"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec![LINKS_LAYER, PLACES_LAYER, LABELS_LAYER]);
    }

    #[test]
    fn labels_use_the_resolved_language() {
        let layer = labels_layer("fr");
        assert_eq!(
            layer["layout"]["text-field"],
            json!(["coalesce", ["get", "fr"], ["get", "en"]])
        );
    }

    #[test]
    fn links_only_appear_close_up() {
        assert_eq!(links_layer()["minzoom"], 7);
    }
}
