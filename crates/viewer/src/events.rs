//! The controller's event and effect vocabulary.
//!
//! Everything that happens to the viewer arrives as a [`MapEvent`] on one
//! logical queue; everything the viewer wants done comes back as
//! [`Effect`]s. The driver (the wasm app) owns the renderer, the DOM and the
//! network, and translates in both directions. Keeping both directions as
//! plain data is what makes the ordering rules testable without a browser.

use foundation::{LngLat, LngLatBounds};
use loader::{FetchKind, FetchRequest, LoadError, LoadToken};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The renderer finished constructing (its `load` event).
    MapInitialized,
    /// The renderer ingested new content for a source (`sourcedata` with the
    /// metadata-loaded flag set).
    SourceDataLoaded { source: String },
    /// Answer to [`Effect::QueryBounds`].
    BoundsReady {
        token: LoadToken,
        bounds: Option<LngLatBounds>,
    },
    /// The renderer settled after camera or layer changes (`idle`).
    Idle { zoom: f64, center: LngLat },
    /// A category was chosen, via the selector or the random pick control.
    CategoryPicked { id: String },
    /// The filter text input changed.
    FilterEdited { text: String },
    /// A network fetch finished, successfully or not.
    FetchSettled {
        token: LoadToken,
        kind: FetchKind,
        outcome: Result<String, LoadError>,
    },
}

/// Commands for the driver. Source and layer names refer to the constants in
/// the layers crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// GET the resource and report back with [`MapEvent::FetchSettled`].
    Fetch(FetchRequest),
    /// Register a GeoJSON source holding `data`.
    AddSource { name: &'static str, data: Value },
    /// Add a layer; `before` slots it under an existing layer.
    AddLayer {
        spec: Value,
        before: Option<&'static str>,
    },
    /// Replace a source's content wholesale.
    SetData { source: &'static str, data: Value },
    /// Set or clear (`None`) a layer's feature filter.
    SetFilter {
        layer: &'static str,
        filter: Option<Value>,
    },
    /// Measure the places extent and answer with [`MapEvent::BoundsReady`].
    QueryBounds { token: LoadToken },
    /// Move the camera so `bounds` is fully visible.
    FitBounds { bounds: LngLatBounds },
    /// Rebuild the category selector options.
    PopulateSelector {
        entries: Vec<(String, String)>,
        selected: Option<String>,
    },
    /// Point the selector at an id, or at the neutral option.
    SetSelector { id: Option<String> },
    /// Seed the filter text input.
    SetFilterInput { text: String },
    /// Replace the URL fragment without growing history.
    WriteFragment { fragment: String },
    /// Developer-facing diagnostic.
    Log { message: String },
}
