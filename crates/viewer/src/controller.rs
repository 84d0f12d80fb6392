//! The view-sync controller.
//!
//! One object owns the client session: the decoded permalink state, the load
//! orchestrator and the renderer bookkeeping. Everything that happens in the
//! browser funnels in as a [`MapEvent`]; every consequence leaves as an
//! [`Effect`] for the driver to perform. The controller does no IO and never
//! waits, so the ordering rules that matter here (result staleness, the
//! one-shot fit suppression, idle writeback) are all checkable natively.
//!
//! The permalink state has a single writer: this controller. The orchestrator
//! owns the session data; the controller reads it when building effects.

use formats::{LinkDoc, PlaceCollection};
use foundation::{LngLat, LngLatBounds};
use layers::{
    BACKGROUND_SOURCE, FILTERED_LAYERS, LINKS_LAYER, LINKS_SOURCE, PLACES_SOURCE,
    background_layer, category_layers, filter_expression, normalize_query,
};
use loader::{DataOrchestrator, FetchKind, LoadError, LoadToken, LoadUpdate, Session};
use permalink::{ViewState, encode};

use crate::config::ViewerConfig;
use crate::events::{Effect, MapEvent};

/// Lifecycle of the controller. The fragment is only rewritten once the
/// initial load has settled; before that the URL still holds what the user
/// arrived with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Active,
}

#[derive(Debug)]
pub struct ViewSyncController {
    language: String,
    orchestrator: DataOrchestrator,
    state: ViewState,
    phase: Phase,
    /// One-shot: armed when the startup URL carried both a category and a
    /// full camera, so the first automatic fit must not stomp that camera.
    block_next_fit: bool,
    /// Token of a category load whose data reached the renderer but has not
    /// had its fit attempt yet.
    fit_pending: Option<LoadToken>,
    surfaces_added: bool,
    background_added: bool,
    last_fragment: Option<String>,
}

impl ViewSyncController {
    /// Builds the controller and returns the startup effects: the filter
    /// input seed and the initial fetch set.
    pub fn new(
        config: ViewerConfig,
        initial: ViewState,
        language: impl Into<String>,
    ) -> (Self, Vec<Effect>) {
        let block_next_fit = initial.category.is_some() && initial.has_explicit_camera();
        let mut orchestrator = DataOrchestrator::new(config.paths);
        let requests = orchestrator.start(&initial);

        let mut effects = vec![Effect::SetFilterInput {
            text: initial.filter.clone().unwrap_or_default(),
        }];
        effects.extend(requests.into_iter().map(Effect::Fetch));

        let controller = Self {
            language: language.into(),
            orchestrator,
            state: initial,
            phase: Phase::Loading,
            block_next_fit,
            fit_pending: None,
            surfaces_added: false,
            background_added: false,
            last_fragment: None,
        };
        (controller, effects)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn session(&self) -> &Session {
        self.orchestrator.session()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn handle(&mut self, event: MapEvent) -> Vec<Effect> {
        match event {
            MapEvent::MapInitialized => self.on_map_initialized(),
            MapEvent::FetchSettled {
                token,
                kind,
                outcome,
            } => self.on_fetch_settled(token, kind, outcome),
            MapEvent::SourceDataLoaded { source } => self.on_source_data(&source),
            MapEvent::BoundsReady { token, bounds } => self.on_bounds_ready(token, bounds),
            MapEvent::Idle { zoom, center } => self.on_idle(zoom, center),
            MapEvent::CategoryPicked { id } => self.on_category_picked(id),
            MapEvent::FilterEdited { text } => self.on_filter_edited(&text),
        }
    }

    /// The renderer is up: register every source and layer, carrying
    /// whatever data the fetches have already delivered.
    fn on_map_initialized(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.flush_surfaces(&mut effects);
        let updates = self.orchestrator.on_map_initialized();
        self.apply_updates(updates, &mut effects);
        effects
    }

    fn on_fetch_settled(
        &mut self,
        token: LoadToken,
        kind: FetchKind,
        outcome: Result<String, LoadError>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let updates = self.orchestrator.on_settled(token, kind, outcome);
        self.apply_updates(updates, &mut effects);
        effects
    }

    /// A pending fit resolves on the first metadata-loaded signal for the
    /// places source: either the startup suppression eats it, exactly once,
    /// or the driver is asked for the data bounds.
    fn on_source_data(&mut self, source: &str) -> Vec<Effect> {
        if source != PLACES_SOURCE {
            return Vec::new();
        }
        let Some(token) = self.fit_pending.take() else {
            return Vec::new();
        };
        if self.block_next_fit {
            self.block_next_fit = false;
            return Vec::new();
        }
        vec![Effect::QueryBounds { token }]
    }

    fn on_bounds_ready(&mut self, token: LoadToken, bounds: Option<LngLatBounds>) -> Vec<Effect> {
        // The selection may have moved on while the measurement was in
        // flight; stale bounds are dropped like stale data.
        if self.orchestrator.session().current_token() != Some(token) {
            return Vec::new();
        }
        match bounds {
            Some(bounds) => vec![Effect::FitBounds { bounds }],
            None => Vec::new(),
        }
    }

    /// Camera settled: fold it into the permalink state and rewrite the
    /// fragment, but only once live and only when the text changed.
    fn on_idle(&mut self, zoom: f64, center: LngLat) -> Vec<Effect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        self.state.zoom = Some(zoom);
        self.state.center = Some(center);
        let fragment = encode(&self.state);
        if self.last_fragment.as_deref() == Some(fragment.as_str()) {
            return Vec::new();
        }
        self.last_fragment = Some(fragment.clone());
        vec![Effect::WriteFragment { fragment }]
    }

    fn on_category_picked(&mut self, id: String) -> Vec<Effect> {
        // Ids the index does not know are ignored; the selector only offers
        // known ones, so this guards against stray callers.
        if !self.orchestrator.session().index.contains(&id) {
            return Vec::new();
        }
        let requests = self.orchestrator.select_category(&id);
        self.state.category = Some(id.clone());
        let mut effects = vec![Effect::SetSelector { id: Some(id) }];
        effects.extend(requests.into_iter().map(Effect::Fetch));
        effects
    }

    fn on_filter_edited(&mut self, text: &str) -> Vec<Effect> {
        self.state.filter = if normalize_query(text).is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        if !self.surfaces_added {
            return Vec::new();
        }
        self.filter_effects(text)
    }

    /// The same expression goes to the circle layer and its label layer so
    /// displayed and filtered text never disagree. `None` clears.
    fn filter_effects(&self, text: &str) -> Vec<Effect> {
        let expression = filter_expression(&self.language, text);
        FILTERED_LAYERS
            .into_iter()
            .map(|layer| Effect::SetFilter {
                layer,
                filter: expression.clone(),
            })
            .collect()
    }

    /// Registers the background (when already fetched) and the three
    /// category layers over their sources. Sources start with whatever the
    /// session holds so data that won the race against the renderer is not
    /// lost.
    fn flush_surfaces(&mut self, effects: &mut Vec<Effect>) {
        if self.surfaces_added {
            return;
        }
        let session = self.orchestrator.session();
        let background = session.background.clone();
        let links = session
            .category
            .as_ref()
            .and_then(|active| active.links.as_ref())
            .map(|links| links.raw().clone())
            .unwrap_or_else(|| LinkDoc::empty().raw().clone());
        let places = session
            .category
            .as_ref()
            .and_then(|active| active.places.as_ref())
            .map(|places| places.raw().clone())
            .unwrap_or_else(|| PlaceCollection::empty().raw().clone());

        if let Some(data) = background {
            effects.push(Effect::AddSource {
                name: BACKGROUND_SOURCE,
                data,
            });
            effects.push(Effect::AddLayer {
                spec: background_layer(),
                before: None,
            });
            self.background_added = true;
        }
        effects.push(Effect::AddSource {
            name: LINKS_SOURCE,
            data: links,
        });
        effects.push(Effect::AddSource {
            name: PLACES_SOURCE,
            data: places,
        });
        for spec in category_layers(&self.language) {
            effects.push(Effect::AddLayer { spec, before: None });
        }
        self.surfaces_added = true;

        if let Some(filter) = self.state.filter.clone() {
            effects.extend(self.filter_effects(&filter));
        }
    }

    fn apply_updates(&mut self, updates: Vec<LoadUpdate>, effects: &mut Vec<Effect>) {
        for update in updates {
            match update {
                LoadUpdate::BackgroundReady => {
                    if self.orchestrator.map_initialized() && !self.background_added
                        && let Some(data) = self.orchestrator.session().background.clone()
                    {
                        effects.push(Effect::AddSource {
                            name: BACKGROUND_SOURCE,
                            data,
                        });
                        // Slot beneath the category layers when they exist.
                        effects.push(Effect::AddLayer {
                            spec: background_layer(),
                            before: self.surfaces_added.then_some(LINKS_LAYER),
                        });
                        self.background_added = true;
                    }
                }
                LoadUpdate::BackgroundFailed { reason } => {
                    effects.push(Effect::Log {
                        message: format!("background layer unavailable: {reason}"),
                    });
                }
                LoadUpdate::IndexReady { skipped } => {
                    let session = self.orchestrator.session();
                    effects.push(Effect::PopulateSelector {
                        entries: session.index.sorted_entries(&self.language),
                        selected: session.current_category_id().map(str::to_string),
                    });
                    if skipped > 0 {
                        effects.push(Effect::Log {
                            message: format!(
                                "category index: dropped {skipped} entries without an \"en\" label"
                            ),
                        });
                    }
                }
                LoadUpdate::IndexFailed { reason } => {
                    effects.push(Effect::PopulateSelector {
                        entries: Vec::new(),
                        selected: None,
                    });
                    effects.push(Effect::Log {
                        message: format!("category index unavailable: {reason}"),
                    });
                }
                LoadUpdate::SelectionInvalidated { id } => {
                    // The startup selection is gone, and the startup-only
                    // fit suppression goes with it.
                    self.state.category = None;
                    self.fit_pending = None;
                    self.block_next_fit = false;
                    effects.push(Effect::SetSelector { id: None });
                    if self.surfaces_added {
                        effects.push(Effect::SetData {
                            source: PLACES_SOURCE,
                            data: PlaceCollection::empty().raw().clone(),
                        });
                        effects.push(Effect::SetData {
                            source: LINKS_SOURCE,
                            data: LinkDoc::empty().raw().clone(),
                        });
                    }
                    effects.push(Effect::Log {
                        message: format!("category {id} is not in the index; selection cleared"),
                    });
                }
                LoadUpdate::NodesReady { token } => {
                    self.fit_pending = Some(token);
                    if self.surfaces_added {
                        let data = self
                            .orchestrator
                            .session()
                            .category
                            .as_ref()
                            .and_then(|active| active.places.as_ref())
                            .map(|places| places.raw().clone())
                            .unwrap_or_else(|| PlaceCollection::empty().raw().clone());
                        effects.push(Effect::SetData {
                            source: PLACES_SOURCE,
                            data,
                        });
                    }
                }
                LoadUpdate::NodesFailed { token, reason } => {
                    // The source is blanked rather than left on the previous
                    // category's points; the fit attempt still runs so the
                    // startup suppression cannot leak past its one shot.
                    self.fit_pending = Some(token);
                    if self.surfaces_added {
                        effects.push(Effect::SetData {
                            source: PLACES_SOURCE,
                            data: PlaceCollection::empty().raw().clone(),
                        });
                    }
                    effects.push(Effect::Log {
                        message: format!("places unavailable: {reason}"),
                    });
                }
                LoadUpdate::LinksReady { .. } => {
                    if self.surfaces_added {
                        let data = self
                            .orchestrator
                            .session()
                            .category
                            .as_ref()
                            .and_then(|active| active.links.as_ref())
                            .map(|links| links.raw().clone())
                            .unwrap_or_else(|| LinkDoc::empty().raw().clone());
                        effects.push(Effect::SetData {
                            source: LINKS_SOURCE,
                            data,
                        });
                    }
                }
                LoadUpdate::LinksFailed { reason, .. } => {
                    if self.surfaces_added {
                        effects.push(Effect::SetData {
                            source: LINKS_SOURCE,
                            data: LinkDoc::empty().raw().clone(),
                        });
                    }
                    effects.push(Effect::Log {
                        message: format!("links unavailable: {reason}"),
                    });
                }
                // Superseded results vanish with no observable consequence.
                LoadUpdate::Stale { .. } => {}
                LoadUpdate::Ready => {
                    self.phase = Phase::Active;
                }
            }
        }
    }
}
