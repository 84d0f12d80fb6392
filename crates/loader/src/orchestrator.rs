//! Load sequencing for the viewer's four resource kinds.
//!
//! The orchestrator performs no IO. [`DataOrchestrator::start`] and
//! [`DataOrchestrator::select_category`] return [`FetchRequest`]s for the
//! driver to run; the driver reports each completion through
//! [`DataOrchestrator::on_settled`] and gets back the state changes that
//! completion caused. Background and index are independent of each other and
//! of category data; a category named in the URL is fetched speculatively in
//! parallel with the index and reconciled once the index arrives.
//!
//! Completion order is never assumed. The only ordering rule is the token
//! check: node/link results whose token no longer matches the current
//! selection are discarded without effect, which is what makes rapid
//! category switching safe.

use catalog::CategoryIndex;
use formats::{CategoryIndexDoc, LinkDoc, PlaceCollection};
use permalink::ViewState;
use serde_json::Value;

use crate::error::LoadError;
use crate::session::{ActiveCategory, Session};
use crate::task::{FetchKind, FetchRequest, LoadToken, ResourcePaths};

/// One observable consequence of a settle event, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadUpdate {
    BackgroundReady,
    BackgroundFailed { reason: String },
    /// Index parsed; `skipped` counts entries dropped for lacking a
    /// default-language label.
    IndexReady { skipped: usize },
    IndexFailed { reason: String },
    /// The URL named a category the index does not contain; the speculative
    /// selection was dropped.
    SelectionInvalidated { id: String },
    NodesReady { token: LoadToken },
    NodesFailed { token: LoadToken, reason: String },
    LinksReady { token: LoadToken },
    LinksFailed { token: LoadToken, reason: String },
    /// Result arrived for a superseded selection and was discarded.
    Stale { token: LoadToken },
    /// Fired exactly once: the renderer is initialized and every required
    /// fetch has settled.
    Ready,
}

#[derive(Debug)]
pub struct DataOrchestrator {
    paths: ResourcePaths,
    session: Session,
    next_token: u64,
    map_initialized: bool,
    background_settled: bool,
    index_settled: bool,
    ready_announced: bool,
}

impl DataOrchestrator {
    pub fn new(paths: ResourcePaths) -> Self {
        Self {
            paths,
            session: Session::default(),
            next_token: 0,
            map_initialized: false,
            background_settled: false,
            index_settled: false,
            ready_announced: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.ready_announced
    }

    pub fn map_initialized(&self) -> bool {
        self.map_initialized
    }

    pub fn current_category(&self) -> Option<&str> {
        self.session.current_category_id()
    }

    fn fresh_token(&mut self) -> LoadToken {
        self.next_token += 1;
        LoadToken(self.next_token)
    }

    /// Issues the startup fetches: background and index always, plus the
    /// node/link pair for a URL-specified category. The category is fetched
    /// speculatively; the index validates it on arrival.
    pub fn start(&mut self, initial: &ViewState) -> Vec<FetchRequest> {
        let token = self.fresh_token();
        let mut requests = vec![
            FetchRequest {
                token,
                kind: FetchKind::Background,
                category: None,
                path: self.paths.background.clone(),
            },
            FetchRequest {
                token,
                kind: FetchKind::Index,
                category: None,
                path: self.paths.index(),
            },
        ];
        if let Some(id) = &initial.category {
            self.session.category = Some(ActiveCategory::pending(id.clone(), token, false));
            requests.extend(self.category_requests(id, token));
        }
        requests
    }

    /// Starts loading `id`, superseding whatever was selected before. The
    /// previous selection's in-flight results turn stale at this point. Ids
    /// the index does not know are ignored, and re-picking the category that
    /// already finished loading is a no-op.
    pub fn select_category(&mut self, id: &str) -> Vec<FetchRequest> {
        if !self.session.index.contains(id) {
            return Vec::new();
        }
        if let Some(active) = &self.session.category
            && active.id == id
            && active.settled()
        {
            return Vec::new();
        }
        let token = self.fresh_token();
        self.session.category = Some(ActiveCategory::pending(id, token, true));
        self.category_requests(id, token)
    }

    fn category_requests(&self, id: &str, token: LoadToken) -> Vec<FetchRequest> {
        vec![
            FetchRequest {
                token,
                kind: FetchKind::Nodes,
                category: Some(id.to_string()),
                path: self.paths.nodes(id),
            },
            FetchRequest {
                token,
                kind: FetchKind::Links,
                category: Some(id.to_string()),
                path: self.paths.links(id),
            },
        ]
    }

    /// The renderer finished constructing. Counts toward readiness.
    pub fn on_map_initialized(&mut self) -> Vec<LoadUpdate> {
        if self.map_initialized {
            return Vec::new();
        }
        self.map_initialized = true;
        let mut updates = Vec::new();
        self.check_ready(&mut updates);
        updates
    }

    /// Applies one finished fetch. Returns every state change it caused, in
    /// order; an empty vec never happens (at minimum the settle is reported
    /// as its own update or as [`LoadUpdate::Stale`]).
    pub fn on_settled(
        &mut self,
        token: LoadToken,
        kind: FetchKind,
        outcome: Result<String, LoadError>,
    ) -> Vec<LoadUpdate> {
        let mut updates = Vec::new();
        match kind {
            FetchKind::Background => self.settle_background(outcome, &mut updates),
            FetchKind::Index => self.settle_index(outcome, &mut updates),
            FetchKind::Nodes => self.settle_nodes(token, outcome, &mut updates),
            FetchKind::Links => self.settle_links(token, outcome, &mut updates),
        }
        self.check_ready(&mut updates);
        updates
    }

    fn settle_background(&mut self, outcome: Result<String, LoadError>, updates: &mut Vec<LoadUpdate>) {
        self.background_settled = true;
        match outcome.and_then(parse_background) {
            Ok(doc) => {
                self.session.background = Some(doc);
                updates.push(LoadUpdate::BackgroundReady);
            }
            Err(error) => {
                let reason = error.to_string();
                self.session.background_error = Some(reason.clone());
                updates.push(LoadUpdate::BackgroundFailed { reason });
            }
        }
    }

    fn settle_index(&mut self, outcome: Result<String, LoadError>, updates: &mut Vec<LoadUpdate>) {
        self.index_settled = true;
        match outcome.and_then(parse_index) {
            Ok(doc) => {
                let skipped = doc.skipped;
                self.session.index = CategoryIndex::from_doc(doc);
                updates.push(LoadUpdate::IndexReady { skipped });
                self.reconcile_selection(updates);
            }
            Err(error) => {
                let reason = error.to_string();
                self.session.index_error = Some(reason.clone());
                updates.push(LoadUpdate::IndexFailed { reason });
            }
        }
    }

    /// A speculative URL selection either gets confirmed by the index or is
    /// dropped. Index failure leaves it in place: with nothing to check
    /// against, showing whatever data arrives beats showing nothing.
    fn reconcile_selection(&mut self, updates: &mut Vec<LoadUpdate>) {
        let Some(active) = &self.session.category else {
            return;
        };
        if active.validated {
            return;
        }
        let id = active.id.clone();
        if self.session.index.contains(&id) {
            if let Some(active) = self.session.category.as_mut() {
                active.validated = true;
            }
        } else {
            self.session.category = None;
            updates.push(LoadUpdate::SelectionInvalidated { id });
        }
    }

    fn settle_nodes(
        &mut self,
        token: LoadToken,
        outcome: Result<String, LoadError>,
        updates: &mut Vec<LoadUpdate>,
    ) {
        let Some(active) = self.session.category.as_mut() else {
            updates.push(LoadUpdate::Stale { token });
            return;
        };
        if active.token != token {
            updates.push(LoadUpdate::Stale { token });
            return;
        }
        match outcome.and_then(parse_places) {
            Ok(places) => {
                active.places = Some(places);
                updates.push(LoadUpdate::NodesReady { token });
            }
            Err(error) => {
                let reason = error.to_string();
                active.places = Some(PlaceCollection::empty());
                active.places_error = Some(reason.clone());
                updates.push(LoadUpdate::NodesFailed { token, reason });
            }
        }
    }

    fn settle_links(
        &mut self,
        token: LoadToken,
        outcome: Result<String, LoadError>,
        updates: &mut Vec<LoadUpdate>,
    ) {
        let Some(active) = self.session.category.as_mut() else {
            updates.push(LoadUpdate::Stale { token });
            return;
        };
        if active.token != token {
            updates.push(LoadUpdate::Stale { token });
            return;
        }
        match outcome.and_then(parse_links) {
            Ok(links) => {
                active.links = Some(links);
                updates.push(LoadUpdate::LinksReady { token });
            }
            Err(error) => {
                let reason = error.to_string();
                active.links = Some(LinkDoc::empty());
                active.links_error = Some(reason.clone());
                updates.push(LoadUpdate::LinksFailed { token, reason });
            }
        }
    }

    /// Ready once: renderer initialized, background and index settled, and
    /// the current selection (if any) fully settled. A selection made while
    /// still loading extends the wait to its own data, matching what the
    /// user actually sees.
    fn check_ready(&mut self, updates: &mut Vec<LoadUpdate>) {
        if self.ready_announced || !self.map_initialized {
            return;
        }
        if !self.background_settled || !self.index_settled {
            return;
        }
        let category_settled = match &self.session.category {
            None => true,
            Some(active) => active.settled(),
        };
        if !category_settled {
            return;
        }
        self.ready_announced = true;
        updates.push(LoadUpdate::Ready);
    }
}

fn parse_background(text: String) -> Result<Value, LoadError> {
    serde_json::from_str::<Value>(&text).map_err(|e| LoadError::Parse(e.to_string()))
}

fn parse_index(text: String) -> Result<CategoryIndexDoc, LoadError> {
    CategoryIndexDoc::from_json_str(&text).map_err(|e| LoadError::Parse(e.to_string()))
}

fn parse_places(text: String) -> Result<PlaceCollection, LoadError> {
    PlaceCollection::from_geojson_str(&text).map_err(|e| LoadError::Parse(e.to_string()))
}

fn parse_links(text: String) -> Result<LinkDoc, LoadError> {
    LinkDoc::from_json_str(&text).map_err(|e| LoadError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INDEX_JSON: &str = r#"{
        "QA": {"en": "Alpha places"},
        "QB": {"en": "Beta places"}
    }"#;

    const NODES_JSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"en": "Somewhere"},
            "geometry": {"type": "Point", "coordinates": [3.0, 45.0]}
        }]
    }"#;

    const LINKS_JSON: &str = r#"{"type": "MultiLineString", "coordinates": []}"#;
    const BACKGROUND_JSON: &str = r#"{"type": "GeometryCollection", "geometries": []}"#;

    fn with_category(id: &str) -> ViewState {
        ViewState {
            category: Some(id.to_string()),
            ..ViewState::default()
        }
    }

    fn token_of(requests: &[FetchRequest]) -> LoadToken {
        requests[0].token
    }

    #[test]
    fn start_without_category_issues_two_fetches() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let kinds: Vec<FetchKind> = requests.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![FetchKind::Background, FetchKind::Index]);
        assert_eq!(orch.current_category(), None);
    }

    #[test]
    fn start_with_url_category_fetches_it_speculatively() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&with_category("QA"));
        let kinds: Vec<FetchKind> = requests.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FetchKind::Background,
                FetchKind::Index,
                FetchKind::Nodes,
                FetchKind::Links
            ]
        );
        assert_eq!(requests[2].path, "geojson/QA-nodes.geojson");
        assert_eq!(requests[3].category.as_deref(), Some("QA"));
        assert_eq!(orch.current_category(), Some("QA"));
    }

    #[test]
    fn completions_apply_in_any_order_and_ready_fires_last() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&with_category("QA"));
        let token = token_of(&requests);

        assert_eq!(orch.on_map_initialized(), vec![]);
        assert_eq!(
            orch.on_settled(token, FetchKind::Links, Ok(LINKS_JSON.to_string())),
            vec![LoadUpdate::LinksReady { token }]
        );
        assert_eq!(
            orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string())),
            vec![LoadUpdate::IndexReady { skipped: 0 }]
        );
        assert_eq!(
            orch.on_settled(token, FetchKind::Nodes, Ok(NODES_JSON.to_string())),
            vec![LoadUpdate::NodesReady { token }]
        );
        assert!(!orch.is_ready());

        let updates = orch.on_settled(token, FetchKind::Background, Ok(BACKGROUND_JSON.to_string()));
        assert_eq!(updates, vec![LoadUpdate::BackgroundReady, LoadUpdate::Ready]);
        assert!(orch.is_ready());
        assert!(orch.session().background.is_some());
    }

    #[test]
    fn ready_waits_for_the_renderer() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let token = token_of(&requests);

        orch.on_settled(token, FetchKind::Background, Ok(BACKGROUND_JSON.to_string()));
        let updates = orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));
        assert!(!updates.contains(&LoadUpdate::Ready));

        assert_eq!(orch.on_map_initialized(), vec![LoadUpdate::Ready]);
        assert_eq!(orch.on_map_initialized(), vec![]);
    }

    #[test]
    fn background_failure_is_not_fatal() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let token = token_of(&requests);
        orch.on_map_initialized();

        let updates = orch.on_settled(token, FetchKind::Background, Err(LoadError::Http(404)));
        assert_eq!(
            updates,
            vec![LoadUpdate::BackgroundFailed {
                reason: "HTTP status 404".to_string()
            }]
        );

        let updates = orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));
        assert_eq!(
            updates,
            vec![LoadUpdate::IndexReady { skipped: 0 }, LoadUpdate::Ready]
        );
        assert!(orch.session().background.is_none());
        assert!(orch.session().background_error.is_some());
    }

    #[test]
    fn index_failure_leaves_an_empty_catalog() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let token = token_of(&requests);

        let updates = orch.on_settled(
            token,
            FetchKind::Index,
            Err(LoadError::Network("offline".to_string())),
        );
        assert_eq!(
            updates,
            vec![LoadUpdate::IndexFailed {
                reason: "network error: offline".to_string()
            }]
        );
        assert!(orch.session().index.is_empty());
        assert_eq!(orch.select_category("QA"), vec![]);
    }

    #[test]
    fn malformed_documents_degrade_like_fetch_failures() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&with_category("QA"));
        let token = token_of(&requests);

        let updates = orch.on_settled(token, FetchKind::Nodes, Ok("not json".to_string()));
        match &updates[0] {
            LoadUpdate::NodesFailed { reason, .. } => assert!(reason.starts_with("parse error")),
            other => panic!("unexpected update: {other:?}"),
        }
        let active = orch.session().category.as_ref().unwrap();
        assert!(active.places.as_ref().unwrap().is_empty());
        assert!(active.places_error.is_some());
    }

    #[test]
    fn stale_results_are_discarded_silently() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let startup = token_of(&requests);
        orch.on_settled(startup, FetchKind::Index, Ok(INDEX_JSON.to_string()));

        let first = orch.select_category("QA");
        let second = orch.select_category("QB");
        let (old, new) = (token_of(&first), token_of(&second));
        assert_ne!(old, new);

        // QB's data lands first and applies.
        assert_eq!(
            orch.on_settled(new, FetchKind::Nodes, Ok(NODES_JSON.to_string())),
            vec![LoadUpdate::NodesReady { token: new }]
        );
        // QA's data lands afterwards and is dropped.
        assert_eq!(
            orch.on_settled(old, FetchKind::Nodes, Ok(NODES_JSON.to_string())),
            vec![LoadUpdate::Stale { token: old }]
        );
        assert_eq!(orch.current_category(), Some("QB"));
        let active = orch.session().category.as_ref().unwrap();
        assert_eq!(active.token, new);
    }

    #[test]
    fn url_category_missing_from_the_index_is_dropped() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&with_category("QZ"));
        let token = token_of(&requests);

        let updates = orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));
        assert_eq!(
            updates,
            vec![
                LoadUpdate::IndexReady { skipped: 0 },
                LoadUpdate::SelectionInvalidated {
                    id: "QZ".to_string()
                }
            ]
        );
        assert_eq!(orch.current_category(), None);

        // The speculative pair now reports as stale.
        assert_eq!(
            orch.on_settled(token, FetchKind::Nodes, Ok(NODES_JSON.to_string())),
            vec![LoadUpdate::Stale { token }]
        );
    }

    #[test]
    fn url_category_confirmed_by_the_index_stays() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&with_category("QA"));
        let token = token_of(&requests);

        orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));
        let active = orch.session().category.as_ref().unwrap();
        assert!(active.validated);
        assert_eq!(active.id, "QA");
    }

    #[test]
    fn reselecting_the_loaded_category_fetches_nothing() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let startup = token_of(&requests);
        orch.on_settled(startup, FetchKind::Index, Ok(INDEX_JSON.to_string()));

        let requests = orch.select_category("QA");
        let token = token_of(&requests);
        orch.on_settled(token, FetchKind::Nodes, Ok(NODES_JSON.to_string()));

        // Still loading: picking again restarts the pair under a new token.
        let retry = orch.select_category("QA");
        assert_eq!(retry.len(), 2);
        let token = token_of(&retry);
        orch.on_settled(token, FetchKind::Nodes, Ok(NODES_JSON.to_string()));
        orch.on_settled(token, FetchKind::Links, Ok(LINKS_JSON.to_string()));

        // Fully loaded: picking again is a no-op.
        assert_eq!(orch.select_category("QA"), vec![]);
        assert_eq!(orch.session().current_token(), Some(token));
    }

    #[test]
    fn selecting_an_unknown_id_is_ignored() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let token = token_of(&requests);
        orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));

        assert_eq!(orch.select_category("nope"), vec![]);
        assert_eq!(orch.current_category(), None);

        let requests = orch.select_category("QB");
        assert_eq!(requests.len(), 2);
        assert_eq!(orch.current_category(), Some("QB"));
    }

    #[test]
    fn selection_after_ready_does_not_refire_ready() {
        let mut orch = DataOrchestrator::new(ResourcePaths::default());
        let requests = orch.start(&ViewState::default());
        let token = token_of(&requests);
        orch.on_map_initialized();
        orch.on_settled(token, FetchKind::Background, Ok(BACKGROUND_JSON.to_string()));
        let updates = orch.on_settled(token, FetchKind::Index, Ok(INDEX_JSON.to_string()));
        assert!(updates.contains(&LoadUpdate::Ready));

        let requests = orch.select_category("QA");
        let token = token_of(&requests);
        let updates = orch.on_settled(token, FetchKind::Nodes, Ok(NODES_JSON.to_string()));
        assert_eq!(updates, vec![LoadUpdate::NodesReady { token }]);
        let updates = orch.on_settled(token, FetchKind::Links, Ok(LINKS_JSON.to_string()));
        assert_eq!(updates, vec![LoadUpdate::LinksReady { token }]);
    }
}
