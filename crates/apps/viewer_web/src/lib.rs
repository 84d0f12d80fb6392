//! Browser glue for the place-graph viewer.
//!
//! The page supplies the shell: MapLibre GL JS on `window`, a `#map`
//! container, the `#filter-input` text box, the `#category-select` dropdown
//! and the `#random-category` button, then calls [`boot`]. From there every
//! browser callback is turned into a [`MapEvent`], handed to the controller,
//! and the returned effects are performed against the map, the DOM and the
//! network. The controller never touches the browser directly.

use std::cell::RefCell;

use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlInputElement, HtmlSelectElement, Window};

use foundation::{LngLat, resolve_language};
use loader::{FetchRequest, LoadError};
use viewer::{Effect, MapEvent, SUPPORTED_LANGUAGES, ViewSyncController, ViewerConfig};

const MAP_ATTRIBUTION: &str =
    "Data: <a href='https://www.wikidata.org' target='_blank'>Wikidata</a>";
const FILTER_INPUT_ID: &str = "filter-input";
const CATEGORY_SELECT_ID: &str = "category-select";
const RANDOM_BUTTON_ID: &str = "random-category";

thread_local! {
    static CONTROLLER: RefCell<Option<ViewSyncController>> = RefCell::new(None);
}

/// Runs `f` against the controller slot, returning a default if thread-local
/// storage is already gone (page teardown).
fn with_controller<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<Option<ViewSyncController>>) -> R,
    R: Default,
{
    CONTROLLER.try_with(f).unwrap_or_default()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Entry point, called by the page once the shell elements exist.
///
/// Reads the URL fragment and the browser language, builds the controller,
/// creates the map and subscribes to its events, wires the DOM controls,
/// then performs the startup effects (seeding the filter box and kicking off
/// the first fetches).
#[wasm_bindgen]
pub fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let fragment = window.location().hash().unwrap_or_default();
    let initial = permalink::decode(&fragment);
    let language = preferred_language(&window);

    let zoom = initial.zoom_or_default();
    let center = initial.center_or_default();
    let (controller, effects) =
        ViewSyncController::new(ViewerConfig::default(), initial, language);
    CONTROLLER.with(|cell| *cell.borrow_mut() = Some(controller));

    let on_load = Closure::wrap(Box::new(|| {
        dispatch(MapEvent::MapInitialized);
    }) as Box<dyn FnMut()>);
    let on_source_data = Closure::wrap(Box::new(|source: String| {
        dispatch(MapEvent::SourceDataLoaded { source });
    }) as Box<dyn FnMut(String)>);
    let on_idle = Closure::wrap(Box::new(|zoom: f64, lng: f64, lat: f64| {
        dispatch(MapEvent::Idle {
            zoom,
            center: LngLat::new(lng, lat),
        });
    }) as Box<dyn FnMut(f64, f64, f64)>);

    placegraph_map_new(
        center.lng,
        center.lat,
        zoom,
        MAP_ATTRIBUTION,
        on_load.as_ref().unchecked_ref(),
        on_source_data.as_ref().unchecked_ref(),
        on_idle.as_ref().unchecked_ref(),
    )?;
    on_load.forget();
    on_source_data.forget();
    on_idle.forget();

    wire_filter_input()?;
    wire_category_select()?;
    wire_random_button()?;

    perform(effects);
    Ok(())
}

/// Picks the display language from `navigator.languages`.
fn preferred_language(window: &Window) -> String {
    let tags: Vec<String> = window
        .navigator()
        .languages()
        .iter()
        .filter_map(|tag| tag.as_string())
        .collect();
    resolve_language(&tags, &SUPPORTED_LANGUAGES)
}

/// One inbound event: run it through the controller, then perform whatever
/// it asked for. The borrow is released before effects run, so an effect
/// that produces a follow-up event (bounds answers) re-enters safely.
fn dispatch(event: MapEvent) {
    let effects = with_controller(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_mut() {
            Some(controller) => controller.handle(event),
            None => Vec::new(),
        }
    });
    perform(effects);
}

fn perform(effects: Vec<Effect>) {
    for effect in effects {
        if let Err(err) = run_effect(effect) {
            warn(&format!("effect failed: {err:?}"));
        }
    }
}

fn run_effect(effect: Effect) -> Result<(), JsValue> {
    match effect {
        Effect::Fetch(request) => {
            start_fetch(request);
            Ok(())
        }
        Effect::AddSource { name, data } => placegraph_map_add_source(name, &data.to_string()),
        Effect::AddLayer { spec, before } => placegraph_map_add_layer(&spec.to_string(), before),
        Effect::SetData { source, data } => placegraph_map_set_data(source, &data.to_string()),
        Effect::SetFilter { layer, filter } => {
            let expression = filter.map(|expr| expr.to_string());
            placegraph_map_set_filter(layer, expression.as_deref())
        }
        Effect::QueryBounds { token } => {
            // The loaded data is the source of truth for extent; answer on
            // the spot and let the controller decide if it is still current.
            let bounds = with_controller(|cell| {
                cell.borrow()
                    .as_ref()
                    .and_then(|controller| controller.session().places_bounds())
            });
            dispatch(MapEvent::BoundsReady { token, bounds });
            Ok(())
        }
        Effect::FitBounds { bounds } => {
            let [west, south, east, north] = bounds.to_array();
            placegraph_map_fit_bounds(west, south, east, north)
        }
        Effect::PopulateSelector { entries, selected } => {
            populate_selector(&entries, selected.as_deref())
        }
        Effect::SetSelector { id } => {
            set_selector(id.as_deref());
            Ok(())
        }
        Effect::SetFilterInput { text } => {
            set_filter_input(&text);
            Ok(())
        }
        Effect::WriteFragment { fragment } => {
            write_fragment(&fragment);
            Ok(())
        }
        Effect::Log { message } => {
            warn(&message);
            Ok(())
        }
    }
}

fn start_fetch(request: FetchRequest) {
    spawn_local(async move {
        let outcome = fetch_text(&request.path).await;
        dispatch(MapEvent::FetchSettled {
            token: request.token,
            kind: request.kind,
            outcome,
        });
    });
}

async fn fetch_text(path: &str) -> Result<String, LoadError> {
    let response = Request::get(path)
        .send()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;
    if !response.ok() {
        return Err(LoadError::Http(response.status()));
    }
    response
        .text()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

fn filter_element() -> Option<HtmlInputElement> {
    document()?
        .get_element_by_id(FILTER_INPUT_ID)?
        .dyn_into::<HtmlInputElement>()
        .ok()
}

fn selector_element() -> Option<HtmlSelectElement> {
    document()?
        .get_element_by_id(CATEGORY_SELECT_ID)?
        .dyn_into::<HtmlSelectElement>()
        .ok()
}

fn wire_filter_input() -> Result<(), JsValue> {
    let Some(input) = filter_element() else {
        return Ok(());
    };
    let source = input.clone();
    let on_keyup = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        dispatch(MapEvent::FilterEdited {
            text: source.value(),
        });
    }) as Box<dyn FnMut(web_sys::Event)>);
    input.add_event_listener_with_callback("keyup", on_keyup.as_ref().unchecked_ref())?;
    on_keyup.forget();
    Ok(())
}

fn wire_category_select() -> Result<(), JsValue> {
    let Some(select) = selector_element() else {
        return Ok(());
    };
    let source = select.clone();
    let on_change = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        let id = source.value();
        if !id.is_empty() {
            dispatch(MapEvent::CategoryPicked { id });
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    select.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}

fn wire_random_button() -> Result<(), JsValue> {
    let Some(button) = document().and_then(|doc| doc.get_element_by_id(RANDOM_BUTTON_ID)) else {
        return Ok(());
    };
    let on_click = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        if let Some(id) = random_category() {
            dispatch(MapEvent::CategoryPicked { id });
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Uniform pick over the loaded index. The pick goes through the same event
/// as a manual selection, so the controller cannot tell them apart.
fn random_category() -> Option<String> {
    with_controller(|cell| {
        let slot = cell.borrow();
        let controller = slot.as_ref()?;
        let ids: Vec<&str> = controller.session().index.ids().collect();
        if ids.is_empty() {
            return None;
        }
        let pick = (js_sys::Math::random() * ids.len() as f64) as usize;
        ids.get(pick.min(ids.len() - 1)).map(|id| id.to_string())
    })
}

/// Rebuilds the dropdown: a blank neutral option first, then one option per
/// entry in the order given.
fn populate_selector(entries: &[(String, String)], selected: Option<&str>) -> Result<(), JsValue> {
    let Some(select) = selector_element() else {
        return Ok(());
    };
    let Some(doc) = document() else {
        return Ok(());
    };
    select.set_inner_html("");
    let neutral = doc.create_element("option")?;
    neutral.set_attribute("value", "")?;
    select.append_child(&neutral)?;
    for (id, label) in entries {
        let option = doc.create_element("option")?;
        option.set_attribute("value", id)?;
        option.set_text_content(Some(label.as_str()));
        select.append_child(&option)?;
    }
    select.set_value(selected.unwrap_or(""));
    Ok(())
}

fn set_selector(id: Option<&str>) {
    if let Some(select) = selector_element() {
        select.set_value(id.unwrap_or(""));
    }
}

fn set_filter_input(text: &str) {
    if let Some(input) = filter_element() {
        input.set_value(text);
    }
}

/// Replace-style navigation so the URL tracks the view without growing
/// history. Falls back to the plain hash setter where History is unusable.
fn write_fragment(fragment: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let location = window.location();
    let path = location.pathname().unwrap_or_default();
    let search = location.search().unwrap_or_default();
    let new_url = if fragment.is_empty() {
        format!("{path}{search}")
    } else {
        format!("{path}{search}#{fragment}")
    };
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&new_url));
    } else {
        let _ = location.set_hash(fragment);
    }
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[wasm_bindgen(inline_js = "
let __placegraph_map = null;

export function placegraph_map_new(lng, lat, zoom, attribution, on_load, on_source_data, on_idle) {
    const map = new maplibregl.Map({
        container: 'map',
        style: { version: 8, sources: {}, layers: [], glyphs: '{fontstack}/{range}.pbf' },
        attributionControl: { customAttribution: attribution, compact: true },
        center: [lng, lat],
        zoom: zoom,
    });
    map.addControl(new maplibregl.NavigationControl({
        visualizePitch: false,
        visualizeRoll: false,
        showZoom: true,
        showCompass: false,
    }), 'bottom-right');
    map.dragRotate.disable();
    map.keyboard.disable();
    map.touchZoomRotate.disableRotation();
    map.touchPitch.disable();
    map.once('load', () => on_load());
    map.on('sourcedata', (e) => {
        if (e.isSourceLoaded && e.sourceId) on_source_data(e.sourceId);
    });
    map.on('idle', () => {
        const center = map.getCenter();
        on_idle(map.getZoom(), center.lng, center.lat);
    });
    __placegraph_map = map;
}

export function placegraph_map_add_source(name, payload) {
    __placegraph_map.addSource(name, { type: 'geojson', data: JSON.parse(payload) });
}

export function placegraph_map_add_layer(spec, before) {
    __placegraph_map.addLayer(JSON.parse(spec), before || undefined);
}

export function placegraph_map_set_data(name, payload) {
    __placegraph_map.getSource(name).setData(JSON.parse(payload));
}

export function placegraph_map_set_filter(layer, payload) {
    __placegraph_map.setFilter(layer, payload ? JSON.parse(payload) : null);
}

export function placegraph_map_fit_bounds(west, south, east, north) {
    __placegraph_map.fitBounds([[west, south], [east, north]]);
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn placegraph_map_new(
        lng: f64,
        lat: f64,
        zoom: f64,
        attribution: &str,
        on_load: &js_sys::Function,
        on_source_data: &js_sys::Function,
        on_idle: &js_sys::Function,
    ) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn placegraph_map_add_source(name: &str, payload: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn placegraph_map_add_layer(spec: &str, before: Option<&str>) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn placegraph_map_set_data(name: &str, payload: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn placegraph_map_set_filter(layer: &str, payload: Option<&str>) -> Result<(), JsValue>;
    #[wasm_bindgen(catch)]
    fn placegraph_map_fit_bounds(
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    ) -> Result<(), JsValue>;
}
