//! The shareable view state.

use foundation::LngLat;

/// Camera used when the URL supplies nothing.
pub const DEFAULT_CENTER: LngLat = LngLat { lng: 15.0, lat: 15.0 };
pub const DEFAULT_ZOOM: f64 = 1.6;

/// Everything a permalink can carry. Each field is independently optional;
/// an absent field means "use the default" on the way in and "omit" on the
/// way out.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewState {
    pub zoom: Option<f64>,
    pub center: Option<LngLat>,
    pub category: Option<String>,
    pub filter: Option<String>,
}

impl ViewState {
    pub fn zoom_or_default(&self) -> f64 {
        self.zoom.unwrap_or(DEFAULT_ZOOM)
    }

    pub fn center_or_default(&self) -> LngLat {
        self.center.unwrap_or(DEFAULT_CENTER)
    }

    /// A camera is explicit only when the fragment carried both the zoom and
    /// the center; a partial camera still counts as "default view".
    pub fn has_explicit_camera(&self) -> bool {
        self.zoom.is_some() && self.center.is_some()
    }
}
