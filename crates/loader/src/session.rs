//! Everything the viewer has loaded so far.
//!
//! One explicit object instead of module globals: the orchestrator owns it,
//! consumers borrow it. Category data is replaced wholesale on selection
//! change, never merged.

use serde_json::Value;

use catalog::CategoryIndex;
use formats::{LinkDoc, PlaceCollection};
use foundation::LngLatBounds;

use crate::task::LoadToken;

/// The selected category and the progress of its two dataset loads. `None`
/// in `places`/`links` means the fetch has not settled yet; a failed fetch
/// settles to the empty document with the error recorded beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCategory {
    pub id: String,
    pub token: LoadToken,
    /// False while the id came straight from the URL and the index has not
    /// confirmed it yet.
    pub validated: bool,
    pub places: Option<PlaceCollection>,
    pub links: Option<LinkDoc>,
    pub places_error: Option<String>,
    pub links_error: Option<String>,
}

impl ActiveCategory {
    pub fn pending(id: impl Into<String>, token: LoadToken, validated: bool) -> Self {
        Self {
            id: id.into(),
            token,
            validated,
            places: None,
            links: None,
            places_error: None,
            links_error: None,
        }
    }

    /// Both datasets have settled, successfully or degraded.
    pub fn settled(&self) -> bool {
        self.places.is_some() && self.links.is_some()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    pub index: CategoryIndex,
    pub index_error: Option<String>,
    /// Raw background document, handed to the renderer untouched.
    pub background: Option<Value>,
    pub background_error: Option<String>,
    pub category: Option<ActiveCategory>,
}

impl Session {
    pub fn current_category_id(&self) -> Option<&str> {
        self.category.as_ref().map(|active| active.id.as_str())
    }

    pub fn current_token(&self) -> Option<LoadToken> {
        self.category.as_ref().map(|active| active.token)
    }

    /// Extent of the loaded places, if any are loaded and non-empty.
    pub fn places_bounds(&self) -> Option<LngLatBounds> {
        self.category
            .as_ref()
            .and_then(|active| active.places.as_ref())
            .and_then(|places| places.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_pending_category_is_not_settled() {
        let mut active = ActiveCategory::pending("Q1", LoadToken(1), true);
        assert!(!active.settled());
        active.places = Some(PlaceCollection::empty());
        assert!(!active.settled());
        active.links = Some(LinkDoc::empty());
        assert!(active.settled());
    }

    #[test]
    fn bounds_require_loaded_places() {
        let session = Session::default();
        assert_eq!(session.places_bounds(), None);

        let mut session = Session::default();
        let mut active = ActiveCategory::pending("Q1", LoadToken(1), true);
        active.places = Some(PlaceCollection::empty());
        session.category = Some(active);
        assert_eq!(session.places_bounds(), None);
    }
}
