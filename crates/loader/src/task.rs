//! Fetch descriptions and the staleness token.

/// Identity tag carried by every in-flight load. Results are applied only
/// when their token still matches the current selection; anything else is
/// discarded at apply time. Tokens are never reused within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Background,
    Index,
    Nodes,
    Links,
}

/// One resource the driver should GET. The orchestrator never performs IO;
/// it hands these out and waits for the matching settle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: LoadToken,
    pub kind: FetchKind,
    /// Category the fetch belongs to, for `Nodes`/`Links`.
    pub category: Option<String>,
    pub path: String,
}

/// Where the published dataset lives, relative to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub background: String,
    pub data_root: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            background: "earth-coastlines-10km.geo.json".to_string(),
            data_root: "geojson".to_string(),
        }
    }
}

impl ResourcePaths {
    pub fn index(&self) -> String {
        format!("{}/index.json", self.data_root)
    }

    pub fn nodes(&self, id: &str) -> String {
        format!("{}/{id}-nodes.geojson", self.data_root)
    }

    pub fn links(&self, id: &str) -> String {
        format!("{}/{id}-links.geojson", self.data_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_the_category_id() {
        let paths = ResourcePaths::default();
        assert_eq!(paths.index(), "geojson/index.json");
        assert_eq!(paths.nodes("Q6465"), "geojson/Q6465-nodes.geojson");
        assert_eq!(paths.links("Q6465"), "geojson/Q6465-links.geojson");
        assert_eq!(paths.background, "earth-coastlines-10km.geo.json");
    }
}
