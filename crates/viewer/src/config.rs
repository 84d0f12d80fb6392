//! Viewer configuration.

use loader::ResourcePaths;

/// Languages the published datasets carry labels for. The default language
/// must be first so it always resolves.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewerConfig {
    pub paths: ResourcePaths,
}
