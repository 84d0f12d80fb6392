pub mod digits;
pub mod geo;
pub mod locale;

// Foundation crate: small, well-tested primitives only.
pub use digits::*;
pub use geo::*;
pub use locale::*;
