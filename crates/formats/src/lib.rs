pub mod index;
pub mod labels;
pub mod links;
pub mod places;

pub use index::*;
pub use labels::*;
pub use links::*;
pub use places::*;
