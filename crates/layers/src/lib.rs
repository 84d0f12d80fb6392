pub mod expr;
pub mod filter;
pub mod style;

pub use expr::*;
pub use filter::*;
pub use style::*;
