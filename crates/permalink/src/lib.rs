pub mod fragment;
pub mod state;

pub use fragment::*;
pub use state::*;
