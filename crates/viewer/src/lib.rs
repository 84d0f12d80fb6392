pub mod config;
pub mod controller;
pub mod events;

pub use config::*;
pub use controller::*;
pub use events::*;
