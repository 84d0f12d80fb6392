pub mod error;
pub mod orchestrator;
pub mod session;
pub mod task;

pub use error::*;
pub use orchestrator::*;
pub use session::*;
pub use task::*;
