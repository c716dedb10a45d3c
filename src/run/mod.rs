//! C6/C7: Run Controller and Run Registry, plus the `RunHandle` (C3's
//! sibling data model) and latch primitive they share.

mod controller;
mod handle;
mod latch;
mod registry;

pub use controller::{ControlOutcome, RunController, StartOutcome};
pub use handle::{RunConfig, RunHandle, RunStatus};
pub use latch::Latch;
pub use registry::RunRegistry;
