//! C3: Event Log & Fan-out.

mod frame;
mod log;

pub use frame::{Frame, FrameData, FrameOp, Plot};
pub use log::{EventLog, ReadResult};
