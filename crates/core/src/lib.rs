#![forbid(unsafe_code)]

pub mod gate;
pub mod model;
pub mod time;

pub use gate::{ChapterGate, GatePolicy, GateSummary};
pub use time::Clock;
