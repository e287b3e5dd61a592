mod engine;
mod models;

pub use engine::{CountdownHandle, DEFAULT_TICK, IDLE_TICK};
pub use models::{CountdownBadge, CountdownSnapshot, TODAY_THRESHOLD, URGENT_THRESHOLD};
