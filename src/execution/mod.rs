//! Parallel fan-out execution.
//!
//! A bounded worker pool runs one task per council area and reports one
//! outcome per area, in area order, with per-item fault isolation.

pub mod pool;
pub mod stage;

pub use pool::WorkerPool;
pub use stage::{Stage, StageOutcome, StageReport};
