//! Wires header parsing, decoding, DSP, and validation into a concurrent
//! per-file pipeline with cooperative cancellation and progress reporting.

mod counters;
mod options;
mod orchestrator;
mod pipeline;

pub use counters::BatchSummary;
pub use options::{BatchInput, BatchOptions};
pub use orchestrator::{run_batch, BatchOutcome};
