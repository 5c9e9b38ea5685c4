// Video preprocessing pipeline: task distribution, worker pool, and the
// per-task face frame state machine.

pub mod crop;
pub mod detection;
pub mod distributor;
pub mod frames;
pub mod orchestrator;
pub mod task;
pub mod types;
pub mod worker;
