//! Fetch pipeline: work queue, worker pool, outcome collector.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod worker;

pub use context::{CancelToken, PipelineChannels, PipelineTuning, create_pipeline_channels};
pub use error_handler::log_failures;
pub use orchestrator::{DispatchConfig, Dispatcher};
pub use worker::{WorkerShared, fetch_one, spawn_fetch_workers};
