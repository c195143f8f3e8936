//! Pipeline components: context, poller, router, delivery workers,
//! orchestration.

pub mod context;
pub mod delivery;
pub mod error_handler;
pub mod orchestrator;
pub mod poller;
pub mod router;

pub use context::{
    PipelineChannels, PipelineContext, PipelineHandles, create_pipeline_channels,
};
pub use delivery::spawn_delivery_workers;
pub use error_handler::check_for_fatal_or_failed;
pub use orchestrator::{join_pipeline_handles, run_pipeline, shutdown_pipeline};
pub use poller::spawn_poller_thread;
pub use router::{RouteError, Router};
