//! Resumable discovery of taken-down catalog games.
//!
//! [`DiscoveryPipeline`] walks the catalog page by page, resolves each item's
//! game id, probes it, and records confirmed takedowns in a [`Checkpoint`]
//! that is saved after every page, so an interrupted run resumes where it
//! stopped.

mod checkpoint;
mod pipeline;

pub use checkpoint::{Checkpoint, CheckpointError, CheckpointStore, TakedownRecord};
pub use pipeline::{
    CancelFlag, CatalogSource, DiscoveryError, DiscoveryPipeline, ItemFailurePolicy, RunReport,
    RunStatus, TakedownCheck,
};
