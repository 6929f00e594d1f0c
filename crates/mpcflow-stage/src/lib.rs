//! Shard-combine stage orchestration.
//!
//! One stage of the private-computation pipeline: resolve which prior
//! stage's output feeds the shard combiner, assemble the worker job's
//! argument bundle, dispatch exactly one worker job through the launch
//! seam, and reconcile instance status against the job's live state.

mod arguments;
mod combine;
mod error;
mod resolver;

pub use arguments::{CombinerJobArgs, assemble};
pub use combine::{SHARD_COMBINER_BINARY, SHARD_COMBINER_GAME, ShardCombinerStage};
pub use error::StageError;
pub use resolver::resolve_input_path;
