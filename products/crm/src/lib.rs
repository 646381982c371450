//! CRM sales pipeline engine.
//!
//! Deals live in a [`DealStore`] and sit in one of six fixed stages. The
//! board moves them with a [`DragSession`]; rollups in [`rollup`] and the
//! column projection in [`board`] are recomputed from the store snapshot
//! after every change.

pub mod board;
pub mod config;
pub mod deal;
pub mod drag;
pub mod error;
pub mod replay;
pub mod rollup;
pub mod seed;
pub mod stage;
pub mod store;

pub use board::{Board, BoardColumn, Highlight};
pub use config::PipelineConfig;
pub use deal::{Deal, DealField, DealId, DealPatch, NewDeal};
pub use drag::{DragSession, DragState, DropOutcome};
pub use error::{PipelineError, PipelineResult};
pub use replay::{PipelineCommand, Replayer};
pub use rollup::PipelineSummary;
pub use seed::SeedSet;
pub use stage::{Stage, StageId};
pub use store::{DealStore, StageChange};
