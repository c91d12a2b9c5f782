//! Graph materialization for cidgraph.
//!
//! Recursively fetches a linked-object graph rooted at one content reference
//! and writes each distinct node to a file, rewriting link fields to relative
//! paths. Cycles are guarded by a per-run visited set; a failed nested branch
//! is pruned (logged, skipped) rather than aborting the whole tree.
//!
//! # Key Types
//!
//! - [`Materializer`] — The recursive graph-to-files walker
//! - [`LabelTable`] — Optional label → canonical-identifier lookup for
//!   friendlier root filenames
//! - [`TransactionItem`] — Batch entry point input

pub mod error;
pub mod labels;
pub mod materialize;
pub mod transaction;

pub use error::{MaterializeError, MaterializeResult};
pub use labels::LabelTable;
pub use materialize::Materializer;
pub use transaction::{convert_group_key, TransactionItem};
