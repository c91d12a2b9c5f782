//! Graph comparison for cidgraph.
//!
//! Resolves several independently-submitted root references believed to
//! represent the same logical record, fully inlines each one, and computes
//! structural differences between every pair to support a consensus decision.
//!
//! # Key Types
//!
//! - [`compare_roots`] / [`MultiComparisonResult`] — Multi-way comparison
//! - [`diff_values`] / [`Difference`] / [`ChangeKind`] — Structural JSON diff
//! - [`resolve_inline`] — Pointer inlining with cycle markers

pub mod compare;
pub mod diff;
pub mod error;
pub mod inline;

pub use compare::{compare_roots, CompareContext, ComparisonResult, MultiComparisonResult};
pub use diff::{diff_values, format_value, ChangeKind, Difference};
pub use error::{CompareError, CompareResult};
pub use inline::resolve_inline;
