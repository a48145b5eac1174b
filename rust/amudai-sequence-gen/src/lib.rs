//! Batch sequence generation for columnar data.
//!
//! This crate expands a batch of `(start, stop, step)` rows into arithmetic
//! progressions and packs all of them into a single flat elements array with
//! per-row offsets and lengths (the list-of-lists layout used by Arrow
//! `ListView` arrays).
//!
//! # Domains
//!
//! Three value domains are supported, each mapped onto a common signed
//! "step space" of `i64` units:
//!
//! - **Int64**: the value itself, step in the same units.
//! - **Date** (`Date32`): days since epoch. The step arrives as a millisecond
//!   interval and must be a whole number of days.
//! - **Timestamp** (`Timestamp(Millisecond, _)`): milliseconds since epoch.
//!
//! # Evaluation
//!
//! [`SequenceKernel::evaluate`](crate::kernel::SequenceKernel::evaluate) runs
//! in two passes. The first pass computes the exact length of every active row
//! without touching any output storage; the elements buffer is then allocated
//! exactly once, and the second pass assigns each row a disjoint slice of it
//! and fills the slice.
//!
//! Row failures (zero step, direction mismatch, too many entries, a date step
//! that is not a whole day) are isolated: the failing row becomes null in the
//! output and is reported in [`SequenceBatch::errors`](crate::batch::SequenceBatch::errors),
//! while the remaining rows are produced normally.
//!
//! # Main Components
//!
//! - [`domain`]: per-domain step-space conversions and step validation.
//! - [`length`]: overflow-safe sequence length computation.
//! - [`layout`]: the two-pass batch layout (lengths, allocation, offsets).
//! - [`writer`]: fills one row's slice with its progression.
//! - [`kernel`]: the batch driver.
//! - [`args`]: the accepted Arrow argument signatures.
//! - [`batch`]: the evaluation result and its Arrow conversions.
//! - [`row`]: a scalar, single-row view of the same computation.

pub mod args;
pub mod batch;
pub mod domain;
pub mod error;
pub mod kernel;
pub mod layout;
pub mod length;
pub mod options;
pub mod row;
pub mod writer;

pub use args::SequenceArgs;
pub use batch::{RowError, SequenceBatch};
pub use domain::{DomainAdapter, MILLIS_PER_DAY, SequenceDomain};
pub use error::SequenceError;
pub use kernel::SequenceKernel;
pub use options::{MAX_RESULT_ENTRIES, SequenceOptions};
pub use row::{DomainValue, RowTriple};
