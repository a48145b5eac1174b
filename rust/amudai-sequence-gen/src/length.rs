//! Exact length of a sequence, computed before any output is allocated.

use crate::error::SequenceError;

/// Computes the number of entries of the sequence `start, start + step, ...`
/// that do not pass `stop`.
///
/// All arguments are in step units. The range is computed in `i128`, so any
/// pair of `i64` bounds is handled without overflow.
///
/// # Errors
///
/// - [`SequenceError::StepIsZero`] if `step` is zero.
/// - [`SequenceError::DirectionMismatch`] if `step` points away from `stop`.
/// - [`SequenceError::ResultTooLarge`] if the sequence would have more than
///   `max_entries` entries.
///
/// A successful result is always at least 1.
#[inline]
pub fn sequence_length(
    start: i64,
    stop: i64,
    step: i64,
    max_entries: u32,
) -> Result<u32, SequenceError> {
    if step == 0 {
        return Err(SequenceError::StepIsZero);
    }
    if (step > 0 && stop < start) || (step < 0 && stop > start) {
        return Err(SequenceError::DirectionMismatch);
    }
    let count = (stop as i128 - start as i128) / step as i128 + 1;
    if count > max_entries as i128 {
        return Err(SequenceError::ResultTooLarge { max: max_entries });
    }
    debug_assert!(count >= 1);
    Ok(count as u32)
}
