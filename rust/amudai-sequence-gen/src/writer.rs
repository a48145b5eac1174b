//! Fills the output slice of a single row.

use crate::domain::DomainAdapter;

/// Writes `dst.len()` entries of the progression `start + step * i` into `dst`,
/// converted to the native values of `T`.
///
/// `start` and `step` are in step units. Offsets are accumulated in `i128`,
/// the same width [`sequence_length`](crate::length::sequence_length) uses,
/// so no intermediate value can overflow. When `dst.len()` was produced by
/// `sequence_length` every entry lies within `start..=stop`.
#[inline]
pub fn write_sequence<T: DomainAdapter>(dst: &mut [T::Native], start: i64, step: i64) {
    let step = step as i128;
    let mut value = start as i128;
    for slot in dst.iter_mut() {
        *slot = T::from_step_unit(saturate_i64(value));
        value += step;
    }
}

#[inline]
fn saturate_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
