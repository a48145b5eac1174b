//! Value domains of a sequence and their mapping onto the common step space.
//!
//! Every domain value is converted into a signed `i64` "step unit" before any
//! arithmetic is done: the integer itself, a day count for dates, and a
//! millisecond count for timestamps. Steps are expressed in the same units,
//! so the length and writer stages are domain-agnostic.

use arrow_array::{
    ArrowPrimitiveType,
    types::{Date32Type, Int64Type, TimestampMillisecondType},
};
use arrow_schema::{DataType, TimeUnit};

use crate::error::SequenceError;

/// Number of milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Closed set of value domains a sequence can be generated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceDomain {
    /// 64-bit signed integers.
    Int64,
    /// Calendar dates, `Date32` days since epoch.
    Date,
    /// Timestamps with millisecond precision.
    Timestamp,
}

impl SequenceDomain {
    /// Resolves the domain of a start/stop argument type.
    ///
    /// Returns `None` for types no sequence can be generated over.
    pub fn from_data_type(data_type: &DataType) -> Option<SequenceDomain> {
        match data_type {
            DataType::Int64 => Some(SequenceDomain::Int64),
            DataType::Date32 => Some(SequenceDomain::Date),
            DataType::Timestamp(TimeUnit::Millisecond, _) => Some(SequenceDomain::Timestamp),
            _ => None,
        }
    }

    /// Whether a row of this domain can omit the step argument.
    pub fn has_default_step(self) -> bool {
        !matches!(self, SequenceDomain::Timestamp)
    }

    /// The implied step when none is supplied: one unit towards `stop`.
    ///
    /// `start` and `stop` are in step units, so for dates this is one day.
    #[inline]
    pub fn default_step(self, start: i64, stop: i64) -> i64 {
        if stop >= start { 1 } else { -1 }
    }

    /// Converts a raw step argument into step units of this domain.
    ///
    /// Integer and timestamp steps are taken as is. Date steps arrive in
    /// milliseconds and must be an exact number of days.
    #[inline]
    pub fn validate_step(self, raw_step: i64) -> Result<i64, SequenceError> {
        match self {
            SequenceDomain::Int64 | SequenceDomain::Timestamp => Ok(raw_step),
            SequenceDomain::Date => {
                if raw_step % MILLIS_PER_DAY != 0 {
                    return Err(SequenceError::InvalidDateStep);
                }
                Ok(raw_step / MILLIS_PER_DAY)
            }
        }
    }

    /// Resolves the effective step of a row, given its start and stop in step units.
    #[inline]
    pub fn resolve_step(
        self,
        start: i64,
        stop: i64,
        raw_step: Option<i64>,
    ) -> Result<i64, SequenceError> {
        match raw_step {
            Some(step) => self.validate_step(step),
            None => Ok(self.default_step(start, stop)),
        }
    }
}

/// Arrow primitive types that can hold the elements of a sequence.
///
/// Each implementation is the strategy for one [`SequenceDomain`], selected
/// once per batch by matching on the domain tag.
pub trait DomainAdapter: ArrowPrimitiveType {
    const DOMAIN: SequenceDomain;

    /// Maps a native value into step units.
    fn to_step_unit(value: Self::Native) -> i64;

    /// Maps step units back into a native value.
    fn from_step_unit(units: i64) -> Self::Native;
}

impl DomainAdapter for Int64Type {
    const DOMAIN: SequenceDomain = SequenceDomain::Int64;

    #[inline]
    fn to_step_unit(value: i64) -> i64 {
        value
    }

    #[inline]
    fn from_step_unit(units: i64) -> i64 {
        units
    }
}

impl DomainAdapter for Date32Type {
    const DOMAIN: SequenceDomain = SequenceDomain::Date;

    #[inline]
    fn to_step_unit(value: i32) -> i64 {
        i64::from(value)
    }

    /// Day counts outside of the `i32` range saturate.
    #[inline]
    fn from_step_unit(units: i64) -> i32 {
        units.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

impl DomainAdapter for TimestampMillisecondType {
    const DOMAIN: SequenceDomain = SequenceDomain::Timestamp;

    #[inline]
    fn to_step_unit(value: i64) -> i64 {
        value
    }

    #[inline]
    fn from_step_unit(units: i64) -> i64 {
        units
    }
}
