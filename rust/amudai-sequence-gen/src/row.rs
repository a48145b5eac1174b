//! Scalar view of a single sequence row.

use arrow_array::types::{Date32Type, Int64Type, TimestampMillisecondType};

use crate::{
    domain::{DomainAdapter, SequenceDomain},
    error::SequenceError,
    length::sequence_length,
    options::MAX_RESULT_ENTRIES,
    writer::write_sequence,
};

/// A single value of one of the sequence domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainValue {
    Int64(i64),
    /// Days since epoch.
    Date(i32),
    /// Milliseconds since epoch.
    Timestamp(i64),
}

impl DomainValue {
    pub fn domain(&self) -> SequenceDomain {
        match self {
            DomainValue::Int64(_) => SequenceDomain::Int64,
            DomainValue::Date(_) => SequenceDomain::Date,
            DomainValue::Timestamp(_) => SequenceDomain::Timestamp,
        }
    }

    pub fn to_step_unit(&self) -> i64 {
        match *self {
            DomainValue::Int64(v) => Int64Type::to_step_unit(v),
            DomainValue::Date(v) => Date32Type::to_step_unit(v),
            DomainValue::Timestamp(v) => TimestampMillisecondType::to_step_unit(v),
        }
    }

    pub fn from_step_unit(domain: SequenceDomain, units: i64) -> DomainValue {
        match domain {
            SequenceDomain::Int64 => DomainValue::Int64(Int64Type::from_step_unit(units)),
            SequenceDomain::Date => DomainValue::Date(Date32Type::from_step_unit(units)),
            SequenceDomain::Timestamp => {
                DomainValue::Timestamp(TimestampMillisecondType::from_step_unit(units))
            }
        }
    }
}

/// The `(start, stop, step)` arguments of one row.
///
/// `step` is the raw step argument: plain units for integers, milliseconds
/// for dates and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTriple {
    start: DomainValue,
    stop: DomainValue,
    step: Option<i64>,
}

impl RowTriple {
    pub fn int64(start: i64, stop: i64, step: Option<i64>) -> RowTriple {
        RowTriple {
            start: DomainValue::Int64(start),
            stop: DomainValue::Int64(stop),
            step,
        }
    }

    pub fn date(start_days: i32, stop_days: i32, step_millis: Option<i64>) -> RowTriple {
        RowTriple {
            start: DomainValue::Date(start_days),
            stop: DomainValue::Date(stop_days),
            step: step_millis,
        }
    }

    pub fn timestamp(start_millis: i64, stop_millis: i64, step_millis: i64) -> RowTriple {
        RowTriple {
            start: DomainValue::Timestamp(start_millis),
            stop: DomainValue::Timestamp(stop_millis),
            step: Some(step_millis),
        }
    }

    pub fn start(&self) -> DomainValue {
        self.start
    }

    pub fn stop(&self) -> DomainValue {
        self.stop
    }

    pub fn step(&self) -> Option<i64> {
        self.step
    }

    pub fn domain(&self) -> SequenceDomain {
        self.start.domain()
    }

    /// Returns the effective step in step units and the sequence length.
    ///
    /// `max_entries` is capped at [`MAX_RESULT_ENTRIES`].
    pub fn resolve(&self, max_entries: u32) -> Result<(i64, u32), SequenceError> {
        let start = self.start.to_step_unit();
        let stop = self.stop.to_step_unit();
        let step = self.domain().resolve_step(start, stop, self.step)?;
        let len = sequence_length(start, stop, step, max_entries.min(MAX_RESULT_ENTRIES))?;
        Ok((step, len))
    }

    /// Expands this row into its sequence of values.
    pub fn expand(&self, max_entries: u32) -> Result<Vec<DomainValue>, SequenceError> {
        let (step, len) = self.resolve(max_entries)?;
        let start = self.start.to_step_unit();
        let values = match self.start {
            DomainValue::Int64(_) => expand_as::<Int64Type>(start, step, len, DomainValue::Int64),
            DomainValue::Date(_) => expand_as::<Date32Type>(start, step, len, DomainValue::Date),
            DomainValue::Timestamp(_) => {
                expand_as::<TimestampMillisecondType>(start, step, len, DomainValue::Timestamp)
            }
        };
        Ok(values)
    }
}

fn expand_as<T: DomainAdapter>(
    start: i64,
    step: i64,
    len: u32,
    wrap: impl Fn(T::Native) -> DomainValue,
) -> Vec<DomainValue> {
    let mut buf = vec![T::Native::default(); len as usize];
    write_sequence::<T>(&mut buf, start, step);
    buf.into_iter().map(wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::{DomainValue, RowTriple};
    use crate::{
        domain::{MILLIS_PER_DAY, SequenceDomain},
        error::SequenceError,
        options::MAX_RESULT_ENTRIES,
    };

    fn ints(triple: RowTriple) -> Vec<i64> {
        triple
            .expand(MAX_RESULT_ENTRIES)
            .unwrap()
            .into_iter()
            .map(|v| match v {
                DomainValue::Int64(v) => v,
                other => panic!("unexpected value {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_expand_int64() {
        assert_eq!(ints(RowTriple::int64(1, 5, None)), vec![1, 2, 3, 4, 5]);
        assert_eq!(ints(RowTriple::int64(5, 1, None)), vec![5, 4, 3, 2, 1]);
        assert_eq!(ints(RowTriple::int64(1, 9, Some(2))), vec![1, 3, 5, 7, 9]);
        assert_eq!(ints(RowTriple::int64(1, 1, Some(1))), vec![1]);
        assert_eq!(
            RowTriple::int64(1, 20_000, None).expand(MAX_RESULT_ENTRIES),
            Err(SequenceError::ResultTooLarge { max: 10_000 })
        );
    }

    #[test]
    fn test_expand_date() {
        // 2020-01-01 is day 18262.
        let values = RowTriple::date(18262, 18264, None)
            .expand(MAX_RESULT_ENTRIES)
            .unwrap();
        assert_eq!(
            values,
            vec![
                DomainValue::Date(18262),
                DomainValue::Date(18263),
                DomainValue::Date(18264)
            ]
        );

        let values = RowTriple::date(18264, 18258, Some(-2 * MILLIS_PER_DAY))
            .expand(MAX_RESULT_ENTRIES)
            .unwrap();
        assert_eq!(
            values,
            vec![
                DomainValue::Date(18264),
                DomainValue::Date(18262),
                DomainValue::Date(18260),
                DomainValue::Date(18258)
            ]
        );

        assert_eq!(
            RowTriple::date(18262, 18264, Some(3_600_000)).expand(MAX_RESULT_ENTRIES),
            Err(SequenceError::InvalidDateStep)
        );
        assert_eq!(
            RowTriple::date(18262, 18264, Some(0)).expand(MAX_RESULT_ENTRIES),
            Err(SequenceError::StepIsZero)
        );
    }

    #[test]
    fn test_expand_timestamp() {
        let triple = RowTriple::timestamp(0, 1_000, 300);
        assert_eq!(triple.domain(), SequenceDomain::Timestamp);
        assert_eq!(triple.resolve(MAX_RESULT_ENTRIES), Ok((300, 4)));
        assert_eq!(
            triple.expand(MAX_RESULT_ENTRIES).unwrap(),
            vec![
                DomainValue::Timestamp(0),
                DomainValue::Timestamp(300),
                DomainValue::Timestamp(600),
                DomainValue::Timestamp(900)
            ]
        );
        assert_eq!(
            RowTriple::timestamp(0, 1_000, -1).expand(MAX_RESULT_ENTRIES),
            Err(SequenceError::DirectionMismatch)
        );
    }

    #[test]
    fn test_max_entries_capped() {
        let row = RowTriple::int64(0, MAX_RESULT_ENTRIES as i64, None);
        assert_eq!(
            row.expand(MAX_RESULT_ENTRIES + 1),
            Err(SequenceError::ResultTooLarge { max: 10_000 })
        );
        assert_eq!(
            RowTriple::int64(0, 20_000, None).resolve(u32::MAX),
            Err(SequenceError::ResultTooLarge { max: 10_000 })
        );
        assert_eq!(
            RowTriple::int64(1, 10_000, None).resolve(u32::MAX),
            Ok((1, 10_000))
        );
        assert_eq!(
            RowTriple::int64(1, 4, None).resolve(3),
            Err(SequenceError::ResultTooLarge { max: 3 })
        );
    }

    #[test]
    fn test_domain_value_step_units() {
        for value in [
            DomainValue::Int64(-7),
            DomainValue::Date(18262),
            DomainValue::Timestamp(1_577_836_800_000),
        ] {
            let units = value.to_step_unit();
            assert_eq!(DomainValue::from_step_unit(value.domain(), units), value);
        }
    }
}
