//! Arguments of a sequence evaluation.
//!
//! Accepted signatures:
//!
//! | start                    | stop                     | step                                      |
//! |--------------------------|--------------------------|-------------------------------------------|
//! | `Int64`                  | `Int64`                  | none or `Int64`                           |
//! | `Date32`                 | `Date32`                 | none, `Duration(ms)` or `Interval(DayTime)` |
//! | `Timestamp(ms, tz)`      | `Timestamp(ms, tz)`      | `Duration(ms)` or `Interval(DayTime)`     |

use arrow_array::{
    Array, ArrayRef, DurationMillisecondArray, Int64Array, IntervalDayTimeArray, PrimitiveArray,
    cast::AsArray,
    types::{
        Date32Type, DurationMillisecondType, Int64Type, IntervalDayTimeType,
        TimestampMillisecondType,
    },
};
use arrow_buffer::{BooleanBuffer, NullBuffer};
use arrow_schema::{DataType, IntervalUnit, TimeUnit};

use amudai_common::{Result, error::Error, verify_arg};

use crate::{
    domain::{DomainAdapter, MILLIS_PER_DAY, SequenceDomain},
    row::RowTriple,
};

/// Step argument column, decoded into raw step units on access.
#[derive(Debug, Clone)]
pub enum StepColumn {
    Int64(Int64Array),
    DurationMillis(DurationMillisecondArray),
    IntervalDayTime(IntervalDayTimeArray),
}

impl StepColumn {
    fn try_new(domain: SequenceDomain, array: &ArrayRef) -> Result<StepColumn> {
        match (domain, array.data_type()) {
            (SequenceDomain::Int64, DataType::Int64) => {
                Ok(StepColumn::Int64(array.as_primitive::<Int64Type>().clone()))
            }
            (
                SequenceDomain::Date | SequenceDomain::Timestamp,
                DataType::Duration(TimeUnit::Millisecond),
            ) => Ok(StepColumn::DurationMillis(
                array.as_primitive::<DurationMillisecondType>().clone(),
            )),
            (
                SequenceDomain::Date | SequenceDomain::Timestamp,
                DataType::Interval(IntervalUnit::DayTime),
            ) => Ok(StepColumn::IntervalDayTime(
                array.as_primitive::<IntervalDayTimeType>().clone(),
            )),
            (domain, data_type) => Err(Error::invalid_arg(
                "step",
                format!("unsupported step type {data_type} for {domain:?} sequence"),
            )),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StepColumn::Int64(a) => a.len(),
            StepColumn::DurationMillis(a) => a.len(),
            StepColumn::IntervalDayTime(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nulls(&self) -> Option<&NullBuffer> {
        match self {
            StepColumn::Int64(a) => a.nulls(),
            StepColumn::DurationMillis(a) => a.nulls(),
            StepColumn::IntervalDayTime(a) => a.nulls(),
        }
    }

    /// Raw step of a row: plain units for integers, milliseconds for intervals.
    #[inline]
    pub fn raw_step(&self, row: usize) -> i64 {
        match self {
            StepColumn::Int64(a) => a.value(row),
            StepColumn::DurationMillis(a) => a.value(row),
            StepColumn::IntervalDayTime(a) => {
                let v = a.value(row);
                v.days as i64 * MILLIS_PER_DAY + v.milliseconds as i64
            }
        }
    }
}

/// Validated argument columns of one batch.
#[derive(Debug, Clone)]
pub struct SequenceArgs {
    domain: SequenceDomain,
    start: ArrayRef,
    stop: ArrayRef,
    step: Option<StepColumn>,
}

impl SequenceArgs {
    /// Creates the arguments from `[start, stop]` or `[start, stop, step]` columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the column types do not form one of the accepted
    /// signatures, or if the columns differ in length.
    pub fn try_new(args: &[ArrayRef]) -> Result<SequenceArgs> {
        verify_arg!(args, args.len() == 2 || args.len() == 3);
        let start = args[0].clone();
        let stop = args[1].clone();
        let domain = SequenceDomain::from_data_type(start.data_type()).ok_or_else(|| {
            Error::invalid_arg(
                "start",
                format!("unsupported sequence type {}", start.data_type()),
            )
        })?;
        if stop.data_type() != start.data_type() {
            return Err(Error::invalid_arg(
                "stop",
                format!(
                    "stop type {} does not match start type {}",
                    stop.data_type(),
                    start.data_type()
                ),
            ));
        }
        verify_arg!(stop, stop.len() == start.len());

        let step = match args.get(2) {
            Some(step) => {
                verify_arg!(step, step.len() == start.len());
                Some(StepColumn::try_new(domain, step)?)
            }
            None if domain.has_default_step() => None,
            None => {
                return Err(Error::invalid_arg(
                    "step",
                    format!("{domain:?} sequence requires an explicit step"),
                ));
            }
        };

        Ok(SequenceArgs {
            domain,
            start,
            stop,
            step,
        })
    }

    pub fn domain(&self) -> SequenceDomain {
        self.domain
    }

    pub fn num_rows(&self) -> usize {
        self.start.len()
    }

    /// Data type of the generated elements, the same as the start column.
    pub fn element_data_type(&self) -> &DataType {
        self.start.data_type()
    }

    pub fn step(&self) -> Option<&StepColumn> {
        self.step.as_ref()
    }

    pub(crate) fn start_values<T: DomainAdapter>(&self) -> Result<&PrimitiveArray<T>> {
        typed_column::<T>("start", &self.start)
    }

    pub(crate) fn stop_values<T: DomainAdapter>(&self) -> Result<&PrimitiveArray<T>> {
        typed_column::<T>("stop", &self.stop)
    }

    /// Rows that are both selected and have no null argument.
    ///
    /// `selection` defaults to all rows.
    pub fn active_rows(&self, selection: Option<&BooleanBuffer>) -> Result<BooleanBuffer> {
        let num_rows = self.num_rows();
        if let Some(selection) = selection {
            verify_arg!(selection, selection.len() == num_rows);
        }
        let nulls = NullBuffer::union(self.start.nulls(), self.stop.nulls());
        let nulls = NullBuffer::union(nulls.as_ref(), self.step.as_ref().and_then(|s| s.nulls()));
        let active = match (selection, nulls) {
            (Some(selection), Some(nulls)) => selection & nulls.inner(),
            (Some(selection), None) => selection.clone(),
            (None, Some(nulls)) => nulls.into_inner(),
            (None, None) => BooleanBuffer::new_set(num_rows),
        };
        Ok(active)
    }

    /// Scalar view of a row, `None` if the row is out of bounds or has a null argument.
    pub fn row(&self, row: usize) -> Option<RowTriple> {
        if row >= self.num_rows()
            || self.start.is_null(row)
            || self.stop.is_null(row)
            || self
                .step
                .as_ref()
                .is_some_and(|s| s.nulls().is_some_and(|n| n.is_null(row)))
        {
            return None;
        }
        let step = self.step.as_ref().map(|s| s.raw_step(row));
        let triple = match self.domain {
            SequenceDomain::Int64 => {
                let start = self.start.as_primitive_opt::<Int64Type>()?;
                let stop = self.stop.as_primitive_opt::<Int64Type>()?;
                RowTriple::int64(start.value(row), stop.value(row), step)
            }
            SequenceDomain::Date => {
                let start = self.start.as_primitive_opt::<Date32Type>()?;
                let stop = self.stop.as_primitive_opt::<Date32Type>()?;
                RowTriple::date(start.value(row), stop.value(row), step)
            }
            SequenceDomain::Timestamp => {
                let start = self.start.as_primitive_opt::<TimestampMillisecondType>()?;
                let stop = self.stop.as_primitive_opt::<TimestampMillisecondType>()?;
                RowTriple::timestamp(start.value(row), stop.value(row), step?)
            }
        };
        Some(triple)
    }
}

fn typed_column<'a, T: DomainAdapter>(
    name: &str,
    array: &'a ArrayRef,
) -> Result<&'a PrimitiveArray<T>> {
    array.as_primitive_opt::<T>().ok_or_else(|| {
        Error::invalid_arg(
            name,
            format!(
                "expected {:?} column, got {}",
                T::DOMAIN,
                array.data_type()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_array::{
        ArrayRef, Date32Array, DurationMillisecondArray, Int32Array, Int64Array,
        IntervalDayTimeArray, TimestampMillisecondArray,
    };
    use arrow_buffer::{BooleanBuffer, IntervalDayTime};

    use super::SequenceArgs;
    use crate::{
        domain::{MILLIS_PER_DAY, SequenceDomain},
        row::RowTriple,
    };

    fn int64(values: Vec<Option<i64>>) -> ArrayRef {
        Arc::new(Int64Array::from(values))
    }

    #[test]
    fn test_int64_signatures() {
        let args = SequenceArgs::try_new(&[int64(vec![Some(1)]), int64(vec![Some(5)])]).unwrap();
        assert_eq!(args.domain(), SequenceDomain::Int64);
        assert!(args.step().is_none());
        assert_eq!(args.row(0), Some(RowTriple::int64(1, 5, None)));

        let args = SequenceArgs::try_new(&[
            int64(vec![Some(1)]),
            int64(vec![Some(9)]),
            int64(vec![Some(2)]),
        ])
        .unwrap();
        assert_eq!(args.row(0), Some(RowTriple::int64(1, 9, Some(2))));
        assert_eq!(args.row(1), None);
    }

    #[test]
    fn test_rejected_signatures() {
        let ints: ArrayRef = Arc::new(Int32Array::from(vec![1]));
        assert!(SequenceArgs::try_new(&[ints.clone(), ints]).is_err());

        let dates: ArrayRef = Arc::new(Date32Array::from(vec![1]));
        assert!(SequenceArgs::try_new(&[int64(vec![Some(1)]), dates.clone()]).is_err());
        assert!(
            SequenceArgs::try_new(&[dates.clone(), dates.clone(), int64(vec![Some(1)])]).is_err()
        );
        assert!(SequenceArgs::try_new(&[dates]).is_err());

        let ts: ArrayRef = Arc::new(TimestampMillisecondArray::from(vec![1]));
        assert!(SequenceArgs::try_new(&[ts.clone(), ts]).is_err());

        assert!(
            SequenceArgs::try_new(&[int64(vec![Some(1), Some(2)]), int64(vec![Some(1)])])
                .is_err()
        );
    }

    #[test]
    fn test_date_interval_steps() {
        let dates: ArrayRef = Arc::new(Date32Array::from(vec![18262]));
        let day_time: ArrayRef = Arc::new(IntervalDayTimeArray::from(vec![IntervalDayTime::new(2, 0)]));
        let args = SequenceArgs::try_new(&[dates.clone(), dates.clone(), day_time]).unwrap();
        assert_eq!(
            args.row(0),
            Some(RowTriple::date(18262, 18262, Some(2 * MILLIS_PER_DAY)))
        );

        let duration: ArrayRef = Arc::new(DurationMillisecondArray::from(vec![MILLIS_PER_DAY]));
        let args = SequenceArgs::try_new(&[dates.clone(), dates, duration]).unwrap();
        assert_eq!(args.step().unwrap().raw_step(0), MILLIS_PER_DAY);
    }

    #[test]
    fn test_timestamp_timezone_preserved() {
        let ts: ArrayRef =
            Arc::new(TimestampMillisecondArray::from(vec![0, 10]).with_timezone("UTC"));
        let step: ArrayRef = Arc::new(DurationMillisecondArray::from(vec![5, 5]));
        let args = SequenceArgs::try_new(&[ts.clone(), ts.clone(), step]).unwrap();
        assert_eq!(args.element_data_type(), ts.data_type());
        assert_eq!(args.row(1), Some(RowTriple::timestamp(10, 10, 5)));
    }

    #[test]
    fn test_active_rows() {
        let args = SequenceArgs::try_new(&[
            int64(vec![Some(1), None, Some(3), Some(4)]),
            int64(vec![Some(5), Some(5), Some(5), Some(5)]),
            int64(vec![Some(1), Some(1), None, Some(1)]),
        ])
        .unwrap();
        let all = args.active_rows(None).unwrap();
        assert_eq!(all.iter().collect::<Vec<_>>(), vec![true, false, false, true]);

        let selection = BooleanBuffer::from(vec![true, true, true, false]);
        let active = args.active_rows(Some(&selection)).unwrap();
        assert_eq!(
            active.iter().collect::<Vec<_>>(),
            vec![true, false, false, false]
        );

        let short = BooleanBuffer::from(vec![true]);
        assert!(args.active_rows(Some(&short)).is_err());
    }
}
