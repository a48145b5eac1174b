//! Two-pass layout of a batch of sequences in shared storage.
//!
//! Pass one ([`LayoutPlan::plan`]) resolves every row into an outcome and
//! sums up the lengths of the rows that succeeded. No output storage exists
//! at that point. The elements buffer is then allocated once with the exact
//! total ([`LayoutPlan::allocate`]), and pass two ([`LayoutPlan::fill`])
//! walks the rows in order, assigns each successful row the next disjoint
//! slice of the buffer, and hands the slice to a writer.

use std::ops::Range;

use arrow_buffer::{BooleanBuffer, NullBuffer};
use rayon::prelude::*;

use amudai_common::{Result, error::Error};

use crate::{batch::RowError, error::SequenceError};

/// Position of one row's sequence within the elements buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceDescriptor {
    pub length: u32,
    pub offset: u32,
}

impl SequenceDescriptor {
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// A row that passed validation: start and step in step units, and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSequence {
    pub start: i64,
    pub step: i64,
    pub length: u32,
}

/// Outcome of the first pass for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Not selected, or has a null argument.
    Inactive,
    Failed(SequenceError),
    Planned(PlannedSequence),
}

impl From<std::result::Result<PlannedSequence, SequenceError>> for RowOutcome {
    fn from(res: std::result::Result<PlannedSequence, SequenceError>) -> Self {
        match res {
            Ok(planned) => RowOutcome::Planned(planned),
            Err(e) => RowOutcome::Failed(e),
        }
    }
}

/// Offsets and lengths of every row, produced by the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub offsets: Vec<u32>,
    pub lengths: Vec<u32>,
}

/// Per-row outcomes of the first pass, and the exact total element count.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    outcomes: Vec<RowOutcome>,
    total_len: u64,
}

impl LayoutPlan {
    /// Runs the first pass: resolves each of `num_rows` rows with `plan_row`.
    ///
    /// `plan_row` must be pure, with `parallel` it is invoked concurrently
    /// from the rayon pool.
    pub fn plan<F>(num_rows: usize, parallel: bool, plan_row: F) -> LayoutPlan
    where
        F: Fn(usize) -> RowOutcome + Sync + Send,
    {
        let outcomes: Vec<RowOutcome> = if parallel {
            (0..num_rows).into_par_iter().map(&plan_row).collect()
        } else {
            (0..num_rows).map(&plan_row).collect()
        };
        LayoutPlan::from_outcomes(outcomes)
    }

    pub fn from_outcomes(outcomes: Vec<RowOutcome>) -> LayoutPlan {
        let total_len = outcomes
            .iter()
            .map(|outcome| match outcome {
                RowOutcome::Planned(planned) => planned.length as u64,
                _ => 0,
            })
            .sum();
        LayoutPlan {
            outcomes,
            total_len,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    /// Sum of the lengths of all planned rows.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Allocates the elements buffer, sized exactly to [`total_len`](Self::total_len).
    ///
    /// # Errors
    ///
    /// Fails if the total does not fit `u32` offsets, or if the allocation fails.
    pub fn allocate<N: Copy + Default>(&self) -> Result<Vec<N>> {
        if self.total_len > u32::MAX as u64 {
            return Err(Error::capacity_exceeded(
                "sequence elements",
                self.total_len,
                u32::MAX as u64,
            ));
        }
        let total_len = self.total_len as usize;
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(total_len)
            .map_err(|e| Error::allocation("sequence elements", e))?;
        elements.resize(total_len, N::default());
        Ok(elements)
    }

    /// Runs the second pass: assigns row offsets in row order and fills each
    /// planned row's slice of `elements` using `write(dst, start, step)`.
    ///
    /// Rows without a sequence get length zero and the offset of the next
    /// sequence, keeping the offsets non-decreasing.
    ///
    /// # Panics
    ///
    /// Panics if `elements` was not sized by [`allocate`](Self::allocate).
    pub fn fill<N, W>(&self, elements: &mut [N], parallel: bool, write: W) -> RowLayout
    where
        N: Send,
        W: Fn(&mut [N], i64, i64) + Sync + Send,
    {
        assert_eq!(elements.len() as u64, self.total_len);
        let num_rows = self.num_rows();
        let mut offsets = Vec::with_capacity(num_rows);
        let mut lengths = Vec::with_capacity(num_rows);
        let mut tasks = Vec::new();

        let mut cursor = 0u32;
        let mut rest = elements;
        for outcome in &self.outcomes {
            offsets.push(cursor);
            match outcome {
                RowOutcome::Planned(planned) => {
                    lengths.push(planned.length);
                    cursor += planned.length;
                    let (dst, tail) =
                        std::mem::take(&mut rest).split_at_mut(planned.length as usize);
                    rest = tail;
                    if parallel {
                        tasks.push((dst, planned.start, planned.step));
                    } else {
                        write(dst, planned.start, planned.step);
                    }
                }
                RowOutcome::Inactive | RowOutcome::Failed(_) => lengths.push(0),
            }
        }
        debug_assert!(rest.is_empty());

        if parallel {
            tasks
                .into_par_iter()
                .for_each(|(dst, start, step)| write(dst, start, step));
        }

        RowLayout { offsets, lengths }
    }

    /// Validity of the output rows: set only for planned rows.
    pub fn validity(&self) -> NullBuffer {
        NullBuffer::new(BooleanBuffer::from_iter(
            self.outcomes
                .iter()
                .map(|outcome| matches!(outcome, RowOutcome::Planned(_))),
        ))
    }

    /// Row-scoped failures, in row order.
    pub fn errors(&self) -> Vec<RowError> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(row, outcome)| match outcome {
                RowOutcome::Failed(error) => Some(RowError { row, error: *error }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutPlan, PlannedSequence, RowOutcome};
    use crate::error::SequenceError;

    fn planned(start: i64, step: i64, length: u32) -> RowOutcome {
        RowOutcome::Planned(PlannedSequence {
            start,
            step,
            length,
        })
    }

    fn sample_plan() -> LayoutPlan {
        LayoutPlan::from_outcomes(vec![
            planned(1, 1, 3),
            RowOutcome::Inactive,
            RowOutcome::Failed(SequenceError::StepIsZero),
            planned(10, -2, 2),
            planned(0, 1, 1),
        ])
    }

    fn write_i64(dst: &mut [i64], start: i64, step: i64) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = start + step * i as i64;
        }
    }

    #[test]
    fn test_total_len() {
        let plan = sample_plan();
        assert_eq!(plan.num_rows(), 5);
        assert_eq!(plan.total_len(), 6);
        assert_eq!(plan.allocate::<i64>().unwrap().len(), 6);
    }

    #[test]
    fn test_fill_sequential() {
        let plan = sample_plan();
        let mut elements = plan.allocate::<i64>().unwrap();
        let layout = plan.fill(&mut elements, false, write_i64);
        assert_eq!(layout.offsets, vec![0, 3, 3, 3, 5]);
        assert_eq!(layout.lengths, vec![3, 0, 0, 2, 1]);
        assert_eq!(elements, vec![1, 2, 3, 10, 8, 0]);
    }

    #[test]
    fn test_fill_parallel_matches_sequential() {
        let outcomes = (0..1000)
            .map(|i| match i % 7 {
                0 => RowOutcome::Inactive,
                3 => RowOutcome::Failed(SequenceError::DirectionMismatch),
                _ => planned(i, (i % 5) + 1, (i % 11) as u32 + 1),
            })
            .collect::<Vec<_>>();
        let plan = LayoutPlan::from_outcomes(outcomes);

        let mut sequential = plan.allocate::<i64>().unwrap();
        let seq_layout = plan.fill(&mut sequential, false, write_i64);
        let mut parallel = plan.allocate::<i64>().unwrap();
        let par_layout = plan.fill(&mut parallel, true, write_i64);

        assert_eq!(seq_layout, par_layout);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_plan() {
        let plan = LayoutPlan::plan(100, true, |row| {
            if row % 2 == 0 {
                planned(row as i64, 1, 2)
            } else {
                RowOutcome::Inactive
            }
        });
        assert_eq!(plan.total_len(), 100);
        assert_eq!(plan.outcomes()[1], RowOutcome::Inactive);
        assert_eq!(plan.outcomes()[2], planned(2, 1, 2));
    }

    #[test]
    fn test_validity_and_errors() {
        let plan = sample_plan();
        let validity = plan.validity();
        assert_eq!(
            validity.iter().collect::<Vec<_>>(),
            vec![true, false, false, true, true]
        );
        let errors = plan.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 2);
        assert_eq!(errors[0].error, SequenceError::StepIsZero);
    }

    #[test]
    fn test_capacity_exceeded() {
        let outcomes = vec![planned(0, 1, u32::MAX), planned(0, 1, 1)];
        let plan = LayoutPlan::from_outcomes(outcomes);
        assert!(plan.allocate::<i64>().is_err());
    }
}
