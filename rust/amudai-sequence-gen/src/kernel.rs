//! Batch driver of the sequence generation.

use std::sync::Arc;

use arrow_array::{
    PrimitiveArray,
    types::{Date32Type, Int64Type, TimestampMillisecondType},
};
use arrow_buffer::{BooleanBuffer, ScalarBuffer};

use amudai_common::Result;

use crate::{
    args::SequenceArgs,
    batch::SequenceBatch,
    domain::{DomainAdapter, SequenceDomain},
    layout::{LayoutPlan, PlannedSequence, RowOutcome},
    length::sequence_length,
    options::SequenceOptions,
    writer::write_sequence,
};

/// Expands batches of `(start, stop, step)` rows into sequences.
///
/// The kernel holds no state besides its options and can be shared freely
/// between threads evaluating independent batches.
#[derive(Debug, Clone, Default)]
pub struct SequenceKernel {
    options: SequenceOptions,
}

impl SequenceKernel {
    pub fn new(options: SequenceOptions) -> Result<SequenceKernel> {
        options.validate()?;
        Ok(SequenceKernel { options })
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    /// Evaluates a batch.
    ///
    /// Only rows set in `selection` (all rows when `None`) and with no null
    /// argument are generated; all other rows are null in the result. A row
    /// with invalid arguments is null as well, and its error is reported in
    /// [`SequenceBatch::errors`].
    ///
    /// # Errors
    ///
    /// Fails for the batch as a whole only if `selection` does not match the
    /// arguments, or if the output cannot be allocated.
    pub fn evaluate(
        &self,
        args: &SequenceArgs,
        selection: Option<&BooleanBuffer>,
    ) -> Result<SequenceBatch> {
        let active = args.active_rows(selection)?;
        match args.domain() {
            SequenceDomain::Int64 => self.evaluate_typed::<Int64Type>(args, &active),
            SequenceDomain::Date => self.evaluate_typed::<Date32Type>(args, &active),
            SequenceDomain::Timestamp => {
                self.evaluate_typed::<TimestampMillisecondType>(args, &active)
            }
        }
    }

    fn evaluate_typed<T: DomainAdapter>(
        &self,
        args: &SequenceArgs,
        active: &BooleanBuffer,
    ) -> Result<SequenceBatch> {
        let start_values = args.start_values::<T>()?;
        let stop_values = args.stop_values::<T>()?;
        let step_values = args.step();
        let num_rows = args.num_rows();
        let max_entries = self.options.max_result_entries;
        let parallel = self.options.is_parallel(num_rows);

        let plan = LayoutPlan::plan(num_rows, parallel, |row| {
            if !active.value(row) {
                return RowOutcome::Inactive;
            }
            let start = T::to_step_unit(start_values.value(row));
            let stop = T::to_step_unit(stop_values.value(row));
            let raw_step = step_values.map(|s| s.raw_step(row));
            T::DOMAIN
                .resolve_step(start, stop, raw_step)
                .and_then(|step| {
                    let length = sequence_length(start, stop, step, max_entries)?;
                    Ok(PlannedSequence {
                        start,
                        step,
                        length,
                    })
                })
                .into()
        });

        let mut elements = plan.allocate::<T::Native>()?;
        let layout = plan.fill(&mut elements, parallel, write_sequence::<T>);
        let errors = plan.errors();

        log::debug!(
            "sequence batch: domain={:?} rows={} active={} failed={} elements={} parallel={}",
            T::DOMAIN,
            num_rows,
            active.count_set_bits(),
            errors.len(),
            elements.len(),
            parallel
        );
        for e in &errors {
            log::trace!("sequence row {} failed: {}", e.row, e.error);
        }

        let elements = PrimitiveArray::<T>::new(ScalarBuffer::from(elements), None)
            .with_data_type(args.element_data_type().clone());
        Ok(SequenceBatch::new(
            T::DOMAIN,
            layout.offsets,
            layout.lengths,
            Arc::new(elements),
            plan.validity(),
            errors,
        ))
    }
}
