//! Row-scoped sequence errors.

use thiserror::Error;

/// A user-input error that invalidates a single row of the batch.
///
/// These never abort the evaluation of a batch: the row producing the error
/// is emitted as null and the error is reported alongside the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SequenceError {
    #[error("step must not be zero")]
    StepIsZero,

    #[error(
        "sequence stop value should be greater than or equal to start value if \
         step is greater than zero otherwise stop should be less than or equal to start"
    )]
    DirectionMismatch,

    #[error("result of sequence function must not have more than {max} entries")]
    ResultTooLarge { max: u32 },

    #[error("sequence step must be a day interval if start and end values are dates")]
    InvalidDateStep,
}
