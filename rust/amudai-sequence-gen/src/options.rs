//! Configuration of the sequence kernel.

use amudai_common::{Result, error::Error};

/// Maximum number of entries a single generated sequence may contain.
pub const MAX_RESULT_ENTRIES: u32 = 10_000;

/// Minimum number of rows in a batch for the passes to run on the rayon pool.
pub const DEFAULT_PARALLEL_MIN_ROWS: usize = 64 * 1024;

/// Options for [`SequenceKernel`](crate::kernel::SequenceKernel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Upper bound on the length of each row's sequence. Rows producing more
    /// entries fail with [`SequenceError::ResultTooLarge`](crate::SequenceError::ResultTooLarge).
    pub max_result_entries: u32,
    /// Batches with at least this many rows are evaluated in parallel.
    /// `usize::MAX` disables parallel evaluation.
    pub parallel_min_rows: usize,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        SequenceOptions {
            max_result_entries: MAX_RESULT_ENTRIES,
            parallel_min_rows: DEFAULT_PARALLEL_MIN_ROWS,
        }
    }
}

impl SequenceOptions {
    pub fn with_max_result_entries(mut self, max_result_entries: u32) -> Self {
        self.max_result_entries = max_result_entries;
        self
    }

    pub fn with_parallel_min_rows(mut self, parallel_min_rows: usize) -> Self {
        self.parallel_min_rows = parallel_min_rows;
        self
    }

    /// Always evaluate sequentially.
    pub fn sequential(self) -> Self {
        self.with_parallel_min_rows(usize::MAX)
    }

    /// Validates the options and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_result_entries == 0 || self.max_result_entries > MAX_RESULT_ENTRIES {
            return Err(Error::invalid_arg(
                "max_result_entries",
                format!(
                    "must be between 1 and {MAX_RESULT_ENTRIES}, got {}",
                    self.max_result_entries
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn is_parallel(&self, num_rows: usize) -> bool {
        num_rows >= self.parallel_min_rows
    }
}
