//! Result of a batch sequence evaluation.

use std::{ops::Range, sync::Arc};

use arrow_array::{Array, ArrayRef, ListArray, ListViewArray};
use arrow_buffer::{NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow_schema::Field;

use amudai_common::{Result, error::Error};

use crate::{domain::SequenceDomain, error::SequenceError, layout::SequenceDescriptor};

/// An error attributed to one row of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub error: SequenceError,
}

/// Generated sequences of a batch in list-of-lists form.
///
/// All sequences are stored back to back in a single `elements` array.
/// Row `i` spans `elements[offsets[i]..offsets[i] + lengths[i]]`. Rows that
/// were not selected, had a null argument, or failed, are null and have
/// length zero.
#[derive(Debug, Clone)]
pub struct SequenceBatch {
    domain: SequenceDomain,
    offsets: Vec<u32>,
    lengths: Vec<u32>,
    elements: ArrayRef,
    validity: NullBuffer,
    errors: Vec<RowError>,
}

impl SequenceBatch {
    pub(crate) fn new(
        domain: SequenceDomain,
        offsets: Vec<u32>,
        lengths: Vec<u32>,
        elements: ArrayRef,
        validity: NullBuffer,
        errors: Vec<RowError>,
    ) -> SequenceBatch {
        debug_assert_eq!(offsets.len(), lengths.len());
        debug_assert_eq!(validity.len(), lengths.len());
        debug_assert_eq!(
            lengths.iter().map(|&len| len as usize).sum::<usize>(),
            elements.len()
        );
        SequenceBatch {
            domain,
            offsets,
            lengths,
            elements,
            validity,
            errors,
        }
    }

    pub fn domain(&self) -> SequenceDomain {
        self.domain
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start offset of every row within [`elements`](Self::elements).
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Length of every row, zero for null rows.
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Flat array of all generated values.
    pub fn elements(&self) -> &ArrayRef {
        &self.elements
    }

    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn validity(&self) -> &NullBuffer {
        &self.validity
    }

    /// Row-scoped failures, in row order.
    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Whether `row` holds a sequence. `false` for rows past the end.
    pub fn is_valid(&self, row: usize) -> bool {
        row < self.len() && self.validity.is_valid(row)
    }

    /// Position of row's values, `None` for null rows and rows past the end.
    pub fn descriptor(&self, row: usize) -> Option<SequenceDescriptor> {
        self.is_valid(row).then(|| SequenceDescriptor {
            offset: self.offsets[row],
            length: self.lengths[row],
        })
    }

    /// Range of row's values within [`elements`](Self::elements), `None` for null rows.
    pub fn row_range(&self, row: usize) -> Option<Range<usize>> {
        self.descriptor(row).map(|d| d.range())
    }

    /// Converts the batch into an Arrow `ListViewArray`.
    pub fn into_list_view_array(self) -> Result<ListViewArray> {
        self.verify_i32_capacity()?;
        let field = self.item_field();
        let offsets = ScalarBuffer::from_iter(self.offsets.iter().map(|&o| o as i32));
        let sizes = ScalarBuffer::from_iter(self.lengths.iter().map(|&l| l as i32));
        ListViewArray::try_new(field, offsets, sizes, self.elements, Some(self.validity))
            .map_err(|e| Error::arrow("sequence list view", e))
    }

    /// Converts the batch into an Arrow `ListArray`.
    ///
    /// Rows are laid out contiguously in row order, so the list offsets follow
    /// directly from the row lengths.
    pub fn into_list_array(self) -> Result<ListArray> {
        self.verify_i32_capacity()?;
        let field = self.item_field();
        let offsets = OffsetBuffer::<i32>::from_lengths(self.lengths.iter().map(|&l| l as usize));
        ListArray::try_new(field, offsets, self.elements, Some(self.validity))
            .map_err(|e| Error::arrow("sequence list", e))
    }

    fn item_field(&self) -> Arc<Field> {
        Arc::new(Field::new("item", self.elements.data_type().clone(), false))
    }

    fn verify_i32_capacity(&self) -> Result<()> {
        let total = self.elements.len() as u64;
        if total > i32::MAX as u64 {
            return Err(Error::capacity_exceeded(
                "sequence list offsets",
                total,
                i32::MAX as u64,
            ));
        }
        Ok(())
    }
}
