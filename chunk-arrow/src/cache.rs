//! Arrow Column Cache: per-batch, per-column materialization of the raw
//! Arrow buffer into a densely-typed native array slot.
//!
//! An `arrow-rs` array is already a single contiguous, densely-typed native
//! buffer (an `Int32Array` is a flat `i32` buffer plus a validity bitmap), so
//! "materializing" a column here means downcasting its `ArrayRef` once and
//! holding onto that typed handle — no second copy is needed to get O(1)
//! indexed access. The cache is invalidated wholesale on every batch change,
//! exactly as the chunk iterator's cursor model requires.

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, RecordBatch, StructArray};

/// One column's cached materialization.
#[derive(Clone)]
pub(crate) enum CacheSlot {
    /// Not yet materialized for the current batch.
    Empty,
    /// A flat scalar column (primitive, boolean, string, or binary array).
    Scalar(ArrayRef),
    /// A struct column backing a split temporal encoding; sub-fields in
    /// declaration order. Arity (2 or 3) is interpreted by the caller
    /// against the column's declared logical type.
    Struct(Vec<ArrayRef>),
}

/// Per-column cache slots for the batch the iterator is currently positioned
/// on. Sized to `column_count` and invalidated (reset to `Empty`) whenever
/// the iterator's `batch_index` changes.
pub(crate) struct ColumnCache {
    slots: Vec<CacheSlot>,
}

impl ColumnCache {
    pub(crate) fn new(column_count: usize) -> Self {
        Self {
            slots: (0..column_count).map(|_| CacheSlot::Empty).collect(),
        }
    }

    /// Drop every cached slot. Called whenever `batch_index` changes.
    pub(crate) fn invalidate(&mut self) {
        for slot in &mut self.slots {
            *slot = CacheSlot::Empty;
        }
    }

    /// Return the cached slot for `column`, materializing it from `batch`
    /// on first access within the current batch.
    pub(crate) fn get_or_materialize(&mut self, column: usize, batch: &RecordBatch) -> &CacheSlot {
        let slot = &mut self.slots[column];
        if matches!(slot, CacheSlot::Empty) {
            let array = Arc::clone(batch.column(column));
            *slot = match array.as_any().downcast_ref::<StructArray>() {
                Some(structure) => CacheSlot::Struct(structure.columns().to_vec()),
                None => CacheSlot::Scalar(array),
            };
        }
        &self.slots[column]
    }
}
