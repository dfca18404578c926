//! Chunk Iterator: a `(batch_index, row_index)` cursor over either a
//! sequence of Arrow record batches or a sequence of JSON row arrays,
//! exposing a single `extract_cell` contract regardless of the underlying
//! encoding.

use arrow_array::RecordBatch;
use chunk_core::{
    catalog::LogicalType,
    config::DecodeConfig,
    error::{CellLocation, ConversionError},
    json::{self, JsonValue},
    structured::{self, StructuredValue},
};
use tracing::debug;

use crate::{cache::ColumnCache, extract};

/// The physical encoding backing a [`ResultChunk`].
enum ChunkKind {
    Arrow(Vec<RecordBatch>),
    /// Each element is one physical batch's raw bytes: a JSON array of row
    /// arrays, e.g. `[[1,"a"],[2,"b"]]`.
    Json(Vec<Vec<u8>>),
}

/// An immutable, already-downloaded chunk of query results: either an
/// ordered sequence of Arrow record batches sharing one schema, or an
/// ordered sequence of JSON row-array batches.
pub struct ResultChunk {
    kind: ChunkKind,
    schema: Vec<LogicalType>,
    chunk_index: usize,
}

impl ResultChunk {
    /// Build a chunk backed by Arrow record batches.
    ///
    /// # Errors
    /// Returns [`ConversionError::ArityMismatch`] if any batch's column
    /// count doesn't match `schema.len()`.
    pub fn from_arrow(
        chunk_index: usize,
        batches: Vec<RecordBatch>,
        schema: Vec<LogicalType>,
    ) -> Result<Self, ConversionError> {
        for batch in &batches {
            if batch.num_columns() != schema.len() {
                return Err(crate::error::schema_width_mismatch(
                    schema.len(),
                    batch.num_columns(),
                ));
            }
        }
        Ok(Self {
            kind: ChunkKind::Arrow(batches),
            schema,
            chunk_index,
        })
    }

    /// Build a chunk backed by JSON row-array batches (raw bytes, undecoded).
    #[must_use]
    pub fn from_json(chunk_index: usize, batches: Vec<Vec<u8>>, schema: Vec<LogicalType>) -> Self {
        Self {
            kind: ChunkKind::Json(batches),
            schema,
            chunk_index,
        }
    }

    /// Number of columns every row in this chunk has.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Total row count across every batch in this chunk.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match &self.kind {
            ChunkKind::Arrow(batches) => batches.iter().map(RecordBatch::num_rows).sum(),
            ChunkKind::Json(batches) => batches
                .iter()
                .map(|bytes| decode_json_batch(bytes, self.chunk_index).map_or(0, |v| v.len()))
                .sum(),
        }
    }

    /// The declared logical type of each column, in column order.
    #[must_use]
    pub fn schema(&self) -> &[LogicalType] {
        &self.schema
    }

    /// Build an iterator positioned just before the first row.
    #[must_use]
    pub fn iter(self, config: DecodeConfig) -> ChunkIterator {
        let column_count = self.schema.len();
        ChunkIterator {
            chunk: self,
            batch_index: 0,
            row_index: -1,
            cache: ColumnCache::new(column_count),
            json_batch: None,
            config,
        }
    }
}

fn decode_json_batch(bytes: &[u8], chunk_index: usize) -> Result<Vec<JsonValue>, ConversionError> {
    let location = CellLocation::new(chunk_index, 0, 0);
    let value = json::parse(bytes, location)?;
    match value {
        JsonValue::Array(rows) => Ok(rows),
        other => Err(ConversionError::InvalidEncoding {
            location,
            message: format!("expected a JSON array of rows, found {other:?}"),
        }),
    }
}

/// A forward-biased cursor over a [`ResultChunk`]'s rows.
///
/// Not `Send`/`Sync`: the core has no concurrency model (see the crate-level
/// docs). Dropping the iterator releases the cached column buffers and the
/// chunk's batch storage with it — no explicit `close()` is required.
pub struct ChunkIterator {
    chunk: ResultChunk,
    batch_index: usize,
    /// `-1` before the first row has been visited.
    row_index: i64,
    cache: ColumnCache,
    /// Decoded rows of the JSON batch currently under the cursor, if any.
    json_batch: Option<Vec<JsonValue>>,
    config: DecodeConfig,
}

impl ChunkIterator {
    fn num_batches(&self) -> usize {
        match &self.chunk.kind {
            ChunkKind::Arrow(batches) => batches.len(),
            ChunkKind::Json(batches) => batches.len(),
        }
    }

    fn batch_len(&self, batch_index: usize) -> Result<usize, ConversionError> {
        match &self.chunk.kind {
            ChunkKind::Arrow(batches) => Ok(batches[batch_index].num_rows()),
            ChunkKind::Json(batches) => {
                decode_json_batch(&batches[batch_index], self.chunk.chunk_index).map(|v| v.len())
            }
        }
    }

    fn invalidate(&mut self) {
        self.cache.invalidate();
        self.json_batch = None;
    }

    /// Advance the cursor by one row, skipping past empty batches. Returns
    /// `false` exactly when both cursors are exhausted.
    pub fn next(&mut self) -> bool {
        loop {
            if self.batch_index >= self.num_batches() {
                return false;
            }
            let len = match self.batch_len(self.batch_index) {
                Ok(len) => len,
                Err(_) => 0,
            };
            if self.row_index + 1 < len as i64 {
                self.row_index += 1;
                return true;
            }
            self.batch_index += 1;
            self.row_index = -1;
            debug!(batch_index = self.batch_index, "chunk iterator crossed batch boundary");
            self.invalidate();
        }
    }

    /// Move the cursor back one row. Returns `false` if already at the
    /// pre-first position.
    pub fn rewind(&mut self) -> bool {
        if self.row_index > 0 {
            self.row_index -= 1;
            return true;
        }
        if self.row_index == 0 {
            if self.batch_index == 0 {
                self.row_index = -1;
                return false;
            }
            self.batch_index -= 1;
            self.invalidate();
            let len = self.batch_len(self.batch_index).unwrap_or(0);
            self.row_index = len as i64 - 1;
            return self.row_index >= 0;
        }
        false
    }

    /// Extract the value of `column` at the cursor's current row.
    ///
    /// # Errors
    /// Returns [`ConversionError::CacheInvariantViolated`] if called before
    /// the first successful `next()`, or whatever conversion error the
    /// underlying scalar/structured machinery raises.
    pub fn extract_cell(&mut self, column: usize) -> Result<StructuredValue, ConversionError> {
        if self.row_index < 0 {
            return Err(ConversionError::CacheInvariantViolated {
                location: CellLocation::new(self.chunk.chunk_index, 0, column),
            });
        }
        let row = self.row_index as usize;
        let location = CellLocation::new(self.chunk.chunk_index, row, column);
        let logical_type = &self.chunk.schema[column];
        match &self.chunk.kind {
            ChunkKind::Arrow(batches) => {
                let batch = &batches[self.batch_index];
                let slot = self.cache.get_or_materialize(column, batch);
                extract::extract(slot, row, logical_type, &self.config, location)
            }
            ChunkKind::Json(batches) => {
                if self.json_batch.is_none() {
                    self.json_batch = Some(decode_json_batch(&batches[self.batch_index], self.chunk.chunk_index)?);
                }
                let rows = self.json_batch.as_ref().expect("just populated");
                let row_value = rows.get(row).ok_or(ConversionError::CacheInvariantViolated { location })?;
                let cell = row_value
                    .as_array()
                    .and_then(|cells| cells.get(column))
                    .ok_or(ConversionError::InvalidEncoding {
                        location,
                        message: "row does not have the declared column count".to_string(),
                    })?;
                structured::materialize(cell, logical_type, &self.config, location)
            }
        }
    }

    /// The chunk-relative index of the batch the cursor currently sits in.
    #[must_use]
    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    /// The row index within the current batch, or `-1` before the first row.
    #[must_use]
    pub fn row_index(&self) -> i64 {
        self.row_index
    }

    /// The chunk's declared schema.
    #[must_use]
    pub fn schema(&self) -> &[LogicalType] {
        self.chunk.schema()
    }
}
