//! LanceDB table backend.
//!
//! Rows are stored as Arrow record batches with the layout
//! `id: Utf8, <vector>: FixedSizeList<Float32>, <text>: Utf8, <metadata>: Utf8`.

use super::super::row::{ColumnNames, RowBatch, SearchHit, SearchRequest, ID_COLUMN};
use super::super::traits::{AddMode, VectorDatabase, VectorTable};
use crate::error::{DbError, DbResult};
use arrow_array::{
    Array, ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use futures::TryStreamExt;
use lance_arrow::FixedSizeListArrayExt;
use lancedb::{
    connect,
    query::{ExecutableQuery, QueryBase, Select},
    table::AddDataMode,
    Connection, Table,
};
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// LanceDbDatabase
// ============================================================================

/// A LanceDB connection.
pub struct LanceDbDatabase {
    uri: String,
    connection: Connection,
}

impl LanceDbDatabase {
    /// Connect to the database at `uri` (local path or object store URI).
    pub async fn connect(uri: &str) -> DbResult<Self> {
        debug!("Connecting to LanceDB at '{}'", uri);

        let connection = connect(uri)
            .execute()
            .await
            .map_err(|e| DbError::connect(uri, e.to_string()))?;

        Ok(Self {
            uri: uri.to_string(),
            connection,
        })
    }
}

#[async_trait]
impl VectorDatabase for LanceDbDatabase {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn table_names(&self) -> DbResult<Vec<String>> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DbError::LanceDb {
                message: format!("Failed to list tables: {}", e),
            })
    }

    async fn open_table(&self, name: &str) -> DbResult<Arc<dyn VectorTable>> {
        debug!("Opening table '{}'", name);

        let table = self
            .connection
            .open_table(name)
            .execute()
            .await
            .map_err(DbError::from)?;

        Ok(Arc::new(LanceDbTable::new(table)))
    }

    async fn create_table(&self, name: &str, batch: RowBatch) -> DbResult<Arc<dyn VectorTable>> {
        if batch.is_empty() {
            return Err(DbError::EmptyBatch {
                table: name.to_string(),
            });
        }

        debug!("Creating table '{}' from {} rows", name, batch.len());

        let record_batch = to_record_batch(&batch)?;
        let schema = record_batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(record_batch)], schema);

        let table = self
            .connection
            .create_table(name, Box::new(batches))
            .execute()
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::LanceDb { message } => DbError::write(name, message),
                other => other,
            })?;

        Ok(Arc::new(LanceDbTable::new(table)))
    }
}

// ============================================================================
// LanceDbTable
// ============================================================================

/// A handle to one LanceDB table.
pub struct LanceDbTable {
    name: String,
    table: Table,
}

impl LanceDbTable {
    fn new(table: Table) -> Self {
        Self {
            name: table.name().to_string(),
            table,
        }
    }
}

#[async_trait]
impl VectorTable for LanceDbTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, batch: RowBatch, mode: AddMode) -> DbResult<()> {
        if batch.is_empty() && mode == AddMode::Append {
            return Ok(());
        }

        debug!("Adding {} rows to '{}' (mode={})", batch.len(), self.name, mode);

        let record_batch = to_record_batch(&batch)?;
        let schema = record_batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(record_batch)], schema);

        let add_mode = match mode {
            AddMode::Append => AddDataMode::Append,
            AddMode::Overwrite => AddDataMode::Overwrite,
        };

        self.table
            .add(Box::new(batches))
            .mode(add_mode)
            .execute()
            .await
            .map_err(|e| DbError::write(&self.name, e.to_string()))?;

        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> DbResult<Vec<SearchHit>> {
        trace!(
            "Searching '{}' on column '{}', limit={}",
            self.name,
            request.vector_column,
            request.limit
        );

        let mut query = self
            .table
            .vector_search(request.vector.clone())
            .map_err(|e| DbError::query(&self.name, format!("Failed to create query: {}", e)))?
            .column(&request.vector_column)
            .limit(request.limit);

        if let Some(filter) = &request.filter {
            debug!("Applying filter: {}", filter);
            query = query.only_if(filter.as_str());
        }

        if !request.select.is_empty() {
            query = query.select(Select::columns(request.select.as_slice()));
        }

        let results = query
            .execute()
            .await
            .map_err(|e| DbError::query(&self.name, e.to_string()))?;

        let batches: Vec<RecordBatch> = results.try_collect().await.map_err(|e| {
            DbError::query(&self.name, format!("Failed to collect results: {}", e))
        })?;

        Ok(hits_from_batches(&batches, &request.select))
    }

    async fn scan(&self, limit: usize, select: &[String]) -> DbResult<Vec<SearchHit>> {
        let mut query = self.table.query().limit(limit);
        if !select.is_empty() {
            query = query.select(Select::columns(select));
        }

        let results = query
            .execute()
            .await
            .map_err(|e| DbError::query(&self.name, e.to_string()))?;

        let batches: Vec<RecordBatch> = results.try_collect().await.map_err(|e| {
            DbError::query(&self.name, format!("Failed to collect results: {}", e))
        })?;

        Ok(hits_from_batches(&batches, select))
    }

    async fn count_rows(&self) -> DbResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| DbError::query(&self.name, format!("Count failed: {}", e)))
    }
}

// ============================================================================
// Arrow conversion
// ============================================================================

/// Build the Arrow schema for a table.
fn create_schema(columns: &ColumnNames, dimension: usize) -> Schema {
    Schema::new(vec![
        Field::new(ID_COLUMN, DataType::Utf8, false),
        Field::new(
            &columns.vector,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimension as i32,
            ),
            false,
        ),
        Field::new(&columns.text, DataType::Utf8, true),
        Field::new(&columns.metadata, DataType::Utf8, true),
    ])
}

/// Convert a row batch into an Arrow record batch.
fn to_record_batch(batch: &RowBatch) -> DbResult<RecordBatch> {
    let dimension = batch
        .dimension()?
        .ok_or_else(|| DbError::internal("Cannot build a record batch from zero rows"))?;
    let schema = create_schema(&batch.columns, dimension);

    let ids: ArrayRef = Arc::new(StringArray::from(
        batch.rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
    ));

    let flat_vectors: Vec<f32> = batch
        .rows
        .iter()
        .flat_map(|r| r.vector.iter().copied())
        .collect();
    let values = Float32Array::from(flat_vectors);
    let vector_array = FixedSizeListArray::try_new_from_values(values, dimension as i32)
        .map_err(|e| DbError::Arrow {
            message: format!("Failed to create vector array: {}", e),
        })?;
    let vectors: ArrayRef = Arc::new(vector_array);

    let texts: ArrayRef = Arc::new(StringArray::from(
        batch.rows.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(),
    ));

    let metadata: ArrayRef = Arc::new(StringArray::from(
        batch
            .rows
            .iter()
            .map(|r| r.metadata.as_str())
            .collect::<Vec<_>>(),
    ));

    Ok(RecordBatch::try_new(
        Arc::new(schema),
        vec![ids, vectors, texts, metadata],
    )?)
}

/// Read the selected string columns out of result batches.
fn hits_from_batches(batches: &[RecordBatch], select: &[String]) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for batch in batches {
        let columns: Vec<(&str, &StringArray)> = select
            .iter()
            .filter_map(|name| {
                batch
                    .column_by_name(name)
                    .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                    .map(|array| (name.as_str(), array))
            })
            .collect();

        for i in 0..batch.num_rows() {
            let mut hit = SearchHit::default();
            for (name, array) in &columns {
                if !array.is_null(i) {
                    hit.columns.insert(name.to_string(), array.value(i).to_string());
                }
            }
            hits.push(hit);
        }
    }

    hits
}

// ============================================================================
// Tests
// ============================================================================
