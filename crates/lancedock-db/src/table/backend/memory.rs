//! In-memory table backend.
//!
//! Tables live in a process-wide registry keyed by URI, so connecting twice
//! to the same `memory://` URI sees the same tables. Search is a linear scan
//! by squared L2 distance, matching LanceDB's default metric. Filter
//! expressions are not evaluated; a search that carries one fails.

use super::super::row::{ColumnNames, RowBatch, SearchHit, SearchRequest, StoredRow, ID_COLUMN};
use super::super::traits::{AddMode, VectorDatabase, VectorTable};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock, RwLockReadGuard};
use tracing::{debug, trace};

/// URI scheme handled by this backend.
pub const MEMORY_SCHEME: &str = "memory://";

type Tables = RwLock<HashMap<String, Arc<MemoryTable>>>;

fn registry() -> &'static Mutex<HashMap<String, Arc<Tables>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<Tables>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

// ============================================================================
// MemoryDatabase
// ============================================================================

/// An in-memory database.
pub struct MemoryDatabase {
    uri: String,
    tables: Arc<Tables>,
}

impl MemoryDatabase {
    /// Connect to the in-memory database named by `uri`, creating it if needed.
    pub fn connect(uri: &str) -> DbResult<Self> {
        if !uri.starts_with(MEMORY_SCHEME) {
            return Err(DbError::connect(
                uri,
                format!("expected a '{}' URI", MEMORY_SCHEME),
            ));
        }

        let mut registry = registry()
            .lock()
            .map_err(|e| DbError::internal(format!("Failed to acquire registry lock: {}", e)))?;
        let tables = registry
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(HashMap::new())))
            .clone();

        debug!("Connected to in-memory database '{}'", uri);
        Ok(Self {
            uri: uri.to_string(),
            tables,
        })
    }
}

#[async_trait]
impl VectorDatabase for MemoryDatabase {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn table_names(&self) -> DbResult<Vec<String>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| DbError::internal(format!("Failed to acquire read lock: {}", e)))?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn open_table(&self, name: &str) -> DbResult<Arc<dyn VectorTable>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| DbError::internal(format!("Failed to acquire read lock: {}", e)))?;
        match tables.get(name) {
            Some(table) => Ok(table.clone()),
            None => Err(DbError::table_not_found(name)),
        }
    }

    async fn create_table(&self, name: &str, batch: RowBatch) -> DbResult<Arc<dyn VectorTable>> {
        if batch.is_empty() {
            return Err(DbError::EmptyBatch {
                table: name.to_string(),
            });
        }
        let mut tables = self
            .tables
            .write()
            .map_err(|e| DbError::internal(format!("Failed to acquire write lock: {}", e)))?;
        if tables.contains_key(name) {
            return Err(DbError::TableExists {
                table: name.to_string(),
            });
        }

        debug!("Creating in-memory table '{}' from {} rows", name, batch.len());
        let table = Arc::new(MemoryTable::new(name, batch)?);
        tables.insert(name.to_string(), table.clone());
        Ok(table)
    }
}

// ============================================================================
// MemoryTable
// ============================================================================

/// An in-memory table. Column layout and dimension are fixed until an
/// overwrite replaces them.
pub struct MemoryTable {
    name: String,
    state: RwLock<MemoryState>,
}

struct MemoryState {
    columns: ColumnNames,
    dimension: usize,
    rows: Vec<StoredRow>,
}

impl MemoryState {
    fn from_batch(batch: RowBatch) -> DbResult<Self> {
        let dimension = batch.dimension()?.unwrap_or(0);
        Ok(Self {
            columns: batch.columns,
            dimension,
            rows: batch.rows,
        })
    }

    fn check_compatible(&self, table: &str, batch: &RowBatch) -> DbResult<()> {
        if batch.columns != self.columns {
            return Err(DbError::write(
                table,
                format!(
                    "schema mismatch: table has columns {:?}, batch has {:?}",
                    self.columns, batch.columns
                ),
            ));
        }
        if let Some(actual) = batch.dimension()? {
            if actual != self.dimension {
                return Err(DbError::DimensionMismatch {
                    expected: self.dimension,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn project(&self, row: &StoredRow, select: &[String]) -> SearchHit {
        let mut hit = SearchHit::default();
        for column in select {
            let value = if column == ID_COLUMN {
                &row.id
            } else if *column == self.columns.text {
                &row.text
            } else if *column == self.columns.metadata {
                &row.metadata
            } else {
                continue;
            };
            hit.columns.insert(column.clone(), value.clone());
        }
        hit
    }
}

impl MemoryTable {
    fn new(name: &str, batch: RowBatch) -> DbResult<Self> {
        Ok(Self {
            name: name.to_string(),
            state: RwLock::new(MemoryState::from_batch(batch)?),
        })
    }

    fn read(&self) -> DbResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| DbError::internal(format!("Failed to acquire read lock: {}", e)))
    }
}

#[async_trait]
impl VectorTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, batch: RowBatch, mode: AddMode) -> DbResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| DbError::internal(format!("Failed to acquire write lock: {}", e)))?;

        debug!("Adding {} rows to '{}' (mode={})", batch.len(), self.name, mode);
        match mode {
            // The new batch becomes the complete contents, schema included.
            AddMode::Overwrite => *state = MemoryState::from_batch(batch)?,
            AddMode::Append => {
                state.check_compatible(&self.name, &batch)?;
                state.rows.extend(batch.rows);
            }
        }
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> DbResult<Vec<SearchHit>> {
        trace!("Searching in-memory table '{}', limit={}", self.name, request.limit);

        if let Some(filter) = &request.filter {
            return Err(DbError::UnsupportedFilter {
                backend: "memory".to_string(),
                filter: filter.clone(),
            });
        }

        let state = self.read()?;
        if request.vector_column != state.columns.vector {
            return Err(DbError::query(
                &self.name,
                format!("no vector column named '{}'", request.vector_column),
            ));
        }
        if request.vector.len() != state.dimension {
            return Err(DbError::DimensionMismatch {
                expected: state.dimension,
                actual: request.vector.len(),
            });
        }

        let mut scored: Vec<(f32, usize)> = state
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (l2_squared(&request.vector, &row.vector), i))
            .collect();
        // Stable sort keeps insertion order for equal distances.
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(request.limit)
            .map(|(_, i)| state.project(&state.rows[i], &request.select))
            .collect())
    }

    async fn scan(&self, limit: usize, select: &[String]) -> DbResult<Vec<SearchHit>> {
        let state = self.read()?;
        Ok(state
            .rows
            .iter()
            .take(limit)
            .map(|row| state.project(row, select))
            .collect())
    }

    async fn count_rows(&self) -> DbResult<usize> {
        Ok(self.read()?.rows.len())
    }
}

/// Squared Euclidean distance.
fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(rows: Vec<StoredRow>) -> RowBatch {
        RowBatch::new(ColumnNames::default(), rows)
    }

    #[tokio::test]
    async fn test_connect_shares_tables_per_uri() {
        let db = MemoryDatabase::connect("memory://test-shared").unwrap();
        db.create_table("docs", batch(vec![StoredRow::new("a", vec![1.0], "A", "{}")]))
            .await
            .unwrap();

        let again = MemoryDatabase::connect("memory://test-shared").unwrap();
        assert!(again.table_exists("docs").await.unwrap());

        let other = MemoryDatabase::connect("memory://test-other").unwrap();
        assert!(!other.table_exists("docs").await.unwrap());
    }

    #[test]
    fn test_connect_rejects_other_schemes() {
        assert!(MemoryDatabase::connect("/tmp/db").is_err());
    }

    #[tokio::test]
    async fn test_open_missing_table_is_not_found() {
        let db = MemoryDatabase::connect("memory://test-missing").unwrap();
        let err = db.open_table("nope").await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let db = MemoryDatabase::connect("memory://test-create-twice").unwrap();
        let rows = vec![StoredRow::new("a", vec![1.0], "A", "{}")];
        db.create_table("docs", batch(rows.clone())).await.unwrap();
        let err = db.create_table("docs", batch(rows)).await.err().unwrap();
        assert!(matches!(err, DbError::TableExists { .. }));
    }

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let db = MemoryDatabase::connect("memory://test-search").unwrap();
        let table = db
            .create_table(
                "docs",
                batch(vec![
                    StoredRow::new("a", vec![1.0, 0.0], "A", "{}"),
                    StoredRow::new("b", vec![0.0, 1.0], "B", "{}"),
                    StoredRow::new("c", vec![0.7, 0.7], "C", "{}"),
                ]),
            )
            .await
            .unwrap();

        let request = SearchRequest::new(vec![0.9, 0.1], "vector", 2)
            .with_select(vec!["text".to_string()]);
        let hits = table.search(&request).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].get("text"), Some("A"));
        assert_eq!(hits[1].get("text"), Some("C"));
        assert_eq!(hits[0].get("metadata"), None);
    }

    #[tokio::test]
    async fn test_search_with_filter_is_unsupported() {
        let db = MemoryDatabase::connect("memory://test-filter").unwrap();
        let table = db
            .create_table("docs", batch(vec![StoredRow::new("a", vec![1.0], "A", "{}")]))
            .await
            .unwrap();
        let request = SearchRequest::new(vec![1.0], "vector", 1).with_filter("text = 'A'");
        assert!(matches!(
            table.search(&request).await,
            Err(DbError::UnsupportedFilter { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_append_and_overwrite() {
        let db = MemoryDatabase::connect("memory://test-add").unwrap();
        let table = db
            .create_table(
                "docs",
                batch(vec![
                    StoredRow::new("a", vec![1.0], "A", "{}"),
                    StoredRow::new("b", vec![2.0], "B", "{}"),
                ]),
            )
            .await
            .unwrap();

        table
            .add(batch(vec![StoredRow::new("c", vec![3.0], "C", "{}")]), AddMode::Append)
            .await
            .unwrap();
        assert_eq!(table.count_rows().await.unwrap(), 3);

        table
            .add(batch(vec![StoredRow::new("d", vec![4.0], "D", "{}")]), AddMode::Overwrite)
            .await
            .unwrap();
        assert_eq!(table.count_rows().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_incompatible_schema() {
        let db = MemoryDatabase::connect("memory://test-schema").unwrap();
        let table = db
            .create_table("docs", batch(vec![StoredRow::new("a", vec![1.0], "A", "{}")]))
            .await
            .unwrap();

        let renamed = RowBatch::new(
            ColumnNames::new("vector", "body", "metadata"),
            vec![StoredRow::new("b", vec![2.0], "B", "{}")],
        );
        assert!(matches!(
            table.add(renamed, AddMode::Append).await,
            Err(DbError::Write { .. })
        ));

        let wider = batch(vec![StoredRow::new("c", vec![1.0, 2.0], "C", "{}")]);
        assert!(matches!(
            table.add(wider, AddMode::Append).await,
            Err(DbError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_schema() {
        let db = MemoryDatabase::connect("memory://test-overwrite-schema").unwrap();
        let table = db
            .create_table(
                "docs",
                batch(vec![
                    StoredRow::new("a", vec![1.0, 0.0], "A", "{}"),
                    StoredRow::new("b", vec![0.0, 1.0], "B", "{}"),
                ]),
            )
            .await
            .unwrap();

        let replacement = RowBatch::new(
            ColumnNames::new("embedding", "body", "meta"),
            vec![StoredRow::new("c", vec![1.0, 2.0, 3.0], "C", "{}")],
        );
        table.add(replacement, AddMode::Overwrite).await.unwrap();
        assert_eq!(table.count_rows().await.unwrap(), 1);

        let request = SearchRequest::new(vec![1.0, 2.0, 3.0], "embedding", 5)
            .with_select(vec!["body".to_string()]);
        let hits = table.search(&request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get("body"), Some("C"));

        let old_shape = batch(vec![StoredRow::new("d", vec![1.0, 0.0], "D", "{}")]);
        assert!(table.add(old_shape, AddMode::Append).await.is_err());
    }
}
