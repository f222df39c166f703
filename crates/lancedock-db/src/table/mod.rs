//! Vector tables for lancedock-db.
//!
//! This module provides the storage traits the pipelines in `lancedock-core`
//! are written against, the row/batch/search types that cross that seam, and
//! the backends that implement them.
//!
//! ## Usage
//!
//! ```ignore
//! use lancedock_db::table::{connect, AddMode, ColumnNames, RowBatch, SearchRequest};
//!
//! let db = connect("/path/to/db").await?;
//! let table = db.create_table("docs", batch).await?;
//! table.add(more_rows, AddMode::Append).await?;
//!
//! let request = SearchRequest::new(query, "vector", 5)
//!     .with_select(ColumnNames::default().projection());
//! let hits = table.search(&request).await?;
//! ```

mod backend;
mod row;
mod traits;

pub use row::{
    ColumnNames, RowBatch, SearchHit, SearchRequest, StoredRow, DEFAULT_METADATA_COLUMN,
    DEFAULT_TEXT_COLUMN, DEFAULT_VECTOR_COLUMN, ID_COLUMN,
};
pub use traits::{AddMode, VectorDatabase, VectorTable};

pub use backend::{available_backends, connect};

#[cfg(feature = "lancedb")]
pub use backend::{LanceDbDatabase, LanceDbTable};

#[cfg(feature = "memory")]
pub use backend::{MemoryDatabase, MemoryTable, MEMORY_SCHEME};
