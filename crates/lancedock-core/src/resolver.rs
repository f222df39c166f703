//! Table resolution.
//!
//! [`TableResolver`] connects to a URI and reports whether a table exists,
//! together with an open handle when it does. Existence is asked of the
//! database directly; a listed table that has vanished by the time it is
//! opened counts as absent.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use lancedock_db::table::{connect, VectorDatabase, VectorTable};
use lancedock_db::DbResult;
use tracing::debug;

use crate::db_adapter::{from_db_error, IntoLanceResult};
use crate::errors::{LanceError, LanceResult};

/// A connection plus the state of one table inside it.
#[derive(Clone)]
pub struct ResolvedTable {
    /// The connection the table was resolved on.
    pub db: Arc<dyn VectorDatabase>,
    /// The table name.
    pub table_name: String,
    /// Open handle, `None` if the table does not exist.
    pub handle: Option<Arc<dyn VectorTable>>,
}

impl ResolvedTable {
    /// Whether the table exists.
    pub fn exists(&self) -> bool {
        self.handle.is_some()
    }
}

impl fmt::Debug for ResolvedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTable")
            .field("uri", &self.db.uri())
            .field("table_name", &self.table_name)
            .field("exists", &self.exists())
            .finish()
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Opens database connections by URI.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the database at `uri`.
    async fn connect(&self, uri: &str) -> DbResult<Arc<dyn VectorDatabase>>;
}

/// Connects through [`lancedock_db::table::connect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

#[async_trait]
impl Connector for DefaultConnector {
    async fn connect(&self, uri: &str) -> DbResult<Arc<dyn VectorDatabase>> {
        connect(uri).await
    }
}

// ============================================================================
// TableResolver
// ============================================================================

/// Resolves table names to handles.
#[derive(Clone)]
pub struct TableResolver {
    connector: Arc<dyn Connector>,
}

impl Default for TableResolver {
    fn default() -> Self {
        Self::new(Arc::new(DefaultConnector))
    }
}

impl fmt::Debug for TableResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableResolver").finish_non_exhaustive()
    }
}

impl TableResolver {
    /// Create a resolver that connects through `connector`.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Connect to `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::Connection`](crate::LanceError::Connection) if
    /// the database cannot be reached.
    pub async fn connect(&self, uri: &str) -> LanceResult<Arc<dyn VectorDatabase>> {
        self.connector.connect(uri).await.map_err(|e| match from_db_error(e) {
            err @ LanceError::Connection { .. } => err,
            other => LanceError::Connection {
                uri: uri.to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// Connect to `uri` and resolve `table_name`.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::Connection`](crate::LanceError::Connection) if
    /// the database cannot be reached, and a storage error if listing or
    /// opening fails for any reason other than the table being absent.
    pub async fn resolve(&self, uri: &str, table_name: &str) -> LanceResult<ResolvedTable> {
        let db = self.connect(uri).await?;
        resolve_on(db, table_name).await
    }
}

/// Resolve `table_name` on an existing connection.
pub async fn resolve_on(
    db: Arc<dyn VectorDatabase>,
    table_name: &str,
) -> LanceResult<ResolvedTable> {
    let handle = if db.table_exists(table_name).await.into_lance_result()? {
        match db.open_table(table_name).await {
            Ok(table) => Some(table),
            Err(e) if e.is_not_found() => {
                debug!("Table '{}' disappeared before it could be opened", table_name);
                None
            }
            Err(e) => return Err(from_db_error(e)),
        }
    } else {
        None
    };

    debug!(
        "Resolved table '{}' at '{}' (exists: {})",
        table_name,
        db.uri(),
        handle.is_some()
    );

    Ok(ResolvedTable {
        db,
        table_name: table_name.to_string(),
        handle,
    })
}

// ============================================================================
// Test Connectors
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use lancedock_db::table::RowBatch;
    use lancedock_db::DbError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts connections and forwards them to [`DefaultConnector`].
    #[derive(Default)]
    pub struct CountingConnector {
        connects: AtomicUsize,
    }

    impl CountingConnector {
        pub fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self, uri: &str) -> DbResult<Arc<dyn VectorDatabase>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            DefaultConnector.connect(uri).await
        }
    }

    /// Hands out the same database for every URI.
    pub struct FixedConnector(pub Arc<dyn VectorDatabase>);

    #[async_trait]
    impl Connector for FixedConnector {
        async fn connect(&self, _uri: &str) -> DbResult<Arc<dyn VectorDatabase>> {
            Ok(self.0.clone())
        }
    }

    /// Never reaches a database.
    pub struct FailingConnector;

    #[async_trait]
    impl Connector for FailingConnector {
        async fn connect(&self, uri: &str) -> DbResult<Arc<dyn VectorDatabase>> {
            Err(DbError::internal(format!("cannot reach {}", uri)))
        }
    }

    /// Lists `docs` but fails every open with `open_error`. Creates go to an
    /// in-memory database at `uri`.
    pub struct UnopenableDatabase {
        inner: Arc<dyn VectorDatabase>,
        open_error: fn(&str) -> DbError,
    }

    impl UnopenableDatabase {
        pub async fn new(uri: &str, open_error: fn(&str) -> DbError) -> Arc<Self> {
            let inner = connect(uri).await.unwrap();
            Arc::new(Self { inner, open_error })
        }

        /// Open errors that mean the table is gone.
        pub fn not_found(name: &str) -> DbError {
            DbError::table_not_found(name)
        }

        /// Open errors that mean the store is broken.
        pub fn broken(name: &str) -> DbError {
            DbError::internal(format!("corrupt manifest for '{}'", name))
        }
    }

    #[async_trait]
    impl VectorDatabase for UnopenableDatabase {
        fn uri(&self) -> &str {
            self.inner.uri()
        }

        async fn table_names(&self) -> DbResult<Vec<String>> {
            Ok(vec!["docs".to_string()])
        }

        async fn open_table(&self, name: &str) -> DbResult<Arc<dyn VectorTable>> {
            Err((self.open_error)(name))
        }

        async fn create_table(
            &self,
            name: &str,
            batch: RowBatch,
        ) -> DbResult<Arc<dyn VectorTable>> {
            self.inner.create_table(name, batch).await
        }
    }

    /// Fails to list tables with `error`.
    pub struct UnlistableDatabase(pub fn() -> DbError);

    #[async_trait]
    impl VectorDatabase for UnlistableDatabase {
        fn uri(&self) -> &str {
            "memory://unlistable"
        }

        async fn table_names(&self) -> DbResult<Vec<String>> {
            Err((self.0)())
        }

        async fn open_table(&self, name: &str) -> DbResult<Arc<dyn VectorTable>> {
            Err(DbError::table_not_found(name))
        }

        async fn create_table(
            &self,
            name: &str,
            _batch: RowBatch,
        ) -> DbResult<Arc<dyn VectorTable>> {
            Err(DbError::write(name, "read-only"))
        }
    }
}
