//! Configuration types for lancedock.
//!
//! Options are layered: a [`TableConfig`] is fixed when a table is registered,
//! and every call may override parts of it with [`IndexOptions`] or
//! [`RetrieveOptions`]. The layers are resolved once per invocation into a
//! [`ResolvedIndexOptions`] or [`ResolvedRetrieveOptions`]; call-level values
//! win.
//!
//! - [`PluginConfig`]: the set of registered tables, stored in
//!   `~/.lancedock/config.yaml`
//! - [`WriteMode`]: how indexed rows are merged into a table

use lancedock_db::table::ColumnNames;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    CONFIG_ENV, CONFIG_FILENAME, DEFAULT_DB_URI, DEFAULT_K, DEFAULT_METADATA_COLUMN,
    DEFAULT_TABLE_NAME, DEFAULT_TEXT_COLUMN, DEFAULT_VECTOR_COLUMN, LANCEDOCK_HOME_DIR,
};
use crate::errors::{LanceError, LanceResult};

// ============================================================================
// WriteMode
// ============================================================================

/// How indexed rows are merged into a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Create the table; fails if it already exists.
    Create,
    /// Add rows to the existing rows (default).
    #[default]
    Append,
    /// Replace all existing rows, keeping the table.
    Overwrite,
}

impl WriteMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Append => "append",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = LanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(LanceError::invalid_configuration(
                format!("unknown write mode `{}`", other),
                "Valid modes: create, append, overwrite",
            )),
        }
    }
}

// ============================================================================
// TableConfig
// ============================================================================

/// Registration-level options for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Location of the vector store.
    #[serde(default = "default_db_uri")]
    pub db_uri: String,

    /// Logical collection name.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Column holding embeddings.
    #[serde(default = "default_vector_column")]
    pub vector_column_name: String,

    /// Column holding primary text.
    #[serde(default = "default_text_column")]
    pub text_column_name: String,

    /// Column holding JSON metadata.
    #[serde(default = "default_metadata_column")]
    pub metadata_column_name: String,

    /// Default write mode for indexing.
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Default number of retrieval results.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Default filter expression for retrieval.
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Options handed to the embedder verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedder_options: Option<Value>,
}

fn default_db_uri() -> String {
    DEFAULT_DB_URI.to_string()
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_vector_column() -> String {
    DEFAULT_VECTOR_COLUMN.to_string()
}

fn default_text_column() -> String {
    DEFAULT_TEXT_COLUMN.to_string()
}

fn default_metadata_column() -> String {
    DEFAULT_METADATA_COLUMN.to_string()
}

fn default_k() -> usize {
    DEFAULT_K
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            db_uri: default_db_uri(),
            table_name: default_table_name(),
            vector_column_name: default_vector_column(),
            text_column_name: default_text_column(),
            metadata_column_name: default_metadata_column(),
            write_mode: WriteMode::default(),
            k: DEFAULT_K,
            filter: None,
            embedder_options: None,
        }
    }
}

impl TableConfig {
    /// Create a config for `table_name` at `db_uri`, everything else default.
    pub fn new(db_uri: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            db_uri: db_uri.into(),
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Set the column names.
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.vector_column_name = columns.vector;
        self.text_column_name = columns.text;
        self.metadata_column_name = columns.metadata;
        self
    }

    /// Set the default write mode.
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Set the default result count.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the default filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the embedder options.
    pub fn with_embedder_options(mut self, options: Value) -> Self {
        self.embedder_options = Some(options);
        self
    }

    /// The configured column names.
    pub fn columns(&self) -> ColumnNames {
        ColumnNames::new(
            &self.vector_column_name,
            &self.text_column_name,
            &self.metadata_column_name,
        )
    }

    /// Resolve indexing options for one call.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::InvalidConfiguration`] if the resolved table name
    /// or a column name is empty.
    pub fn resolve_index(&self, options: &IndexOptions) -> LanceResult<ResolvedIndexOptions> {
        let resolved = ResolvedIndexOptions {
            db_uri: pick(&options.db_uri, &self.db_uri),
            table_name: pick(&options.table_name, &self.table_name),
            columns: ColumnNames::new(
                pick(&options.vector_column_name, &self.vector_column_name),
                pick(&options.text_column_name, &self.text_column_name),
                pick(&options.metadata_column_name, &self.metadata_column_name),
            ),
            write_mode: options.write_mode.unwrap_or(self.write_mode),
            embedder_options: self.embedder_options.clone(),
        };
        validate_names(&resolved.table_name, &resolved.columns)?;
        Ok(resolved)
    }

    /// Resolve retrieval options for one call.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::InvalidConfiguration`] if `k` resolves to zero or
    /// a name is empty.
    pub fn resolve_retrieve(
        &self,
        options: &RetrieveOptions,
    ) -> LanceResult<ResolvedRetrieveOptions> {
        let resolved = ResolvedRetrieveOptions {
            db_uri: pick(&options.db_uri, &self.db_uri),
            table_name: pick(&options.table_name, &self.table_name),
            columns: ColumnNames::new(
                pick(&options.vector_column_name, &self.vector_column_name),
                pick(&options.text_column_name, &self.text_column_name),
                pick(&options.metadata_column_name, &self.metadata_column_name),
            ),
            k: options.k.unwrap_or(self.k),
            filter: options.filter.clone().or_else(|| self.filter.clone()),
            embedder_options: self.embedder_options.clone(),
        };
        if resolved.k == 0 {
            return Err(LanceError::invalid_configuration(
                "k must be a positive integer",
                "Set k to 1 or more",
            ));
        }
        validate_names(&resolved.table_name, &resolved.columns)?;
        Ok(resolved)
    }
}

fn pick(over: &Option<String>, base: &str) -> String {
    over.clone().unwrap_or_else(|| base.to_string())
}

fn validate_names(table_name: &str, columns: &ColumnNames) -> LanceResult<()> {
    if table_name.is_empty() {
        return Err(LanceError::invalid_configuration(
            "table name is empty",
            "Set tableName to a non-empty name",
        ));
    }
    for (option, value) in [
        ("vectorColumnName", &columns.vector),
        ("textColumnName", &columns.text),
        ("metadataColumnName", &columns.metadata),
    ] {
        if value.is_empty() {
            return Err(LanceError::invalid_configuration(
                format!("{} is empty", option),
                format!("Set {} or omit it to use the default", option),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Call-level Options
// ============================================================================

/// Per-call overrides for indexing. Unset fields fall back to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<WriteMode>,
}

impl IndexOptions {
    /// Override the write mode.
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = Some(mode);
        self
    }

    /// Override the table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Override the connection URI.
    pub fn with_db_uri(mut self, db_uri: impl Into<String>) -> Self {
        self.db_uri = Some(db_uri.into());
        self
    }
}

/// Per-call overrides for retrieval. Unset fields fall back to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_column_name: Option<String>,
}

impl RetrieveOptions {
    /// Override the result count.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Override the filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Override the connection URI.
    pub fn with_db_uri(mut self, db_uri: impl Into<String>) -> Self {
        self.db_uri = Some(db_uri.into());
        self
    }
}

// ============================================================================
// Resolved Options
// ============================================================================

/// Fully resolved options for one indexing call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIndexOptions {
    pub db_uri: String,
    pub table_name: String,
    pub columns: ColumnNames,
    pub write_mode: WriteMode,
    pub embedder_options: Option<Value>,
}

/// Fully resolved options for one retrieval call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRetrieveOptions {
    pub db_uri: String,
    pub table_name: String,
    pub columns: ColumnNames,
    pub k: usize,
    pub filter: Option<String>,
    pub embedder_options: Option<Value>,
}

// ============================================================================
// PluginConfig
// ============================================================================

/// The tables to register, as read from `config.yaml`.
///
/// ```yaml
/// tables:
///   - tableName: docs
///     dbUri: /var/lib/lancedock
///     k: 10
///   - tableName: notes
///     writeMode: overwrite
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Registered tables.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl PluginConfig {
    /// Load from `$LANCEDOCK_CONFIG`, else `~/.lancedock/config.yaml`.
    ///
    /// A missing file yields an empty configuration.
    pub fn load_default() -> LanceResult<Self> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using empty config");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path. A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::ConfigIo`] if the file cannot be read,
    /// [`LanceError::ConfigParse`] if it is not valid YAML for this shape, and
    /// [`LanceError::InvalidConfiguration`] if two tables share a name.
    pub fn from_path(path: &Path) -> LanceResult<Self> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| LanceError::ConfigIo {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| LanceError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default lancedock directory (`~/.lancedock`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(LANCEDOCK_HOME_DIR))
    }

    /// Get the default config file path, honouring `$LANCEDOCK_CONFIG`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        Self::default_dir().map(|d| d.join(CONFIG_FILENAME))
    }

    /// Check that table names are unique.
    pub fn validate(&self) -> LanceResult<()> {
        let mut seen = std::collections::HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.table_name.as_str()) {
                return Err(LanceError::invalid_configuration(
                    format!("table `{}` is configured twice", table.table_name),
                    "Give every table entry a unique tableName",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_config_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.db_uri, ".db");
        assert_eq!(config.table_name, "table");
        assert_eq!(config.columns(), ColumnNames::default());
        assert_eq!(config.write_mode, WriteMode::Append);
        assert_eq!(config.k, 5);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_table_config_deserialize_partial() {
        let config: TableConfig =
            serde_json::from_value(json!({"tableName": "docs", "where": "lang = 'en'"})).unwrap();
        assert_eq!(config.table_name, "docs");
        assert_eq!(config.db_uri, ".db");
        assert_eq!(config.filter.as_deref(), Some("lang = 'en'"));
        assert_eq!(config.k, 5);
    }

    #[test]
    fn test_write_mode_parse() {
        assert_eq!("overwrite".parse::<WriteMode>().unwrap(), WriteMode::Overwrite);
        assert_eq!("APPEND".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!(WriteMode::Create.to_string(), "create");
        assert!("upsert".parse::<WriteMode>().is_err());
    }

    #[test]
    fn test_resolve_index_call_level_wins() {
        let config = TableConfig::new("/data", "docs").with_write_mode(WriteMode::Overwrite);

        let resolved = config.resolve_index(&IndexOptions::default()).unwrap();
        assert_eq!(resolved.db_uri, "/data");
        assert_eq!(resolved.table_name, "docs");
        assert_eq!(resolved.write_mode, WriteMode::Overwrite);

        let options = IndexOptions::default()
            .with_write_mode(WriteMode::Append)
            .with_table_name("other");
        let resolved = config.resolve_index(&options).unwrap();
        assert_eq!(resolved.write_mode, WriteMode::Append);
        assert_eq!(resolved.table_name, "other");
    }

    #[test]
    fn test_resolve_retrieve_layers() {
        let config = TableConfig::new("/data", "docs")
            .with_k(3)
            .with_filter("a = 1")
            .with_embedder_options(json!({"taskType": "RETRIEVAL_QUERY"}));

        let resolved = config.resolve_retrieve(&RetrieveOptions::default()).unwrap();
        assert_eq!(resolved.k, 3);
        assert_eq!(resolved.filter.as_deref(), Some("a = 1"));
        assert_eq!(
            resolved.embedder_options,
            Some(json!({"taskType": "RETRIEVAL_QUERY"}))
        );

        let options = RetrieveOptions::default().with_k(10).with_filter("b = 2");
        let resolved = config.resolve_retrieve(&options).unwrap();
        assert_eq!(resolved.k, 10);
        assert_eq!(resolved.filter.as_deref(), Some("b = 2"));
    }

    #[test]
    fn test_resolve_retrieve_rejects_zero_k() {
        let config = TableConfig::default();
        let err = config
            .resolve_retrieve(&RetrieveOptions::default().with_k(0))
            .unwrap_err();
        assert!(matches!(err, LanceError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_resolve_rejects_empty_column() {
        let mut config = TableConfig::default();
        config.text_column_name = String::new();
        assert!(config.resolve_index(&IndexOptions::default()).is_err());
    }

    #[test]
    fn test_plugin_config_from_yaml() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            r#"
tables:
  - tableName: docs
    dbUri: /var/lib/lancedock
    k: 10
  - tableName: notes
    writeMode: overwrite
    textColumnName: body
"#,
        )
        .unwrap();

        let config = PluginConfig::from_path(&path).unwrap();
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0].k, 10);
        assert_eq!(config.tables[1].write_mode, WriteMode::Overwrite);
        assert_eq!(config.tables[1].text_column_name, "body");
        assert_eq!(config.tables[1].db_uri, ".db");
    }

    #[test]
    fn test_plugin_config_missing_file_is_empty() {
        let config = PluginConfig::from_path(Path::new("/nonexistent/lancedock.yaml")).unwrap();
        assert!(config.tables.is_empty());
    }

    #[test]
    fn test_plugin_config_rejects_duplicates() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "tables:\n  - tableName: docs\n  - tableName: docs\n").unwrap();
        assert!(matches!(
            PluginConfig::from_path(&path),
            Err(LanceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_plugin_config_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "tables: [unclosed").unwrap();
        assert!(matches!(
            PluginConfig::from_path(&path),
            Err(LanceError::ConfigParse { .. })
        ));
    }
}
