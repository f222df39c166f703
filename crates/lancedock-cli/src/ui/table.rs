//! Table rendering for CLI output using comfy-table.
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `lancedock tables` | `render_tables_table()` |
//! | `lancedock show` | `render_rows_table()` |
//! | `lancedock registrations` | `render_registrations_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use lancedock_core::Registration;

/// Table information for `lancedock tables`.
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Table name
    pub name: String,
    /// Number of rows
    pub rows: usize,
}

/// One stored row, rebuilt as a document, for `lancedock show`.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    /// Row id
    pub id: String,
    /// Document text
    pub text: String,
    /// Metadata as compact JSON
    pub metadata: String,
}

/// Render the table listing.
///
/// ```text
/// TABLE     ROWS
/// docs        42
/// notes        3
/// ```
pub fn render_tables_table(tables: &[TableRow]) -> String {
    if tables.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("TABLE"),
        Cell::new("ROWS").set_alignment(CellAlignment::Right),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(8)), // TABLE
        ColumnConstraint::LowerBoundary(Width::Fixed(6)), // ROWS
    ]);

    for row in tables {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.rows).set_alignment(CellAlignment::Right),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render stored rows.
///
/// Ids are shortened to 12 characters and text to 48.
pub fn render_rows_table(rows: &[DocumentRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("TEXT"),
        Cell::new("METADATA"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(12)), // ID
        ColumnConstraint::LowerBoundary(Width::Fixed(20)), // TEXT
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // METADATA
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(truncate_str(&row.id, 12)),
            Cell::new(truncate_str(&row.text.replace('\n', " "), 48)),
            Cell::new(truncate_str(&row.metadata, 40)),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render the components a plugin configuration registers.
///
/// ```text
/// KIND        NAME            URI
/// retriever   lancedb/docs    .db
/// indexer     lancedb/docs    .db
/// ```
pub fn render_registrations_table(registrations: &[Registration]) -> String {
    if registrations.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![Cell::new("KIND"), Cell::new("NAME"), Cell::new("URI")]);

    for registration in registrations {
        table.add_row(vec![
            Cell::new(registration.kind),
            Cell::new(&registration.name),
            Cell::new(&registration.db_uri),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Truncate a string to at most `max_len` characters, ending in `...`.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
