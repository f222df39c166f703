//! Shared test utilities for lancedock-cli integration tests.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use lancedock_db::table::{connect, ColumnNames, RowBatch, StoredRow};

/// Get a Command for the lancedock binary.
///
/// Color is forced off and the user's config file is ignored.
#[allow(deprecated)]
pub fn lancedock_cmd() -> Command {
    let mut cmd = Command::cargo_bin("lancedock").expect("lancedock binary should exist");
    cmd.env("LANCEDOCK_COLOR", "never")
        .env_remove("LANCEDOCK_CONFIG")
        .env_remove("LANCEDOCK_VERBOSE");
    cmd
}

/// Create a LanceDB table at `dir` with the given (id, text, metadata) rows.
pub fn seed_table(dir: &Path, table: &str, rows: &[(&str, &str, &str)]) {
    let uri = dir.to_string_lossy().to_string();
    let rows: Vec<StoredRow> = rows
        .iter()
        .enumerate()
        .map(|(i, (id, text, metadata))| StoredRow::new(*id, vec![i as f32, 1.0], *text, *metadata))
        .collect();

    let runtime = tokio::runtime::Runtime::new().expect("create runtime");
    runtime.block_on(async {
        let db = connect(&uri).await.expect("connect");
        db.create_table(table, RowBatch::new(ColumnNames::default(), rows))
            .await
            .expect("create table");
    });
}
