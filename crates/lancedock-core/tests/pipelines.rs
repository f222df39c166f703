//! End-to-end tests: plugin registration, indexing and retrieval against a
//! LanceDB table in a temporary directory.

use std::sync::Arc;

use async_trait::async_trait;
use lancedock_core::{
    content_id, Document, Embedder, Embedding, IndexOptions, LanceDbPlugin, LanceError,
    LanceResult, Metadata, Registry, RetrieveOptions, TableConfig, WriteMode,
};
use lancedock_db::table::{connect, ID_COLUMN};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Embeds text as vowel counts, so similar spellings land close together.
struct VowelEmbedder;

#[async_trait]
impl Embedder for VowelEmbedder {
    fn name(&self) -> &str {
        "vowels"
    }

    async fn embed(
        &self,
        document: &Document,
        _options: Option<&Value>,
    ) -> LanceResult<Vec<Embedding>> {
        let Some(text) = document.text() else {
            return Ok(Vec::new());
        };
        let lower = text.to_lowercase();
        let vector = ['a', 'e', 'i', 'o', 'u']
            .iter()
            .map(|v| lower.chars().filter(|c| c == v).count() as f32)
            .collect();
        Ok(vec![vector])
    }
}

fn metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn registry(uri: &str) -> Registry {
    let plugin = LanceDbPlugin::new(Arc::new(VowelEmbedder), vec![TableConfig::new(uri, "docs")]);
    let mut registry = Registry::new();
    plugin.register(&mut registry).expect("register plugin");
    registry
}

#[tokio::test]
async fn test_index_and_retrieve_on_lancedb() {
    let temp = TempDir::new().expect("create temp dir");
    let uri = temp.path().to_string_lossy().to_string();
    let registry = registry(&uri);

    let docs = vec![
        Document::from_text("aaa").with_metadata(metadata(json!({"lang": "en"}))),
        Document::from_text("ooo").with_metadata(metadata(json!({"lang": "fr"}))),
    ];
    let report = registry
        .indexer("lancedb/docs")
        .unwrap()
        .index(&docs, &IndexOptions::default())
        .await
        .expect("index");
    assert_eq!(report.mode, Some(WriteMode::Create));
    assert_eq!(report.rows_written, 2);

    let db = connect(&uri).await.expect("connect");
    let table = db.open_table("docs").await.expect("open");
    let ids: Vec<String> = table
        .scan(10, &[ID_COLUMN.to_string()])
        .await
        .expect("scan")
        .iter()
        .filter_map(|hit| hit.get(ID_COLUMN).map(str::to_string))
        .collect();
    assert!(ids.contains(&content_id("aaa", r#"{"lang":"en"}"#)));

    let retriever = registry.retriever("lancedb/docs").unwrap();
    let found = retriever
        .retrieve(&Document::from_text("aa"), &RetrieveOptions::default().with_k(1))
        .await
        .expect("retrieve");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text().as_deref(), Some("aaa"));
    assert_eq!(found[0].metadata, metadata(json!({"lang": "en"})));
}

#[tokio::test]
async fn test_filter_reaches_lancedb() {
    let temp = TempDir::new().expect("create temp dir");
    let uri = temp.path().to_string_lossy().to_string();
    let registry = registry(&uri);

    registry
        .indexer("lancedb/docs")
        .unwrap()
        .index(
            &[Document::from_text("aaa"), Document::from_text("ooo")],
            &IndexOptions::default(),
        )
        .await
        .expect("index");

    let found = registry
        .retriever("lancedb/docs")
        .unwrap()
        .retrieve(
            &Document::from_text("aa"),
            &RetrieveOptions::default().with_filter("text = 'ooo'"),
        )
        .await
        .expect("retrieve");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text().as_deref(), Some("ooo"));
}

#[tokio::test]
async fn test_overwrite_then_append_on_lancedb() {
    let temp = TempDir::new().expect("create temp dir");
    let uri = temp.path().to_string_lossy().to_string();
    let indexer = registry(&uri).indexer("lancedb/docs").unwrap();

    indexer
        .index(
            &[Document::from_text("aaa"), Document::from_text("ooo")],
            &IndexOptions::default(),
        )
        .await
        .expect("create");
    indexer
        .index(
            &[Document::from_text("eee")],
            &IndexOptions::default().with_write_mode(WriteMode::Overwrite),
        )
        .await
        .expect("overwrite");

    let db = connect(&uri).await.expect("connect");
    assert_eq!(db.open_table("docs").await.unwrap().count_rows().await.unwrap(), 1);

    indexer
        .index(&[Document::from_text("iii")], &IndexOptions::default())
        .await
        .expect("append");
    assert_eq!(db.open_table("docs").await.unwrap().count_rows().await.unwrap(), 2);
}

#[tokio::test]
async fn test_retrieve_from_missing_database_is_empty() {
    let temp = TempDir::new().expect("create temp dir");
    let uri = temp.path().join("never-written").to_string_lossy().to_string();

    let found = registry(&uri)
        .retriever("lancedb/docs")
        .unwrap()
        .retrieve(&Document::from_text("aa"), &RetrieveOptions::default())
        .await
        .expect("retrieve");
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_unknown_component_is_not_registered() {
    let registry = registry(".db");
    assert!(matches!(
        registry.indexer("lancedb/other"),
        Err(LanceError::NotRegistered { .. })
    ));
}
