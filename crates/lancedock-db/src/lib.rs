//! # lancedock-db
//!
//! Storage layer for lancedock - LanceDB tables behind a small async trait seam.
//!
//! This crate keeps the heavy Arrow/LanceDB dependencies out of
//! `lancedock-core`:
//!
//! - Domain code is written against [`table::VectorDatabase`] and
//!   [`table::VectorTable`]
//! - Rows cross the seam as [`table::RowBatch`], never as Arrow arrays
//! - Tests can run the same code against the in-memory backend
//!
//! ## Architecture
//!
//! ```text
//! lancedock-cli → lancedock-core → (traits)
//!                       ↑
//!                 lancedock-db (implements traits for LanceDB / memory)
//! ```
//!
//! ## Features
//!
//! - `lancedb` (default): LanceDB storage with ANN search
//! - `memory`: in-memory tables selected by `memory://` URIs

pub mod error;
pub mod table;

pub use error::{DbError, DbResult};
