//! # CLI UI Module
//!
//! Styling and table rendering for lancedock CLI output. Everything here is
//! plain text when colors are off, and every listing command also has a
//! `--json` form for scripts.
//!
//! - `color`: Color mode detection
//! - `style`: Message prefixes and error formatting
//! - `table`: Table rendering with comfy-table

pub mod color;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
