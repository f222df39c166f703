//! Message styling for CLI output.
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[info]` | Information | Blue |

use owo_colors::OwoColorize;

use super::color::ColorMode;

/// Message type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Operation failed
    Err,
    /// Neutral status
    Info,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Err => "[err]",
            Self::Info => "[info]",
        }
    }
}

/// Styling for CLI messages.
#[derive(Debug, Clone, Default)]
pub struct Style {
    color_mode: ColorMode,
}

impl Style {
    /// Create a Style instance with an explicit color mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a simple message with a type prefix.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Err => prefix.red().to_string(),
                MessageType::Info => prefix.blue().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Format a section header.
    pub fn section(&self, title: &str) -> String {
        if self.colors_enabled() {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format an error with its chain of causes and an optional hint.
    pub fn error_with_context(&self, msg: &str, causes: &[String], hint: Option<&str>) -> String {
        let mut output = self.message(MessageType::Err, msg);

        for cause in causes {
            output.push('\n');
            output.push_str(&format!("      Cause: {}", cause));
        }

        if let Some(hint_text) = hint {
            output.push('\n');
            if self.colors_enabled() {
                output.push_str(&format!("      {} {}", "Hint:".cyan(), hint_text));
            } else {
                output.push_str(&format!("      Hint: {}", hint_text));
            }
        }

        output
    }
}
