//! Display blocks produced by the renderer and consumed by presentation adapters.

use serde::Serialize;

/// A run of text, optionally emphasized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// One typed unit of rendered content. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBlock {
    Heading { level: u8, text: String },
    Paragraph { spans: Vec<Span> },
    BulletList { items: Vec<Vec<Span>> },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
}

impl DisplayBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        DisplayBlock::Heading {
            level,
            text: text.into(),
        }
    }
}
