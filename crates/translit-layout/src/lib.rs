//! Layout tables and converter construction for transliterator.
//!
//! A layout is a named conversion table stored as JSON in the preferences.
//! This crate turns a layout name into a configured [`Converter`]; running
//! the conversion itself is left to the consumer of the converter.

mod converter;
mod table;

pub use converter::{Converter, LayoutConverterFactory};
pub use table::LayoutTable;
use thiserror::Error;
use translit_core::PrefError;

/// Errors that can occur while loading a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout {layout} is not valid JSON: {source}")]
    InvalidJson {
        layout: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("layout {layout} is not a table of string replacements")]
    NotATable { layout: String },

    #[error(transparent)]
    Pref(#[from] PrefError),
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
