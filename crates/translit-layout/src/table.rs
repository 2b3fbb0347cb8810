//! Ordered pattern to replacement tables.

use serde_json::Value;

use crate::{LayoutError, Result};

/// Conversion table of a layout, in the order the JSON object lists it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
    entries: Vec<(String, String)>,
}

impl LayoutTable {
    /// Parses a layout's JSON text. Malformed JSON or anything other than an
    /// object of string values is an error; there is no fallback table.
    pub fn from_json(layout: &str, json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|source| LayoutError::InvalidJson {
                layout: layout.to_owned(),
                source,
            })?;

        let not_a_table = || LayoutError::NotATable {
            layout: layout.to_owned(),
        };

        let Value::Object(map) = value else {
            return Err(not_a_table());
        };

        let entries = map
            .into_iter()
            .map(|(pattern, replacement)| match replacement {
                Value::String(replacement) => Ok((pattern, replacement)),
                _ => Err(not_a_table()),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
