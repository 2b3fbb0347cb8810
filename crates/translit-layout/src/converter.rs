//! Converter construction from layout preferences.

use tracing::debug;
use translit_core::{Direction, PrefBranch};

use crate::{LayoutTable, Result};

/// A converter configured for one layout and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    layout: String,
    table: LayoutTable,
    case_sensitive: bool,
    direction: Direction,
}

impl Converter {
    pub fn new(
        layout: impl Into<String>,
        table: LayoutTable,
        case_sensitive: bool,
        direction: Direction,
    ) -> Self {
        Self {
            layout: layout.into(),
            table,
            case_sensitive,
            direction,
        }
    }

    /// Name of the layout this converter was built from.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn table(&self) -> &LayoutTable {
        &self.table
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Builds converters from the `layouts.<name>` preferences of a branch.
#[derive(Debug, Clone)]
pub struct LayoutConverterFactory {
    prefs: PrefBranch,
}

impl LayoutConverterFactory {
    pub fn new(prefs: PrefBranch) -> Self {
        Self { prefs }
    }

    /// Reads `layouts.<name>` as JSON and `layouts.<name>.case_sensitive` as a
    /// flag, and returns a converter for the requested direction.
    ///
    /// A missing or corrupt layout is an error.
    pub fn create_converter(&self, layout: &str, reversed: bool) -> Result<Converter> {
        let json = self.prefs.get_unicode_pref(&format!("layouts.{}", layout))?;
        let case_sensitive = self
            .prefs
            .get_bool_pref(&format!("layouts.{}.case_sensitive", layout));
        let table = LayoutTable::from_json(layout, &json)?;
        let direction = Direction::from_reversed(reversed);

        debug!(
            layout,
            entries = table.len(),
            case_sensitive,
            direction = ?direction,
            "created converter"
        );

        Ok(Converter::new(layout, table, case_sensitive, direction))
    }
}
