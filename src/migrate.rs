//! One-time migration of the legacy preference namespace.
//!
//! Every user-set key under the legacy root is copied into the current
//! namespace, then `prefs_converted` is set. Each copy overwrites its
//! destination, so a run that fails part way can simply be repeated; the
//! flag is only written once every key has been copied.

use tracing::{debug, info};
use translit_core::PrefBranch;

use crate::{Result, ServiceError};

/// Preference recording that the legacy namespace has been migrated.
pub const MIGRATION_FLAG: &str = "prefs_converted";

/// Where a legacy key is copied to, and in which string form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Plain(String),
    Rich(String),
}

fn route(name: &str) -> Route {
    if name == "layout" {
        Route::Plain(name.to_owned())
    } else if let Some(command) = name.strip_prefix("labels.") {
        Route::Rich(format!("commands.{}.label", command))
    } else if let Some(command) = name.strip_prefix("shortcuts.") {
        // Shortcuts land on the label key as well, not on `.shortcut`.
        Route::Plain(format!("commands.{}.label", command))
    } else {
        Route::Rich(name.to_owned())
    }
}

/// Copies legacy preferences into the current namespace once per profile.
#[derive(Debug, Clone)]
pub struct PreferenceMigrator {
    legacy: PrefBranch,
    current: PrefBranch,
}

impl PreferenceMigrator {
    pub fn new(legacy: PrefBranch, current: PrefBranch) -> Self {
        Self { legacy, current }
    }

    /// Returns `true` once the migration flag has been persisted.
    pub fn is_done(&self) -> bool {
        self.current.get_bool_pref(MIGRATION_FLAG)
    }

    /// Runs the migration unless it already happened, returning the number
    /// of keys copied.
    pub fn run(&self) -> Result<usize> {
        if self.is_done() {
            debug!("legacy preferences already migrated");
            return Ok(0);
        }

        let mut copied = 0;
        for name in self.legacy.child_list() {
            if !self.legacy.has_user_value(&name) {
                continue;
            }
            self.copy(&name).map_err(|source| ServiceError::Migration {
                key: format!("{}{}", self.legacy.root(), name),
                source,
            })?;
            copied += 1;
        }

        self.current.set_bool_pref(MIGRATION_FLAG, true)?;
        info!(copied, from = self.legacy.root(), "migrated legacy preferences");
        Ok(copied)
    }

    fn copy(&self, name: &str) -> translit_core::Result<()> {
        match route(name) {
            Route::Plain(dest) => {
                let value = self.legacy.get_char_pref(name)?;
                debug!(from = name, to = %dest, "copying plain preference");
                self.current.set_char_pref(&dest, &value)
            }
            Route::Rich(dest) => {
                let value = self.legacy.get_unicode_pref(name)?;
                debug!(from = name, to = %dest, "copying rich preference");
                self.current.set_unicode_pref(&dest, &value)
            }
        }
    }
}
