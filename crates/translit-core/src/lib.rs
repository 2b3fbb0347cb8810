//! Core types and preference handling for transliterator.
//!
//! This crate provides the host-agnostic pieces shared by the other
//! transliterator crates: the preference store interface and its typed
//! accessors, shortcut parsing, and the command endpoint types.

mod config;
mod defaults;
mod endpoint;
mod keys;
mod prefs;

pub use config::ProfileManager;
pub use defaults::{DEFAULT_LAYOUT, register_defaults};
pub use endpoint::{COMMAND_TEMPLATES, CommandTemplate, Direction, EndPointKind};
pub use keys::{KeyBinding, Modifier, parse_key_string};
pub use prefs::{MemoryPrefs, PrefBranch, PrefError, PrefValue, PreferenceStore};

/// Application name
pub const APP_NAME: &str = "transliterator";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "Transliterator";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Preference namespace of the current schema.
pub const PREF_ROOT: &str = "extensions.transliterator.";

/// Preference namespace of the legacy schema, migrated once per profile.
pub const LEGACY_PREF_ROOT: &str = "extensions.tocyrillic.";

/// Result type for preference operations.
pub type Result<T> = std::result::Result<T, PrefError>;
