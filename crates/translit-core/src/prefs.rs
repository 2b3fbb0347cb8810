//! Preference storage and typed accessors.
//!
//! The host owns the real preference engine; everything here talks to it
//! through [`PreferenceStore`]. [`PrefBranch`] scopes a store to one
//! namespace and layers the typed accessors the rest of the crate relies on:
//! rich string reads fall back to plain string reads, while boolean reads
//! never fail and default to `false`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::Result;

/// Errors raised by preference reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefError {
    #[error("preference {0} is not set")]
    Missing(String),

    #[error("preference {key} is not a {expected} value")]
    WrongType { key: String, expected: &'static str },
}

/// A stored preference value.
///
/// Strings come in two flavours: plain `char` strings and rich `unicode`
/// strings. Only the rich form is guaranteed to carry non-ASCII text intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefValue {
    Bool(bool),
    Char(String),
    Unicode(String),
}

impl PrefValue {
    fn kind(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "bool",
            PrefValue::Char(_) | PrefValue::Unicode(_) => "string",
        }
    }
}

/// Raw access to the host preference engine, keyed by full preference name.
pub trait PreferenceStore {
    /// Reads a boolean value.
    fn get_bool(&self, key: &str) -> Result<bool>;

    /// Reads a plain string value.
    fn get_char(&self, key: &str) -> Result<String>;

    /// Reads a rich string value. Fails for values stored in plain form.
    fn get_complex(&self, key: &str) -> Result<String>;

    fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    fn set_char(&self, key: &str, value: &str) -> Result<()>;

    fn set_complex(&self, key: &str, value: &str) -> Result<()>;

    /// Lists every known key starting with `prefix`, user-set or default.
    fn child_list(&self, prefix: &str) -> Vec<String>;

    /// Returns `true` if the key carries a user-set value rather than only a default.
    fn has_user_value(&self, key: &str) -> bool;
}

#[derive(Debug, Default)]
struct Layers {
    defaults: BTreeMap<String, PrefValue>,
    user: BTreeMap<String, PrefValue>,
}

impl Layers {
    fn lookup(&self, key: &str) -> Option<&PrefValue> {
        self.user.get(key).or_else(|| self.defaults.get(key))
    }

    fn check_kind(&self, key: &str, value: &PrefValue) -> Result<()> {
        match self.lookup(key) {
            Some(existing) if existing.kind() != value.kind() => Err(PrefError::WrongType {
                key: key.to_owned(),
                expected: existing.kind(),
            }),
            _ => Ok(()),
        }
    }
}

/// In-memory preference store with a default layer and a user layer.
///
/// Reads see the user value first and then the default. Writes always land
/// in the user layer and must keep the kind (bool or string) of any value
/// already registered under the key.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    layers: RwLock<Layers>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a default value, visible until a user value overrides it.
    pub fn set_default(&self, key: &str, value: PrefValue) {
        self.layers.write().defaults.insert(key.to_owned(), value);
    }

    /// Stores a user value without any kind check.
    pub fn set_user(&self, key: &str, value: PrefValue) {
        self.layers.write().user.insert(key.to_owned(), value);
    }

    /// Removes the user value for a key, exposing its default again.
    pub fn clear_user_value(&self, key: &str) -> Option<PrefValue> {
        self.layers.write().user.remove(key)
    }

    /// Returns a copy of every user-set value.
    pub fn user_values(&self) -> BTreeMap<String, PrefValue> {
        self.layers.read().user.clone()
    }

    fn write(&self, key: &str, value: PrefValue) -> Result<()> {
        let mut layers = self.layers.write();
        layers.check_kind(key, &value)?;
        trace!(key, kind = value.kind(), "writing preference");
        layers.user.insert(key.to_owned(), value);
        Ok(())
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get_bool(&self, key: &str) -> Result<bool> {
        match self.layers.read().lookup(key) {
            Some(PrefValue::Bool(value)) => Ok(*value),
            Some(_) => Err(PrefError::WrongType {
                key: key.to_owned(),
                expected: "bool",
            }),
            None => Err(PrefError::Missing(key.to_owned())),
        }
    }

    fn get_char(&self, key: &str) -> Result<String> {
        // Both string kinds share one storage type, so a plain read sees either.
        match self.layers.read().lookup(key) {
            Some(PrefValue::Char(value) | PrefValue::Unicode(value)) => Ok(value.clone()),
            Some(_) => Err(PrefError::WrongType {
                key: key.to_owned(),
                expected: "char",
            }),
            None => Err(PrefError::Missing(key.to_owned())),
        }
    }

    fn get_complex(&self, key: &str) -> Result<String> {
        match self.layers.read().lookup(key) {
            Some(PrefValue::Unicode(value)) => Ok(value.clone()),
            Some(_) => Err(PrefError::WrongType {
                key: key.to_owned(),
                expected: "unicode",
            }),
            None => Err(PrefError::Missing(key.to_owned())),
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.write(key, PrefValue::Bool(value))
    }

    fn set_char(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, PrefValue::Char(value.to_owned()))
    }

    fn set_complex(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, PrefValue::Unicode(value.to_owned()))
    }

    fn child_list(&self, prefix: &str) -> Vec<String> {
        let layers = self.layers.read();
        let keys: BTreeSet<&String> = layers
            .defaults
            .keys()
            .chain(layers.user.keys())
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.into_iter().cloned().collect()
    }

    fn has_user_value(&self, key: &str) -> bool {
        self.layers.read().user.contains_key(key)
    }
}

type StringReader = fn(&dyn PreferenceStore, &str) -> Result<String>;

fn read_complex(store: &dyn PreferenceStore, key: &str) -> Result<String> {
    store.get_complex(key)
}

fn read_char(store: &dyn PreferenceStore, key: &str) -> Result<String> {
    store.get_char(key)
}

/// Accessors tried in order by [`PrefBranch::get_unicode_pref`].
const UNICODE_READERS: [StringReader; 2] = [read_complex, read_char];

/// A preference store scoped to one namespace root, e.g. `extensions.transliterator.`.
#[derive(Clone)]
pub struct PrefBranch {
    store: Arc<dyn PreferenceStore>,
    root: String,
}

impl fmt::Debug for PrefBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefBranch")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl PrefBranch {
    pub fn new(store: Arc<dyn PreferenceStore>, root: impl Into<String>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Returns the namespace root, including the trailing dot.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the name relative to this branch if `key` lives under it.
    pub fn relative_name<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.root.as_str())
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.root, name)
    }

    /// Reads a string, preferring the rich representation and falling back
    /// to the plain one. The last failure is returned if neither succeeds.
    pub fn get_unicode_pref(&self, name: &str) -> Result<String> {
        let key = self.key(name);
        let mut last_error = PrefError::Missing(key.clone());
        for reader in UNICODE_READERS {
            match reader(self.store.as_ref(), &key) {
                Ok(value) => return Ok(value),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }

    /// Writes a string in the rich representation so non-ASCII text survives.
    pub fn set_unicode_pref(&self, name: &str, value: &str) -> Result<()> {
        self.store.set_complex(&self.key(name), value)
    }

    pub fn get_char_pref(&self, name: &str) -> Result<String> {
        self.store.get_char(&self.key(name))
    }

    pub fn set_char_pref(&self, name: &str, value: &str) -> Result<()> {
        self.store.set_char(&self.key(name), value)
    }

    /// Reads a boolean. Missing keys and values of another type read as `false`.
    pub fn get_bool_pref(&self, name: &str) -> bool {
        self.store.get_bool(&self.key(name)).unwrap_or(false)
    }

    pub fn set_bool_pref(&self, name: &str, value: bool) -> Result<()> {
        self.store.set_bool(&self.key(name), value)
    }

    /// Lists every key under this branch, relative to the branch root.
    pub fn child_list(&self) -> Vec<String> {
        self.store
            .child_list(&self.root)
            .iter()
            .filter_map(|key| self.relative_name(key).map(str::to_owned))
            .collect()
    }

    pub fn has_user_value(&self, name: &str) -> bool {
        self.store.has_user_value(&self.key(name))
    }
}
