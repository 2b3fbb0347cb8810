//! Loading and saving the user's preference profile.
//!
//! Only user-set values are persisted; defaults are registered in code on
//! every start. The profile lives in a TOML file with one entry per
//! preference key, tagged with the value kind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{APP_NAME, MemoryPrefs, PrefValue};

/// On-disk layout of the profile file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
struct Profile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    prefs: BTreeMap<String, PrefValue>,
}

/// Manages loading and saving the preference profile file.
pub struct ProfileManager {
    profile_path: PathBuf,
}

impl ProfileManager {
    /// Creates a new ProfileManager using the default profile location.
    pub fn new() -> Result<Self> {
        let profile_path = Self::default_profile_path()?;
        Ok(Self { profile_path })
    }

    /// Creates a new ProfileManager for a specific profile file.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            profile_path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the default path to the profile file.
    pub fn default_profile_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join("prefs.toml"))
    }

    /// Loads the user values from the profile file. A missing file is an empty profile.
    pub fn load(&self) -> Result<BTreeMap<String, PrefValue>> {
        if !self.profile_path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.profile_path)
            .with_context(|| format!("Failed to read profile at {:?}", self.profile_path))?;

        let profile: Profile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile at {:?}", self.profile_path))?;

        Ok(profile.prefs)
    }

    /// Loads the profile and stores every value as a user value in `prefs`.
    pub fn load_into(&self, prefs: &MemoryPrefs) -> Result<usize> {
        let values = self.load()?;
        let count = values.len();
        for (key, value) in values {
            prefs.set_user(&key, value);
        }
        debug!(count, path = ?self.profile_path, "loaded profile");
        Ok(count)
    }

    /// Saves every user value held by `prefs` to the profile file.
    pub fn save(&self, prefs: &MemoryPrefs) -> Result<()> {
        let profile_dir = self
            .profile_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.profile_path))?;

        fs::create_dir_all(profile_dir)
            .with_context(|| format!("Failed to create profile directory at {:?}", profile_dir))?;

        let profile = Profile {
            prefs: prefs.user_values(),
        };
        let serialized = toml::to_string_pretty(&profile).context("Failed to serialize profile")?;

        fs::write(&self.profile_path, serialized)
            .with_context(|| format!("Failed to write profile at {:?}", self.profile_path))?;

        Ok(())
    }

    /// Returns the path to the profile file.
    pub fn profile_path(&self) -> &Path {
        &self.profile_path
    }
}
