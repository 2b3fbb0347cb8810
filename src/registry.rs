//! Lazily built, cached endpoint list.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use translit_core::{
    COMMAND_TEMPLATES, DEFAULT_LAYOUT, Direction, KeyBinding, LEGACY_PREF_ROOT, PREF_ROOT,
    PrefBranch, PreferenceStore, parse_key_string,
};
use translit_layout::LayoutConverterFactory;

use crate::endpoint::{EndPoint, EndPoints};
use crate::migrate::PreferenceMigrator;
use crate::Result;

#[derive(Debug, Default)]
enum BuildState {
    #[default]
    Unbuilt,
    Built(EndPoints),
}

#[derive(Debug, Default)]
struct RegistryState {
    build: BuildState,
    migrated: bool,
}

/// Builds the endpoint list from preferences on first use and caches it
/// until [`EndPointRegistry::invalidate`] is called.
///
/// A list is either absent or complete; a failed build leaves the registry
/// unbuilt.
#[derive(Debug)]
pub struct EndPointRegistry {
    prefs: PrefBranch,
    migrator: PreferenceMigrator,
    converters: LayoutConverterFactory,
    state: Mutex<RegistryState>,
}

impl EndPointRegistry {
    /// Creates a registry reading the current namespace of `store` and
    /// migrating from its legacy namespace.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        let prefs = PrefBranch::new(store.clone(), PREF_ROOT);
        let legacy = PrefBranch::new(store, LEGACY_PREF_ROOT);
        Self {
            migrator: PreferenceMigrator::new(legacy, prefs.clone()),
            converters: LayoutConverterFactory::new(prefs.clone()),
            prefs,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Preferences of the current namespace.
    pub fn prefs(&self) -> &PrefBranch {
        &self.prefs
    }

    pub fn converters(&self) -> &LayoutConverterFactory {
        &self.converters
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state.lock().build, BuildState::Built(_))
    }

    /// Returns the cached list, building it first if necessary.
    pub fn end_points(&self) -> Result<EndPoints> {
        let migrated = {
            let state = self.state.lock();
            if let BuildState::Built(end_points) = &state.build {
                return Ok(end_points.clone());
            }
            state.migrated
        };

        // The lock is not held while reading preferences, so a store that
        // notifies synchronously can call back into the registry.
        if !migrated {
            self.migrator.run()?;
            self.state.lock().migrated = true;
        }

        let end_points: EndPoints = Arc::new(self.build()?);
        let mut state = self.state.lock();
        if let BuildState::Built(existing) = &state.build {
            return Ok(existing.clone());
        }
        state.build = BuildState::Built(end_points.clone());
        Ok(end_points)
    }

    /// Drops the cached list. Returns `true` if there was one, meaning
    /// delegates wired to it need reconfiguring.
    pub fn invalidate(&self) -> bool {
        let previous = mem::take(&mut self.state.lock().build);
        let was_built = matches!(previous, BuildState::Built(_));
        if was_built {
            debug!("endpoint list invalidated");
        }
        was_built
    }

    /// Preferred layout name; unset or empty means [`DEFAULT_LAYOUT`].
    pub fn preferred_layout(&self) -> String {
        match self.prefs.get_unicode_pref("layout") {
            Ok(layout) if !layout.is_empty() => layout,
            _ => DEFAULT_LAYOUT.to_owned(),
        }
    }

    fn build(&self) -> Result<Vec<EndPoint>> {
        let layout = self.preferred_layout();

        // One converter per direction, shared by every command using it.
        let forward = Arc::new(self.converters.create_converter(&layout, false)?);
        let reverse = Arc::new(self.converters.create_converter(&layout, true)?);

        let end_points = COMMAND_TEMPLATES
            .iter()
            .map(|template| -> Result<EndPoint> {
                let converter = match template.direction {
                    Direction::Forward => forward.clone(),
                    Direction::Reverse => reverse.clone(),
                };
                let label = self.prefs.get_unicode_pref(&template.label_pref())?;
                let shortcut = self.prefs.get_char_pref(&template.shortcut_pref())?;
                let binding = parse_key_string(&shortcut).unwrap_or_else(|| {
                    debug!(command = template.id, shortcut = %shortcut, "shortcut not bound");
                    KeyBinding::empty()
                });
                Ok(EndPoint::new(template, label, binding, converter))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(layout = %layout, count = end_points.len(), "built endpoints");
        Ok(end_points)
    }
}
