//! Command endpoints and preference handling for transliterator.
//!
//! [`TransliteratorService`] turns the user's preferences into the list of
//! commands (endpoints) every open window binds, and keeps all window
//! delegates in step when those preferences change.

// Re-export from sub-crates
pub use translit_core::{
    APP_NAME, APP_NAME_PRETTY, COMMAND_TEMPLATES, CommandTemplate, DEFAULT_LAYOUT,
    DEFAULT_LOG_LEVEL, Direction, EndPointKind, KeyBinding, LEGACY_PREF_ROOT, MemoryPrefs,
    Modifier, PREF_ROOT, PrefBranch, PrefError, PrefValue, PreferenceStore, ProfileManager,
    parse_key_string, register_defaults,
};
pub use translit_layout::{Converter, LayoutConverterFactory, LayoutError, LayoutTable};
use thiserror::Error;

pub mod console;
pub mod coordinator;
pub mod endpoint;
pub mod event;
pub mod migrate;
pub mod registry;
pub mod service;

pub use coordinator::{DelegateFactory, WindowDelegate, WindowDelegateCoordinator, WindowId};
pub use endpoint::{EndPoint, EndPoints};
pub use event::{Host, HostEvent, Topic};
pub use migrate::PreferenceMigrator;
pub use registry::EndPointRegistry;
pub use service::TransliteratorService;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors surfaced by the service and its components.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Pref(#[from] PrefError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to migrate legacy preference {key}: {source}")]
    Migration {
        key: String,
        #[source]
        source: PrefError,
    },
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
