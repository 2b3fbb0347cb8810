//! Host application events and observer registration.

use std::fmt;

use crate::coordinator::WindowId;

/// Window lifecycle notifications the service subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    WindowOpened,
    WindowClosed,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::WindowOpened => "window-opened",
            Topic::WindowClosed => "window-closed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events the host delivers to [`crate::TransliteratorService::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A top-level window has been opened
    WindowOpened(WindowId),
    /// A top-level window has been closed
    WindowClosed(WindowId),
    /// A preference changed; carries the full preference key
    PrefChanged(String),
}

/// The host application, as seen by the service.
///
/// Registration is explicit: everything the service subscribes to in
/// `init` it unsubscribes from in `cleanup`.
pub trait Host {
    /// Windows that are already open.
    fn open_windows(&self) -> Vec<WindowId>;

    fn add_observer(&self, topic: Topic);

    fn remove_observer(&self, topic: Topic);

    /// Subscribes to changes of every preference under `root`.
    fn add_pref_observer(&self, root: &str);

    fn remove_pref_observer(&self, root: &str);
}
