//! Per-window delegates and reconfiguration broadcast.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::Result;
use crate::endpoint::EndPoints;
use crate::service::TransliteratorService;

/// Identity of a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Adapter wiring endpoints into one window's UI.
pub trait WindowDelegate {
    /// Rebinds the window to the service's current endpoint list.
    ///
    /// May call back into the service, including attaching or detaching windows.
    fn reconfigure(&self, service: &TransliteratorService) -> Result<()>;

    /// Removes everything the delegate added to its window.
    fn detach(&self);
}

/// Constructs a delegate for a newly attached window.
pub trait DelegateFactory {
    fn create(
        &self,
        service: &TransliteratorService,
        window: WindowId,
        end_points: EndPoints,
    ) -> Arc<dyn WindowDelegate>;
}

type DelegateEntry = (WindowId, Arc<dyn WindowDelegate>);

/// Owns one delegate per open window.
#[derive(Default)]
pub struct WindowDelegateCoordinator {
    delegates: Mutex<Vec<DelegateEntry>>,
}

impl fmt::Debug for WindowDelegateCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowDelegateCoordinator")
            .field("windows", &self.windows())
            .finish()
    }
}

impl WindowDelegateCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a delegate for `window`. Returns `false`, leaving the existing
    /// delegate in place, if the window already has one.
    pub fn attach(&self, window: WindowId, delegate: Arc<dyn WindowDelegate>) -> bool {
        let mut delegates = self.delegates.lock();
        if delegates.iter().any(|(id, _)| *id == window) {
            return false;
        }
        delegates.push((window, delegate));
        debug!(%window, count = delegates.len(), "attached delegate");
        true
    }

    /// Removes and returns the delegate for `window`, if there is one.
    pub fn detach(&self, window: WindowId) -> Option<Arc<dyn WindowDelegate>> {
        let mut delegates = self.delegates.lock();
        let index = delegates.iter().position(|(id, _)| *id == window)?;
        let (_, delegate) = delegates.remove(index);
        debug!(%window, count = delegates.len(), "removed delegate");
        Some(delegate)
    }

    /// Removes every delegate and calls `detach` on each, in attach order.
    pub fn detach_all(&self) -> usize {
        let delegates = std::mem::take(&mut *self.delegates.lock());
        for (_, delegate) in &delegates {
            delegate.detach();
        }
        delegates.len()
    }

    /// Copy of the current delegates, in attach order.
    pub fn snapshot(&self) -> Vec<DelegateEntry> {
        self.delegates.lock().clone()
    }

    /// Calls `reconfigure` on every delegate attached when the broadcast
    /// starts. Iterates a snapshot so delegates may attach or detach windows
    /// from inside `reconfigure`. A failing delegate is logged and skipped.
    ///
    /// Returns the number of delegates reconfigured successfully.
    pub fn reconfigure_all(&self, service: &TransliteratorService) -> usize {
        let snapshot = self.snapshot();
        let mut reconfigured = 0;
        for (window, delegate) in &snapshot {
            match delegate.reconfigure(service) {
                Ok(()) => reconfigured += 1,
                Err(e) => error!(%window, error = %e, "Failed to reconfigure window"),
            }
        }
        debug!(reconfigured, total = snapshot.len(), "reconfigured delegates");
        reconfigured
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.delegates.lock().iter().any(|(id, _)| *id == window)
    }

    /// Attached windows, in attach order.
    pub fn windows(&self) -> Vec<WindowId> {
        self.delegates.lock().iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.delegates.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.lock().is_empty()
    }
}
