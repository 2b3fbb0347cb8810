//! The top-level service tying preferences, endpoints and windows together.
//!
//! A host owns exactly one [`TransliteratorService`]. `init` subscribes to
//! window and preference notifications and attaches to the windows that are
//! already open; `cleanup` undoes all of it. Between the two, the host feeds
//! notifications in through [`TransliteratorService::observe`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info};
use translit_core::{PREF_ROOT, PrefBranch, PreferenceStore};

use crate::Result;
use crate::coordinator::{DelegateFactory, WindowDelegateCoordinator, WindowId};
use crate::endpoint::EndPoints;
use crate::event::{Host, HostEvent, Topic};
use crate::migrate::MIGRATION_FLAG;
use crate::registry::EndPointRegistry;

/// Owns the endpoint registry and the per-window delegates.
pub struct TransliteratorService {
    host: Arc<dyn Host>,
    registry: EndPointRegistry,
    coordinator: WindowDelegateCoordinator,
    delegates: Box<dyn DelegateFactory>,
    initialized: AtomicBool,
}

impl TransliteratorService {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        host: Arc<dyn Host>,
        delegates: Box<dyn DelegateFactory>,
    ) -> Self {
        Self {
            host,
            registry: EndPointRegistry::new(store),
            coordinator: WindowDelegateCoordinator::new(),
            delegates,
            initialized: AtomicBool::new(false),
        }
    }

    /// Subscribes to preference and window notifications and attaches to
    /// every window already open. Does nothing if already initialized.
    ///
    /// On failure everything set up so far is undone and the service stays
    /// uninitialized, so `init` can be called again.
    pub fn init(&self) -> Result<()> {
        if self.is_initialized() {
            debug!("service already initialized");
            return Ok(());
        }

        self.host.add_pref_observer(PREF_ROOT);

        if let Err(e) = self.attach_open_windows() {
            self.host.remove_pref_observer(PREF_ROOT);
            let detached = self.coordinator.detach_all();
            error!(error = %e, detached, "Failed to initialize service");
            return Err(e);
        }

        self.host.add_observer(Topic::WindowOpened);
        self.host.add_observer(Topic::WindowClosed);
        self.initialized.store(true, Ordering::SeqCst);

        info!(windows = self.coordinator.len(), "service initialized");
        Ok(())
    }

    fn attach_open_windows(&self) -> Result<()> {
        for window in self.host.open_windows() {
            self.attach_to_window(window)?;
        }
        Ok(())
    }

    /// Unsubscribes from every notification and detaches every delegate.
    pub fn cleanup(&self) {
        if !self.initialized.swap(false, Ordering::SeqCst) {
            return;
        }

        self.host.remove_observer(Topic::WindowOpened);
        self.host.remove_observer(Topic::WindowClosed);
        self.host.remove_pref_observer(PREF_ROOT);

        let detached = self.coordinator.detach_all();
        info!(detached, "service cleaned up");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Dispatches a host notification.
    pub fn observe(&self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::WindowOpened(window) => self.attach_to_window(window),
            HostEvent::WindowClosed(window) => {
                self.detach_from_window(window);
                Ok(())
            }
            HostEvent::PrefChanged(key) => {
                if self.affects_end_points(&key) {
                    self.update_end_points();
                }
                Ok(())
            }
        }
    }

    fn affects_end_points(&self, key: &str) -> bool {
        matches!(
            self.prefs().relative_name(key),
            Some(name) if name != MIGRATION_FLAG
        )
    }

    /// Creates a delegate for `window`, building the endpoint list if needed.
    /// A window that already has a delegate is left alone.
    pub fn attach_to_window(&self, window: WindowId) -> Result<()> {
        if self.coordinator.contains(window) {
            debug!(%window, "window already attached");
            return Ok(());
        }

        let end_points = self.registry.end_points()?;
        let delegate = self.delegates.create(self, window, end_points);
        if !self.coordinator.attach(window, delegate.clone()) {
            // The factory attached this window itself in the meantime.
            delegate.detach();
        }
        Ok(())
    }

    /// Removes and detaches the delegate for `window`. Unknown windows are ignored.
    pub fn detach_from_window(&self, window: WindowId) -> bool {
        match self.coordinator.detach(window) {
            Some(delegate) => {
                delegate.detach();
                true
            }
            None => {
                debug!(%window, "no delegate to detach");
                false
            }
        }
    }

    /// Call when menus or shortcuts change. Drops the cached endpoints and,
    /// if there were any, asks every delegate to reconfigure.
    pub fn update_end_points(&self) -> usize {
        if !self.registry.invalidate() {
            return 0;
        }

        self.coordinator.reconfigure_all(self)
    }

    /// Current endpoint list, built on first use.
    pub fn end_points(&self) -> Result<EndPoints> {
        self.registry.end_points()
    }

    /// Preferences of the current namespace.
    pub fn prefs(&self) -> &PrefBranch {
        self.registry.prefs()
    }

    pub fn preferred_layout(&self) -> String {
        self.registry.preferred_layout()
    }

    pub fn registry(&self) -> &EndPointRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &WindowDelegateCoordinator {
        &self.coordinator
    }
}

impl Drop for TransliteratorService {
    fn drop(&mut self) {
        if self.is_initialized() {
            error!("service dropped without cleanup");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use parking_lot::Mutex;
    use translit_core::{MemoryPrefs, PrefValue, register_defaults};

    use super::*;
    use crate::coordinator::WindowDelegate;

    #[derive(Default)]
    struct TestHost {
        windows: Vec<WindowId>,
        calls: Mutex<Vec<String>>,
    }

    impl TestHost {
        fn with_windows(windows: &[u64]) -> Self {
            Self {
                windows: windows.iter().copied().map(WindowId).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl Host for TestHost {
        fn open_windows(&self) -> Vec<WindowId> {
            self.windows.clone()
        }

        fn add_observer(&self, topic: Topic) {
            self.calls.lock().push(format!("+{}", topic));
        }

        fn remove_observer(&self, topic: Topic) {
            self.calls.lock().push(format!("-{}", topic));
        }

        fn add_pref_observer(&self, root: &str) {
            self.calls.lock().push(format!("+{}", root));
        }

        fn remove_pref_observer(&self, root: &str) {
            self.calls.lock().push(format!("-{}", root));
        }
    }

    /// Shared record of what every delegate did.
    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, entry: String) {
            self.entries.lock().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().clone()
        }
    }

    /// What a delegate does from inside `reconfigure`.
    #[derive(Clone, Copy)]
    enum OnReconfigure {
        Nothing,
        DetachSelf,
        DetachWindow(u64),
        AttachWindow(u64),
    }

    struct TestDelegate {
        window: WindowId,
        end_points: RefCell<EndPoints>,
        on_reconfigure: OnReconfigure,
        journal: Arc<Journal>,
    }

    impl WindowDelegate for TestDelegate {
        fn reconfigure(&self, service: &TransliteratorService) -> Result<()> {
            self.journal.push(format!("reconfigure {}", self.window.0));
            match self.on_reconfigure {
                OnReconfigure::Nothing => {}
                OnReconfigure::DetachSelf => {
                    service.detach_from_window(self.window);
                }
                OnReconfigure::DetachWindow(id) => {
                    service.detach_from_window(WindowId(id));
                }
                OnReconfigure::AttachWindow(id) => {
                    service.attach_to_window(WindowId(id))?;
                }
            }
            *self.end_points.borrow_mut() = service.end_points()?;
            Ok(())
        }

        fn detach(&self) {
            self.journal.push(format!("detach {}", self.window.0));
        }
    }

    struct TestFactory {
        journal: Arc<Journal>,
        behaviors: Vec<(u64, OnReconfigure)>,
        created: Mutex<Vec<Arc<TestDelegate>>>,
    }

    impl DelegateFactory for TestFactory {
        fn create(
            &self,
            _service: &TransliteratorService,
            window: WindowId,
            end_points: EndPoints,
        ) -> Arc<dyn WindowDelegate> {
            let on_reconfigure = self
                .behaviors
                .iter()
                .find(|(id, _)| *id == window.0)
                .map(|(_, behavior)| *behavior)
                .unwrap_or(OnReconfigure::Nothing);
            self.journal.push(format!("create {}", window.0));
            let delegate = Arc::new(TestDelegate {
                window,
                end_points: RefCell::new(end_points),
                on_reconfigure,
                journal: self.journal.clone(),
            });
            self.created.lock().push(delegate.clone());
            delegate
        }
    }

    struct Fixture {
        store: Arc<MemoryPrefs>,
        host: Arc<TestHost>,
        journal: Arc<Journal>,
        service: TransliteratorService,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.service.cleanup();
        }
    }

    fn fixture(windows: &[u64], behaviors: Vec<(u64, OnReconfigure)>) -> Fixture {
        let store = Arc::new(MemoryPrefs::new());
        register_defaults(&store);
        let host = Arc::new(TestHost::with_windows(windows));
        let journal = Arc::new(Journal::default());
        let factory = TestFactory {
            journal: journal.clone(),
            behaviors,
            created: Mutex::new(Vec::new()),
        };
        let service = TransliteratorService::new(store.clone(), host.clone(), Box::new(factory));
        Fixture {
            store,
            host,
            journal,
            service,
        }
    }

    fn label_key() -> String {
        format!("{}commands.togglemode.label", PREF_ROOT)
    }

    #[test]
    fn test_init_attaches_open_windows_and_registers_observers() {
        let fx = fixture(&[1, 2], vec![]);
        fx.service.init().unwrap();

        assert_eq!(fx.service.coordinator().windows(), vec![WindowId(1), WindowId(2)]);
        assert_eq!(
            fx.host.calls(),
            vec![
                format!("+{}", PREF_ROOT),
                "+window-opened".to_string(),
                "+window-closed".to_string(),
            ]
        );

        // A second init changes nothing.
        fx.service.init().unwrap();
        assert_eq!(fx.host.calls().len(), 3);
        assert_eq!(fx.service.coordinator().len(), 2);
    }

    #[test]
    fn test_cleanup_unregisters_and_detaches() {
        let fx = fixture(&[1, 2], vec![]);
        fx.service.init().unwrap();
        fx.service.cleanup();

        assert!(!fx.service.is_initialized());
        assert!(fx.service.coordinator().is_empty());
        assert_eq!(
            &fx.host.calls()[3..],
            &[
                "-window-opened".to_string(),
                "-window-closed".to_string(),
                format!("-{}", PREF_ROOT),
            ]
        );
        let entries = fx.journal.entries();
        assert!(entries.contains(&"detach 1".to_string()));
        assert!(entries.contains(&"detach 2".to_string()));

        // Cleaning up twice is harmless.
        fx.service.cleanup();
        assert_eq!(fx.host.calls().len(), 6);
    }

    #[test]
    fn test_window_events() {
        let fx = fixture(&[], vec![]);
        fx.service.init().unwrap();
        assert!(!fx.service.registry().is_built());

        fx.service.observe(HostEvent::WindowOpened(WindowId(5))).unwrap();
        assert!(fx.service.registry().is_built());
        assert!(fx.service.coordinator().contains(WindowId(5)));

        // Opening the same window again keeps the first delegate.
        fx.service.observe(HostEvent::WindowOpened(WindowId(5))).unwrap();
        assert_eq!(fx.service.coordinator().len(), 1);

        fx.service.observe(HostEvent::WindowClosed(WindowId(5))).unwrap();
        assert!(fx.service.coordinator().is_empty());
        assert_eq!(fx.journal.entries(), vec!["create 5", "detach 5"]);
    }

    #[test]
    fn test_detach_twice_and_unknown_window() {
        let fx = fixture(&[1], vec![]);
        fx.service.init().unwrap();

        assert!(fx.service.detach_from_window(WindowId(1)));
        assert!(!fx.service.detach_from_window(WindowId(1)));
        assert!(!fx.service.detach_from_window(WindowId(42)));
        fx.service.observe(HostEvent::WindowClosed(WindowId(42))).unwrap();
    }

    #[test]
    fn test_update_before_build_is_noop() {
        let fx = fixture(&[], vec![]);
        fx.service.init().unwrap();
        assert_eq!(fx.service.update_end_points(), 0);
        assert!(!fx.service.registry().is_built());
    }

    #[test]
    fn test_pref_change_reconfigures_every_window() {
        let fx = fixture(&[1, 2, 3], vec![]);
        fx.service.init().unwrap();
        let before = fx.service.end_points().unwrap();

        fx.store
            .set_user(&label_key(), PrefValue::Unicode("Режим".to_string()));
        fx.service
            .observe(HostEvent::PrefChanged(label_key()))
            .unwrap();

        let reconfigured: Vec<String> = fx
            .journal
            .entries()
            .into_iter()
            .filter(|e| e.starts_with("reconfigure"))
            .collect();
        assert_eq!(
            reconfigured,
            vec!["reconfigure 1", "reconfigure 2", "reconfigure 3"]
        );

        let after = fx.service.end_points().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after[2].label(), "Режим");
        assert!(Arc::ptr_eq(after[0].converter(), after[2].converter()));
    }

    #[test]
    fn test_unrelated_pref_changes_are_ignored() {
        let fx = fixture(&[1], vec![]);
        fx.service.init().unwrap();

        fx.service
            .observe(HostEvent::PrefChanged(format!("{}prefs_converted", PREF_ROOT)))
            .unwrap();
        fx.service
            .observe(HostEvent::PrefChanged("browser.startup.page".to_string()))
            .unwrap();

        assert!(fx.service.registry().is_built());
        assert!(
            !fx.journal
                .entries()
                .iter()
                .any(|e| e.starts_with("reconfigure"))
        );
    }

    #[test]
    fn test_self_detach_during_broadcast() {
        let fx = fixture(&[1, 2, 3], vec![(2, OnReconfigure::DetachSelf)]);
        fx.service.init().unwrap();

        assert_eq!(fx.service.update_end_points(), 3);

        let entries = fx.journal.entries();
        let tail: Vec<&str> = entries[3..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["reconfigure 1", "reconfigure 2", "detach 2", "reconfigure 3"]
        );
        assert_eq!(fx.service.coordinator().windows(), vec![WindowId(1), WindowId(3)]);
    }

    #[test]
    fn test_detaching_later_window_during_broadcast() {
        // The snapshot still reaches window 3 even though window 1 removes it.
        let fx = fixture(&[1, 2, 3], vec![(1, OnReconfigure::DetachWindow(3))]);
        fx.service.init().unwrap();

        fx.service.update_end_points();

        let entries = fx.journal.entries();
        let reconfigured = entries.iter().filter(|e| e.starts_with("reconfigure")).count();
        assert_eq!(reconfigured, 3);
        assert_eq!(fx.service.coordinator().windows(), vec![WindowId(1), WindowId(2)]);
    }

    #[test]
    fn test_attach_during_broadcast_is_not_reconfigured() {
        let fx = fixture(&[1, 2], vec![(1, OnReconfigure::AttachWindow(9))]);
        fx.service.init().unwrap();

        assert_eq!(fx.service.update_end_points(), 2);

        let entries = fx.journal.entries();
        let tail: Vec<&str> = entries[2..].iter().map(String::as_str).collect();
        assert_eq!(tail, vec!["reconfigure 1", "create 9", "reconfigure 2"]);
        assert_eq!(
            fx.service.coordinator().windows(),
            vec![WindowId(1), WindowId(2), WindowId(9)]
        );
    }

    #[test]
    fn test_failing_reconfigure_does_not_stop_broadcast() {
        let fx = fixture(&[1, 2], vec![]);
        fx.service.init().unwrap();

        fx.store.set_user(
            &format!("{}layouts.default", PREF_ROOT),
            PrefValue::Unicode("not json".to_string()),
        );
        assert_eq!(fx.service.update_end_points(), 0);

        let reconfigured = fx
            .journal
            .entries()
            .iter()
            .filter(|e| e.starts_with("reconfigure"))
            .count();
        assert_eq!(reconfigured, 2);
        assert!(!fx.service.registry().is_built());
    }

    #[test]
    fn test_corrupt_layout_fails_attach() {
        let fx = fixture(&[], vec![]);
        fx.store.set_user(
            &format!("{}layouts.default", PREF_ROOT),
            PrefValue::Unicode("[".to_string()),
        );
        fx.service.init().unwrap();

        assert!(fx.service.observe(HostEvent::WindowOpened(WindowId(1))).is_err());
        assert!(fx.service.coordinator().is_empty());
    }

    #[test]
    fn test_failed_init_is_rolled_back_and_retried() {
        let fx = fixture(&[1], vec![]);
        let layout_key = format!("{}layouts.default", PREF_ROOT);
        fx.store
            .set_user(&layout_key, PrefValue::Unicode("[".to_string()));

        assert!(fx.service.init().is_err());
        assert!(!fx.service.is_initialized());
        assert!(fx.service.coordinator().is_empty());
        assert_eq!(
            fx.host.calls(),
            vec![format!("+{}", PREF_ROOT), format!("-{}", PREF_ROOT)]
        );

        fx.store.clear_user_value(&layout_key);
        fx.service.init().unwrap();

        assert!(fx.service.is_initialized());
        assert_eq!(fx.service.coordinator().windows(), vec![WindowId(1)]);
        assert_eq!(
            &fx.host.calls()[2..],
            &[
                format!("+{}", PREF_ROOT),
                "+window-opened".to_string(),
                "+window-closed".to_string(),
            ]
        );

        fx.service.cleanup();
        assert_eq!(
            &fx.host.calls()[5..],
            &[
                "-window-opened".to_string(),
                "-window-closed".to_string(),
                format!("-{}", PREF_ROOT),
            ]
        );
    }
}
