//! Observable state cells read by the guard chain.
//!
//! A [`Signal`] is a shared, clonable cell: every clone points at the same
//! value. Writers are the owning lifecycle code (SDK initialization for the
//! [`VersionSignal`], component mount/unmount for a [`MountSignal`]); the
//! guard chain and capability predicate only ever read.
//!
//! ```rust
//! use mini_apps_guard::signals::MountSignal;
//!
//! let mounted = MountSignal::new();
//! let seen_by_guard = mounted.clone();
//! assert!(!seen_by_guard.get());
//!
//! mounted.mount();
//! assert!(seen_by_guard.get());
//! ```

use crate::version::Version;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    value: RwLock<T>,
    listeners: RwLock<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
}

// A panicking listener must not wedge the cell for every later reader.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared mutable cell with change listeners.
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                value: RwLock::new(initial),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        read(&self.inner.value).clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&read(&self.inner.value))
    }

    /// Replace the value. Listeners run only if the new value compares
    /// unequal to the old one; the stored value is replaced either way.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = write(&self.inner.value);
            let changed = *current != value;
            *current = value.clone();
            if !changed {
                return false;
            }
        }

        // Snapshot so listeners may subscribe, unsubscribe or read the signal.
        let listeners: Vec<Listener<T>> = read(&self.inner.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&value);
        }
        true
    }

    /// Register a listener called with the new value after each change.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped (or [`Subscription::detach`] is called).
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        write(&self.inner.listeners).push((id, Arc::new(listener)));

        let weak: Weak<SignalInner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    write(&inner.listeners).retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        read(&self.inner.listeners).len()
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Signal<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*read(&self.inner.value))
            .field("listeners", &read(&self.inner.listeners).len())
            .finish()
    }
}

/// Handle for a signal listener; dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the listener registered for the lifetime of the signal.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// The negotiated platform version, unset until the SDK is initialized.
#[derive(Clone, Debug)]
pub struct VersionSignal(Signal<Option<Version>>);

impl VersionSignal {
    pub fn new() -> Self {
        Self(Signal::new(None))
    }

    pub fn get(&self) -> Option<Version> {
        self.0.get()
    }

    pub fn set(&self, version: Version) {
        self.0.set(Some(version));
    }

    /// Return to the unset state.
    pub fn reset(&self) {
        self.0.set(None);
    }

    pub fn is_set(&self) -> bool {
        self.0.with(Option::is_some)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<Version>) + Send + Sync + 'static,
    {
        self.0.subscribe(listener)
    }

    pub fn signal(&self) -> &Signal<Option<Version>> {
        &self.0
    }
}

impl Default for VersionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a component instance is mounted. Starts unmounted.
#[derive(Clone, Debug)]
pub struct MountSignal(Signal<bool>);

impl MountSignal {
    pub fn new() -> Self {
        Self(Signal::new(false))
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, mounted: bool) {
        self.0.set(mounted);
    }

    pub fn mount(&self) {
        self.set(true);
    }

    pub fn unmount(&self) {
        self.set(false);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.0.subscribe(listener)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for MountSignal {
    fn default() -> Self {
        Self::new()
    }
}
