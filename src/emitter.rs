//! Named event channel shared between a module and its native binding
//!
//! The native side emits events under app-scoped names; the bridge adds
//! handlers for the names it is interested in. Handlers run synchronously
//! on the emitting thread, in registration order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

type Handler<E> = Arc<Mutex<Box<dyn FnMut(&E) + Send>>>;

/// Registry of named event handlers
pub struct EventEmitter<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

struct Registry<E> {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler<E>)>>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: HashMap::new(),
            })),
        }
    }
}

impl<E: 'static> EventEmitter<E> {
    /// Create an empty emitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events emitted under `name`
    pub fn add_listener<F>(&self, name: impl Into<String>, handler: F) -> Subscription<E>
    where
        F: FnMut(&E) + Send + 'static,
    {
        let name = name.into();
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .handlers
            .entry(name.clone())
            .or_default()
            .push((id, Arc::new(Mutex::new(Box::new(handler)))));
        tracing::trace!(event = %name, id, "emitter listener added");

        Subscription {
            emitter: self.clone(),
            name,
            id,
            removed: AtomicBool::new(false),
        }
    }

    /// Deliver `event` to every handler registered under `name`
    ///
    /// A handler that is still running (it emitted under its own name) is
    /// skipped for the nested event. Returns the number of handlers invoked.
    pub fn emit(&self, name: &str, event: &E) -> usize {
        // Snapshot the handler list so handlers may add or remove listeners.
        let handlers: Vec<Handler<E>> = match self.lock().handlers.get(name) {
            Some(entries) => entries.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => Vec::new(),
        };

        if handlers.is_empty() {
            tracing::trace!(event = %name, "no listeners for event");
        }

        let mut invoked = 0;
        for handler in &handlers {
            let mut handler = match handler.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    tracing::warn!(event = %name, "handler is already running, skipping re-entrant emit");
                    continue;
                }
            };
            (handler)(event);
            invoked += 1;
        }
        invoked
    }

    /// Number of live handlers for `name`
    pub fn listener_count(&self, name: &str) -> usize {
        self.lock().handlers.get(name).map_or(0, Vec::len)
    }

    fn remove(&self, name: &str, id: u64) -> bool {
        let mut registry = self.lock();
        let Some(entries) = registry.handlers.get_mut(name) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            registry.handlers.remove(name);
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<E>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Handle for one registered handler
pub struct Subscription<E: 'static> {
    emitter: EventEmitter<E>,
    name: String,
    id: u64,
    removed: AtomicBool,
}

impl<E: 'static> Subscription<E> {
    /// Unregister the handler. Safe to call more than once.
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn remove(&self) -> bool {
        if self.removed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.emitter.remove(&self.name, self.id)
    }

    /// Event name this handler listens to
    pub fn event_name(&self) -> &str {
        &self.name
    }

    /// Whether [`Subscription::remove`] has been called
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }
}
