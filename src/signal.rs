//! Compositor signals with scoped subscriptions
//!
//! A [`Signal`] is owned by the emitting component. Subscribing returns a
//! [`Subscription`] handle; dropping or releasing the handle removes the
//! listener. Everything here runs on the compositor's event thread, so the
//! registry uses `Rc`/`RefCell` rather than locks.
//!
//! # Usage
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use keypanel::signal::Signal;
//!
//! let signal = Signal::<u32>::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let sink = seen.clone();
//! let subscription = signal.subscribe(move |v| sink.set(*v));
//! signal.emit(&7);
//! assert_eq!(seen.get(), 7);
//!
//! drop(subscription);
//! signal.emit(&9);
//! assert_eq!(seen.get(), 7);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::geometry::{CursorRect, SurfaceId};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Observer registry for one kind of notification.
///
/// Cloning a `Signal` yields another handle to the same registry.
pub struct Signal<T> {
    inner: Rc<RefCell<Listeners<T>>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Adds a listener; it stays registered until the returned handle drops.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(listener)));
            id
        };

        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Notifies listeners in subscription order.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe while the signal is being emitted.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.inner.borrow().entries.len())
            .finish()
    }
}

/// Handle keeping a listener registered.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribes now. Equivalent to dropping the handle.
    pub fn release(mut self) {
        self.disconnect();
    }

    fn disconnect(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Signals the compositor emits towards the input panel.
#[derive(Debug, Clone, Default)]
pub struct CompositorSignals {
    /// Compositor teardown
    pub destroy: Signal<()>,
    /// Text input activated on a surface
    pub show_input_panel: Signal<SurfaceId>,
    /// Text input deactivated
    pub hide_input_panel: Signal<()>,
    /// Cursor rectangle of the active text input changed
    pub update_input_panel: Signal<CursorRect>,
}

impl CompositorSignals {
    pub fn new() -> Self {
        Self::default()
    }
}
