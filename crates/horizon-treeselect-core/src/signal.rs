//! Change notification for selection models and item sources.
//!
//! A [`Signal`] holds a table of slots keyed by [`ConnectionId`]. Emission
//! calls every slot synchronously on the emitting thread. Slots must not
//! depend on running before or after one another: a disconnected slot's
//! place in the table is reused by the next connection.
//!
//! The table is copied out before any slot runs, so a slot may connect or
//! disconnect on the emitting signal without deadlocking. Such edits apply
//! from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_treeselect_core::Signal;
//!
//! // (first row, count)
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let id = rows_inserted.connect(|(first, count)| {
//!     println!("{count} rows inserted at {first}");
//! });
//!
//! rows_inserted.emit((4, 2));
//! assert!(rows_inserted.disconnect(id));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, used to disconnect it.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A notification channel carrying `Args` to every connected slot.
///
/// Use `()` for payload-free notifications and a tuple or struct otherwise.
/// `Signal` is `Send + Sync`.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Creates a signal with no slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connects `slot` and returns its handle.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.slots.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "slot connected");
        id
    }

    /// Disconnects the slot behind `id`.
    ///
    /// Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Disconnects every slot.
    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns `true` if at least one slot is connected.
    ///
    /// Lets emitters skip building a payload nobody receives.
    pub fn has_connections(&self) -> bool {
        !self.slots.lock().is_empty()
    }

    /// Suppresses (or re-enables) emission.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Returns `true` while emission is suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Calls every connected slot with `args`.
    ///
    /// Does nothing while blocked.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "emit suppressed");
            return;
        }

        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emit");
        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        signal.connect(move |args: &T| seen_clone.lock().push(args.clone()));
        seen
    }

    #[test]
    fn test_every_slot_runs_once_per_emit() {
        let signal = Signal::<usize>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ids = Vec::new();
        for tag in ["first", "second", "third"] {
            let seen_clone = seen.clone();
            ids.push(signal.connect(move |row| seen_clone.lock().push(format!("{tag}:{row}"))));
        }
        assert!(signal.disconnect(ids[0]));
        let seen_clone = seen.clone();
        signal.connect(move |row| seen_clone.lock().push(format!("fourth:{row}")));

        signal.emit(7);
        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(seen, vec!["fourth:7", "second:7", "third:7"]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let signal = Signal::<(usize, usize)>::new();
        let seen = recorder(&signal);
        let id = signal.connect(|_| {});
        assert_eq!(signal.connection_count(), 2);

        signal.emit((0, 1));
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.disconnect_all();
        signal.emit((3, 4));

        assert_eq!(*seen.lock(), vec![(0, 1)]);
        assert!(!signal.has_connections());
    }

    #[test]
    fn test_blocked_signal_drops_payload() {
        let signal = Signal::<&'static str>::new();
        let seen = recorder(&signal);

        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit("dropped");
        signal.set_blocked(false);
        signal.emit("delivered");

        assert_eq!(*seen.lock(), vec!["delivered"]);
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let signal_clone = signal.clone();
        let calls_clone = calls.clone();
        let own_id_clone = own_id.clone();
        let id = signal.connect(move |()| {
            *calls_clone.lock() += 1;
            if let Some(id) = own_id_clone.lock().take() {
                signal_clone.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_slot_connected_during_emit_waits_for_next() {
        let signal = Arc::new(Signal::<u8>::new());
        let late = Arc::new(Mutex::new(Vec::new()));

        let signal_clone = signal.clone();
        let late_clone = late.clone();
        signal.connect(move |_| {
            let late = late_clone.clone();
            signal_clone.connect(move |value| late.lock().push(*value));
        });

        signal.emit(1);
        assert!(late.lock().is_empty());
        signal.emit(2);
        assert_eq!(*late.lock(), vec![2]);
    }

    #[test]
    fn test_emit_from_several_threads() {
        let signal = Arc::new(Signal::<u32>::new());
        let seen = recorder(&signal);

        let handles: Vec<_> = (0..8)
            .map(|value| {
                let signal = signal.clone();
                std::thread::spawn(move || signal.emit(value))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut values = seen.lock().clone();
        values.sort_unstable();
        assert_eq!(values, (0..8).collect::<Vec<_>>());
    }
}
