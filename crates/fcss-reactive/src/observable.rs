#![forbid(unsafe_code)]

//! Observable value cells with synchronous change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage.
//! Cloning an `Observable` creates a new handle to the **same** value. Every
//! call to [`set`](Observable::set) notifies all live subscribers in the order
//! they registered, on the caller's stack, before `set` returns.
//!
//! Subscribers are stored as slots with a shared liveness flag. Notification
//! iterates a snapshot of the slot list and skips slots whose flag has been
//! cleared, so a callback may subscribe or unsubscribe (itself or anyone
//! else) while a notification round is in progress. No `RefCell` borrow is
//! held while a callback runs.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per `set`/`update`.
//! 2. Each `set` invokes each subscriber that is live for the whole round
//!    exactly once, in registration order.
//! 3. A subscriber removed during a round is not invoked later in that round.
//! 4. A subscriber added during a round is first invoked by the next `set`.
//! 5. Releasing a [`Subscription`] twice, or releasing one whose cell is gone,
//!    is a no-op.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: a subscriber that calls `set` on the same cell
//!   triggers a nested round with the newer value. The outer round then
//!   continues with the value it started with; no notification is skipped or
//!   merged.
//! - **Cell dropped**: outstanding subscriptions become inert.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};


static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

fn next_cell_id() -> u64 {
    NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed)
}

/// One registered callback.
struct Slot<T> {
    id: u64,
    live: Rc<Cell<bool>>,
    callback: Rc<dyn Fn(&T)>,
}

/// Shared interior for [`Observable<T>`].
struct ObservableInner<T> {
    id: u64,
    value: T,
    version: u64,
    next_slot: u64,
    subscribers: Vec<Slot<T>>,
}

impl<T> ObservableInner<T> {
    fn prune(&mut self) {
        self.subscribers.retain(|slot| slot.live.get());
    }
}

/// Type-erased access to a cell's subscriber list, used by [`Subscription`].
trait SubscriberList {
    fn remove(&self, slot: u64);
}

impl<T> SubscriberList for RefCell<ObservableInner<T>> {
    fn remove(&self, slot: u64) {
        // The liveness flag is already cleared. If the cell is borrowed right
        // now (e.g. inside `with`), the slot is pruned on the next round.
        if let Ok(mut inner) = self.try_borrow_mut() {
            inner.subscribers.retain(|s| s.id != slot);
        }
    }
}

/// A shared, version-tracked value with change notification.
///
/// Unlike a memoizing signal, `set` always notifies, even when the new value
/// equals the old one. Use [`set_if_changed`](Self::set_if_changed) to opt
/// into equality suppression.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("id", &inner.id)
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Observable<T> {
    /// Create a new cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                id: next_cell_id(),
                value,
                version: 0,
                next_slot: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if the closure calls `set`/`update` on the same cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Process-unique identifier of this cell (shared by all clones).
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.borrow().id
    }

    /// Whether two handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|slot| slot.live.get())
            .count()
    }

    /// Register a callback invoked with the new value after every mutation.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// released or dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let live = Rc::new(Cell::new(true));
        let (cell, slot) = {
            let mut inner = self.inner.borrow_mut();
            inner.prune();
            let slot = inner.next_slot;
            inner.next_slot += 1;
            inner.subscribers.push(Slot {
                id: slot,
                live: Rc::clone(&live),
                callback: Rc::new(callback),
            });
            (inner.id, slot)
        };
        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        let list: Weak<dyn SubscriberList> = weak;
        Subscription {
            list,
            live,
            cell,
            slot,
        }
    }

    /// Remove a subscription registered on this cell.
    ///
    /// Silent no-op if the subscription was already released or belongs to a
    /// different cell.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        if subscription.cell != self.id() {
            return;
        }
        subscription.unsubscribe();
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Current value (cloned).
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, value: T) {
        self.inner.borrow_mut().value = value;
        self.bump_and_notify();
    }

    /// Mutate the value in place, then notify as [`set`](Self::set) does.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.borrow_mut().value);
        self.bump_and_notify();
    }

    fn bump_and_notify(&self) {
        let (value, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            inner.prune();
            #[cfg(feature = "tracing")]
            tracing::trace!(
                cell = inner.id,
                version = inner.version,
                subscribers = inner.subscribers.len(),
                "observable.set"
            );
            let snapshot: Vec<(Rc<Cell<bool>>, Rc<dyn Fn(&T)>)> = inner
                .subscribers
                .iter()
                .map(|slot| (Rc::clone(&slot.live), Rc::clone(&slot.callback)))
                .collect();
            (inner.value.clone(), snapshot)
        };
        for (live, callback) in snapshot {
            if live.get() {
                callback(&value);
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Replace the value only if it differs from the current one.
    ///
    /// Returns `true` if the value changed (and subscribers were notified).
    /// This is an opt-in deviation from the always-notify behaviour of
    /// [`set`](Self::set).
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.inner.borrow().value == value {
            return false;
        }
        self.set(value);
        true
    }
}

/// Handle for one registered callback.
///
/// Dropping the handle unsubscribes. [`unsubscribe`](Self::unsubscribe) does
/// the same explicitly and may be called any number of times.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    list: Weak<dyn SubscriberList>,
    live: Rc<Cell<bool>>,
    cell: u64,
    slot: u64,
}

impl Subscription {
    /// Stop receiving notifications. Idempotent.
    pub fn unsubscribe(&self) {
        if !self.live.replace(false) {
            return;
        }
        if let Some(list) = self.list.upgrade() {
            list.remove(self.slot);
        }
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.live.get() && self.list.strong_count() > 0
    }

    /// Identifier of the cell this subscription belongs to.
    #[must_use]
    pub fn cell_id(&self) -> u64 {
        self.cell
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cell", &self.cell)
            .field("slot", &self.slot)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set() {
        let cell = Observable::new(5);
        assert_eq!(cell.get(), 5);
        cell.set(8);
        assert_eq!(cell.get(), 8);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn set_notifies_with_new_value() {
        let cell = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = cell.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        cell.set(1);
        cell.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn set_same_value_still_notifies() {
        let cell = Observable::new(42);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        cell.set(42);
        cell.set(42);
        assert_eq!(count.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn set_if_changed_suppresses_equal_values() {
        let cell = Observable::new(42);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        assert!(!cell.set_if_changed(42));
        assert_eq!(count.get(), 0);
        assert_eq!(cell.version(), 0);

        assert!(cell.set_if_changed(7));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_mutates_in_place_and_notifies() {
        let cell = Observable::new(vec![1, 2]);
        let lens = Rc::new(RefCell::new(Vec::new()));
        let lens_clone = Rc::clone(&lens);
        let _sub = cell.subscribe(move |v: &Vec<i32>| lens_clone.borrow_mut().push(v.len()));

        cell.update(|v| v.push(3));
        assert_eq!(cell.get(), vec![1, 2, 3]);
        assert_eq!(*lens.borrow(), vec![3]);
    }

    #[test]
    fn subscribers_fire_in_registration_order() {
        let cell = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        let _a = cell.subscribe(move |_| log_a.borrow_mut().push("a"));
        let log_b = Rc::clone(&log);
        let _b = cell.subscribe(move |_| log_b.borrow_mut().push("b"));
        let log_c = Rc::clone(&log);
        let _c = cell.subscribe(move |_| log_c.borrow_mut().push("c"));

        cell.set(1);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn drop_subscription_unsubscribes() {
        let cell = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));
        assert_eq!(cell.subscriber_count(), 1);

        drop(sub);
        assert_eq!(cell.subscriber_count(), 0);
        cell.set(1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let cell = Observable::new(0);
        let sub = cell.subscribe(|_| {});
        cell.unsubscribe(&sub);
        cell.unsubscribe(&sub);
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_foreign_handle_is_noop() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let sub_b = b.subscribe(|_| {});

        a.unsubscribe(&sub_b);
        assert!(sub_b.is_active());
        assert_eq!(b.subscriber_count(), 1);
    }

    #[test]
    fn subscription_inert_after_cell_dropped() {
        let sub;
        {
            let cell = Observable::new(1);
            sub = cell.subscribe(|_| {});
            assert!(sub.is_active());
        }
        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn callback_can_unsubscribe_itself() {
        let cell = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let count_clone = Rc::clone(&count);
        let holder_clone = Rc::clone(&holder);
        let sub = cell.subscribe(move |_| {
            count_clone.set(count_clone.get() + 1);
            if let Some(sub) = holder_clone.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        *holder.borrow_mut() = Some(sub);

        cell.set(1);
        cell.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn callback_can_unsubscribe_later_subscriber() {
        let cell = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim_clone = Rc::clone(&victim);
        let log_a = Rc::clone(&log);
        let _a = cell.subscribe(move |_| {
            log_a.borrow_mut().push("a");
            if let Some(sub) = victim_clone.borrow_mut().take() {
                drop(sub);
            }
        });
        let log_b = Rc::clone(&log);
        *victim.borrow_mut() = Some(cell.subscribe(move |_| log_b.borrow_mut().push("b")));
        let log_c = Rc::clone(&log);
        let _c = cell.subscribe(move |_| log_c.borrow_mut().push("c"));

        cell.set(1);
        assert_eq!(*log.borrow(), vec!["a", "c"]);
        assert_eq!(cell.subscriber_count(), 2);
    }

    #[test]
    fn subscriber_added_during_round_fires_next_round() {
        let cell = Observable::new(0);
        let late_count = Rc::new(Cell::new(0u32));
        let added: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let cell_clone = cell.clone();
        let late_clone = Rc::clone(&late_count);
        let added_clone = Rc::clone(&added);
        let _adder = cell.subscribe(move |_| {
            if added_clone.borrow().is_empty() {
                let late = Rc::clone(&late_clone);
                let sub = cell_clone.subscribe(move |_| late.set(late.get() + 1));
                added_clone.borrow_mut().push(sub);
            }
        });

        cell.set(1);
        assert_eq!(late_count.get(), 0);
        cell.set(2);
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn reentrant_set_runs_nested_round() {
        let cell = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let cell_clone = cell.clone();
        let _bump = cell.subscribe(move |v| {
            if *v == 1 {
                cell_clone.set(2);
            }
        });
        let log_clone = Rc::clone(&log);
        let _log = cell.subscribe(move |v| log_clone.borrow_mut().push(*v));

        cell.set(1);
        // Nested round delivers 2 first, then the outer round finishes with 1.
        assert_eq!(*log.borrow(), vec![2, 1]);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn clone_shares_state() {
        let a = Observable::new(1);
        let b = a.clone();
        b.set(9);
        assert_eq!(a.get(), 9);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn distinct_cells_have_distinct_ids() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        assert_ne!(a.id(), b.id());
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn with_borrows_without_clone() {
        let cell = Observable::new(String::from("hello"));
        assert_eq!(cell.with(|s| s.len()), 5);
    }

    #[test]
    fn debug_format() {
        let cell = Observable::new(42);
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains("42"));
    }
}
