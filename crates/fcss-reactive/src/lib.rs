#![forbid(unsafe_code)]

//! Reactive value composition for fcss.
//!
//! This crate provides the change-propagation engine behind reactive CSS
//! declarations:
//!
//! - [`Observable`]: a value cell shared between handles. Each write bumps
//!   its version and calls every subscriber in turn.
//! - [`Subscription`]: the handle returned by `subscribe`; dropping it
//!   removes the callback.
//! - [`ValueSource`]: Either a constant or a live [`Observable`], used for
//!   every input of a composite value.
//! - [`CompositeValue`]: A formatted string derived from several
//!   [`ValueSource`] inputs, kept fresh eagerly and forwarded to a single
//!   downstream listener.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Notification iterates a snapshot of the subscriber list and never holds a
//! borrow while user callbacks run, so callbacks may freely read, write,
//! subscribe and unsubscribe.
//!
//! `CompositeValue` subscribes to each reactive input through a handler that
//! only holds a `Weak` reference back to the composite. When any input fires,
//! every input is re-read and the formatter runs immediately.
//!
//! # Invariants
//!
//! 1. Every `set` notifies every live subscriber exactly once, in
//!    registration order. No equality elision unless requested through
//!    [`Observable::set_if_changed`].
//! 2. Dropping or releasing a [`Subscription`] removes the callback before the
//!    next notification, including one already in progress.
//! 3. `CompositeValue::current_string()` is the formatter applied to the
//!    current values of all inputs.
//! 4. R independent `set` calls on input cells produce exactly R
//!    downstream notifications, also when one cell feeds several inputs.
//! 5. After `detach()`, a composite never recomputes or notifies again.

pub mod composite;
pub mod observable;
pub mod source;

pub use composite::{CompositeBuilder, CompositeError, CompositeValue, NotifyPolicy};
pub use observable::{Observable, Subscription};
pub use source::{Inputs, ValueSource};
