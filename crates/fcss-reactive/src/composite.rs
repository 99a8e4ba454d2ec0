#![forbid(unsafe_code)]

//! Eager composite values that combine several inputs into one string.
//!
//! # Design
//!
//! A [`CompositeValue`] owns a group of [`Inputs`], a pure formatter over
//! their current values, the last formatted string, and at most one
//! downstream listener. At construction it subscribes to every reactive input.
//! When any input fires, the composite re-reads **all** inputs (never a
//! snapshot captured earlier), runs the formatter, stores the result and
//! calls its listener, all before the triggering `set` returns.
//!
//! The formatted string is published through an internal
//! [`Observable<String>`], which lets one composite feed another
//! (see [`CompositeValue::source`]). Chains propagate depth-first.
//!
//! # Invariants
//!
//! 1. `current_string()` equals the formatter applied to the current values of
//!    all inputs whenever no notification round is in progress.
//! 2. Each `set` on an input cell produces exactly one recomputation and,
//!    under [`NotifyPolicy::Always`], exactly one listener call, however many
//!    inputs are bound to that cell. Nothing is debounced or coalesced.
//! 3. The last string handed to the listener equals `current_string()`. If a
//!    downstream composite writes back into an input while this one is
//!    publishing, the nested round delivers the newer string and the outer
//!    round delivers nothing.
//! 4. A composite built only from constants never calls its listener.
//! 5. `detach()` releases exactly the subscriptions made at construction.
//!    Afterwards no input can reach the composite.
//!
//! # Failure Modes
//!
//! - **Listener registered after detach**: programming error.
//!   [`on_change`](CompositeValue::on_change) panics;
//!   [`try_on_change`](CompositeValue::try_on_change) returns
//!   [`CompositeError::Detached`].
//! - **Composite dropped without detach**: dropping the composite drops its
//!   subscriptions, which unsubscribes them. Input handlers hold only a `Weak`
//!   reference, so a cell never keeps a composite alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::observable::{Observable, Subscription};
use crate::source::{Inputs, ValueSource};

/// When a recomputation is forwarded to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Notify after every recomputation, even if the string is unchanged.
    #[default]
    Always,
    /// Skip notification (and republishing) when the recomputed string equals
    /// the cached one. Opt-in deviation from the always-notify contract.
    SkipUnchanged,
}

/// Errors from misuse of a [`CompositeValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// The composite has been detached and can no longer notify.
    Detached {
        /// Diagnostic label of the composite.
        label: &'static str,
    },
}

impl std::fmt::Display for CompositeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detached { label } => write!(f, "composite '{}' is detached", label),
        }
    }
}

impl std::error::Error for CompositeError {}

type Listener = Rc<dyn Fn(&str)>;

/// Shared interior for [`CompositeValue`].
struct CompositeInner {
    /// Diagnostic label.
    label: &'static str,
    /// Reads every input and formats.
    render: Rc<dyn Fn() -> String>,
    /// Last formatted string; also the upstream end of composite chains.
    published: Observable<String>,
    listener: Option<Listener>,
    subscriptions: Vec<Subscription>,
    reactive_inputs: usize,
    recomputes: u64,
    policy: NotifyPolicy,
    detached: bool,
}

/// Builder for a [`CompositeValue`] with non-default settings.
pub struct CompositeBuilder<I: Inputs> {
    inputs: I,
    label: &'static str,
    policy: NotifyPolicy,
}

impl<I: Inputs> CompositeBuilder<I> {
    /// Set the label used in logs and errors.
    #[must_use]
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Set the notification policy.
    #[must_use]
    pub fn policy(mut self, policy: NotifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Finish with the formatter and subscribe to the reactive inputs.
    pub fn format(self, formatter: impl Fn(I::Values) -> String + 'static) -> CompositeValue {
        let Self {
            inputs,
            label,
            policy,
        } = self;

        let initial = formatter(inputs.current_values());
        let reactive_inputs = inputs.reactive_count();

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<CompositeInner>>| {
            let weak = weak.clone();
            let on_change: Rc<dyn Fn()> = Rc::new(move || refresh(&weak));
            let subscriptions = first_per_cell(inputs.attach(&on_change));
            tracing::debug!(
                composite = label,
                reactive = reactive_inputs,
                attached = subscriptions.len(),
                "composite.attach"
            );
            RefCell::new(CompositeInner {
                label,
                render: Rc::new(move || formatter(inputs.current_values())),
                published: Observable::new(initial),
                listener: None,
                subscriptions,
                reactive_inputs,
                recomputes: 0,
                policy,
                detached: false,
            })
        });

        CompositeValue { inner }
    }
}

/// A string derived from several inputs and kept fresh eagerly.
///
/// Not `Clone`: each composite belongs to exactly one owner, which is also
/// its only listener.
///
/// # Example
///
/// ```
/// use fcss_reactive::{CompositeValue, Observable, ValueSource};
///
/// let h = Observable::new(5);
/// let shadow = CompositeValue::new(
///     (
///         ValueSource::reactive(&h),
///         ValueSource::constant(10),
///         ValueSource::constant(None::<&str>),
///     ),
///     |(h, v, color)| match color {
///         Some(color) => format!("{h}px {v}px {color}"),
///         None => format!("{h}px {v}px"),
///     },
/// );
/// assert_eq!(shadow.current_string(), "5px 10px");
///
/// h.set(8);
/// assert_eq!(shadow.current_string(), "8px 10px");
/// ```
pub struct CompositeValue {
    inner: Rc<RefCell<CompositeInner>>,
}

impl CompositeValue {
    /// Compose `inputs` through `formatter` with default settings.
    pub fn new<I: Inputs>(inputs: I, formatter: impl Fn(I::Values) -> String + 'static) -> Self {
        Self::builder(inputs).format(formatter)
    }

    /// Start building a composite over `inputs`.
    #[must_use]
    pub fn builder<I: Inputs>(inputs: I) -> CompositeBuilder<I> {
        CompositeBuilder {
            inputs,
            label: "composite",
            policy: NotifyPolicy::Always,
        }
    }

    /// The last formatted string. Never recomputes.
    ///
    /// After [`detach`](Self::detach) this is frozen at the last value.
    #[must_use]
    pub fn current_string(&self) -> String {
        self.inner.borrow().published.get()
    }

    /// Register the single downstream listener, replacing any previous one.
    ///
    /// # Panics
    ///
    /// Panics if the composite has been detached.
    #[track_caller]
    pub fn on_change(&self, listener: impl Fn(&str) + 'static) {
        if let Err(err) = self.try_on_change(listener) {
            panic!("{err}");
        }
    }

    /// Register the single downstream listener, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::Detached`] if the composite has been
    /// detached.
    pub fn try_on_change(&self, listener: impl Fn(&str) + 'static) -> Result<(), CompositeError> {
        let mut inner = self.inner.borrow_mut();
        if inner.detached {
            return Err(CompositeError::Detached { label: inner.label });
        }
        #[cfg(feature = "tracing")]
        if inner.listener.is_some() {
            tracing::trace!(composite = inner.label, "composite.listener_replaced");
        }
        inner.listener = Some(Rc::new(listener));
        Ok(())
    }

    /// Whether a listener is registered.
    #[must_use]
    pub fn has_listener(&self) -> bool {
        self.inner.borrow().listener.is_some()
    }

    /// Release every input subscription and the listener. Idempotent.
    pub fn detach(&self) {
        let released = {
            let mut inner = self.inner.borrow_mut();
            if inner.detached {
                return;
            }
            inner.detached = true;
            inner.listener = None;
            tracing::debug!(
                composite = inner.label,
                released = inner.subscriptions.len(),
                "composite.detach"
            );
            std::mem::take(&mut inner.subscriptions)
        };
        // Dropped outside the borrow; each drop unsubscribes from its cell.
        drop(released);
    }

    /// Whether [`detach`](Self::detach) has run.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inner.borrow().detached
    }

    /// The published string as a reactive input for another composite.
    ///
    /// The returned source fires whenever this composite republishes. Once
    /// this composite is detached it never fires again.
    #[must_use]
    pub fn source(&self) -> ValueSource<String> {
        ValueSource::Reactive(self.inner.borrow().published.clone())
    }

    /// Number of reactive inputs.
    #[must_use]
    pub fn reactive_inputs(&self) -> usize {
        self.inner.borrow().reactive_inputs
    }

    /// Number of subscriptions currently held.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Number of recomputations since construction.
    #[must_use]
    pub fn recomputes(&self) -> u64 {
        self.inner.borrow().recomputes
    }

    /// Diagnostic label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.inner.borrow().label
    }

    /// Notification policy.
    #[must_use]
    pub fn policy(&self) -> NotifyPolicy {
        self.inner.borrow().policy
    }
}

impl std::fmt::Debug for CompositeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CompositeValue")
            .field("label", &inner.label)
            .field("current", &inner.published.get())
            .field("reactive_inputs", &inner.reactive_inputs)
            .field("attached", &inner.subscriptions.len())
            .field("recomputes", &inner.recomputes)
            .field("detached", &inner.detached)
            .finish()
    }
}

/// Input handler: re-read everything, store, publish, notify.
fn refresh(weak: &Weak<RefCell<CompositeInner>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let render = {
        let state = inner.borrow();
        if state.detached {
            return;
        }
        Rc::clone(&state.render)
    };
    // No borrow is held while the formatter reads the inputs.
    let text = render();

    let (published, listener) = {
        let mut state = inner.borrow_mut();
        if state.detached {
            return;
        }
        state.recomputes += 1;
        if state.policy == NotifyPolicy::SkipUnchanged && state.published.with(|cur| *cur == text)
        {
            #[cfg(feature = "tracing")]
            tracing::trace!(composite = state.label, "composite.unchanged");
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            composite = state.label,
            recomputes = state.recomputes,
            notify = state.listener.is_some(),
            "composite.recompute"
        );
        (state.published.clone(), state.listener.clone())
    };

    let before = published.version();
    published.set(text.clone());
    if published.version() != before + 1 {
        // A nested round republished while downstream composites ran and
        // has already delivered the newer string.
        #[cfg(feature = "tracing")]
        tracing::trace!(version = published.version(), "composite.superseded");
        return;
    }
    if let Some(listener) = listener {
        listener(&text);
    }
}

/// Keep the first subscription per cell and release the rest.
///
/// A cell bound to several inputs then triggers one recomputation per `set`.
fn first_per_cell(subscriptions: Vec<Subscription>) -> Vec<Subscription> {
    let mut seen = Vec::with_capacity(subscriptions.len());
    subscriptions
        .into_iter()
        .filter(|subscription| {
            let cell = subscription.cell_id();
            if seen.contains(&cell) {
                return false;
            }
            seen.push(cell);
            true
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
