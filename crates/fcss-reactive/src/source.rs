#![forbid(unsafe_code)]

//! Constant-or-reactive inputs for composite values.
//!
//! A [`ValueSource<T>`] is the uniform input type of a
//! [`CompositeValue`](crate::CompositeValue): each input is either fixed at
//! construction or backed by a live [`Observable`].
//!
//! The [`Inputs`] trait groups several sources into one composition: a single
//! source, a tuple of up to eight sources of independent types, or a `Vec`
//! of any of these (list-valued declarations such as multiple shadows).
//! Types with named inputs can implement [`Inputs`] themselves. Whichever
//! shape is used, each element independently may be constant or reactive, so
//! one constructor covers every combination.

use std::rc::Rc;

use crate::observable::{Observable, Subscription};

/// Either a fixed value or a live [`Observable`].
#[derive(Clone)]
pub enum ValueSource<T> {
    /// Fixed at construction. Never fires.
    Constant(T),
    /// Backed by a cell. Fires exactly when the cell is set.
    Reactive(Observable<T>),
}

impl<T: Clone + 'static> ValueSource<T> {
    /// A source that never changes.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    /// A source that follows `cell`. The cell is shared, not copied.
    #[must_use]
    pub fn reactive(cell: &Observable<T>) -> Self {
        Self::Reactive(cell.clone())
    }

    /// Whether this source is backed by a cell.
    #[must_use]
    pub fn is_reactive(&self) -> bool {
        matches!(self, Self::Reactive(_))
    }

    /// The value right now: the constant, or the cell's current value.
    #[must_use]
    pub fn current_value(&self) -> T {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Reactive(cell) => cell.get(),
        }
    }

    /// Subscribe `on_change` to the backing cell.
    ///
    /// Returns `None` for constant sources; there is nothing to observe.
    pub fn attach_if_reactive(&self, on_change: impl Fn() + 'static) -> Option<Subscription> {
        match self {
            Self::Constant(_) => None,
            Self::Reactive(cell) => Some(cell.subscribe(move |_| on_change())),
        }
    }
}

impl<T> From<Observable<T>> for ValueSource<T> {
    fn from(cell: Observable<T>) -> Self {
        Self::Reactive(cell)
    }
}

impl<T> From<&Observable<T>> for ValueSource<T> {
    fn from(cell: &Observable<T>) -> Self {
        Self::Reactive(cell.clone())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Reactive(cell) => f.debug_tuple("Reactive").field(cell).finish(),
        }
    }
}

/// A fixed group of [`ValueSource`]s that a composite value reads together.
///
/// `Values` is what the formatter receives: the current value of every
/// source, read at the same instant.
pub trait Inputs: 'static {
    /// Snapshot of all current values.
    type Values;

    /// Read every source now.
    fn current_values(&self) -> Self::Values;

    /// Subscribe `on_change` to every reactive source.
    ///
    /// Returns one subscription per reactive source, none for constants.
    fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription>;

    /// How many sources are reactive.
    fn reactive_count(&self) -> usize;
}

impl<T: Clone + 'static> Inputs for ValueSource<T> {
    type Values = T;

    fn current_values(&self) -> T {
        self.current_value()
    }

    fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription> {
        let handler = Rc::clone(on_change);
        self.attach_if_reactive(move || handler())
            .into_iter()
            .collect()
    }

    fn reactive_count(&self) -> usize {
        usize::from(self.is_reactive())
    }
}

impl<I: Inputs> Inputs for Vec<I> {
    type Values = Vec<I::Values>;

    fn current_values(&self) -> Self::Values {
        self.iter().map(Inputs::current_values).collect()
    }

    fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription> {
        self.iter().flat_map(|item| item.attach(on_change)).collect()
    }

    fn reactive_count(&self) -> usize {
        self.iter().map(Inputs::reactive_count).sum()
    }
}

macro_rules! impl_inputs_for_tuple {
    ($($ty:ident : $idx:tt),+) => {
        impl<$($ty: Clone + 'static),+> Inputs for ($(ValueSource<$ty>,)+) {
            type Values = ($($ty,)+);

            fn current_values(&self) -> Self::Values {
                ($(self.$idx.current_value(),)+)
            }

            fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription> {
                let mut subscriptions = Vec::new();
                $(
                    {
                        let handler = Rc::clone(on_change);
                        if let Some(sub) = self.$idx.attach_if_reactive(move || handler()) {
                            subscriptions.push(sub);
                        }
                    }
                )+
                subscriptions
            }

            fn reactive_count(&self) -> usize {
                0 $(+ usize::from(self.$idx.is_reactive()))+
            }
        }
    };
}

impl_inputs_for_tuple!(A: 0);
impl_inputs_for_tuple!(A: 0, B: 1);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_inputs_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
