#![forbid(unsafe_code)]

//! Declaration blocks.
//!
//! A [`DeclarationBlock`] owns the properties of one rule, keyed by name.
//! It forwards every property's change callback into a shared queue, so a
//! consumer can render once and then patch only what changed:
//!
//! ```
//! use fcss_reactive::{Observable, ValueSource};
//! use fcss_style::{Color, DeclarationBlock, catalog};
//!
//! let accent = Observable::new(Color::Named("red"));
//! let mut block = DeclarationBlock::new();
//! block.insert(catalog::color(ValueSource::reactive(&accent))).unwrap();
//! block.insert(catalog::opacity(ValueSource::constant(0.5))).unwrap();
//! assert_eq!(block.render(), "color: red; opacity: 0.5;");
//!
//! accent.set(Color::Named("blue"));
//! assert_eq!(block.take_changed(), vec!["color"]);
//! assert_eq!(block.get("color").as_deref(), Some("blue"));
//! ```
//!
//! # Invariants
//!
//! 1. At most one declaration per name. Inserting a name that is already
//!    present disposes the old declaration and takes over its position.
//! 2. Every declaration leaving the block (replace, remove, clear, drop) is
//!    disposed, so its subscriptions are released with it.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::property::{AnyProperty, PropertyError};

type PatchHook = Rc<dyn Fn(&'static str, &str)>;

/// One rendered `name: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// The declarations of one rule, in insertion order.
#[derive(Default)]
pub struct DeclarationBlock {
    entries: Vec<Box<dyn AnyProperty>>,
    index: AHashMap<&'static str, usize>,
    /// Drained only by `take_changed`.
    changed: Rc<RefCell<Vec<&'static str>>>,
    hook: Rc<RefCell<Option<PatchHook>>>,
}

impl DeclarationBlock {
    /// An empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `property`, replacing any declaration with the same name.
    ///
    /// Returns `true` if an existing declaration was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Disposed`] if `property` was already
    /// disposed; the block is left unchanged.
    pub fn insert(&mut self, property: impl AnyProperty + 'static) -> Result<bool, PropertyError> {
        let mut property: Box<dyn AnyProperty> = Box::new(property);
        let name = property.key().name();

        let changed = Rc::clone(&self.changed);
        let hook = Rc::clone(&self.hook);
        property.try_on_value_changed(Box::new(move |value: &str| {
            changed.borrow_mut().push(name);
            let hook = hook.borrow().clone();
            if let Some(hook) = hook {
                hook(name, value);
            }
        }))?;

        match self.index.get(name) {
            Some(&slot) => {
                let mut old = std::mem::replace(&mut self.entries[slot], property);
                tracing::debug!(property = name, "declaration.replace");
                old.dispose();
                Ok(true)
            }
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(property);
                Ok(false)
            }
        }
    }

    /// Remove and dispose the declaration called `name`.
    ///
    /// Returns `false` if there was none.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(slot) = self.index.remove(name) else {
            return false;
        };
        let mut old = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        old.dispose();
        true
    }

    /// Current value of the declaration called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let slot = *self.index.get(name)?;
        self.entries[slot].try_current_string().ok()
    }

    /// Whether a declaration called `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of declarations, including ones whose value renders empty.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declaration names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.key().name())
    }

    /// `name: value;` for every declaration with a non-empty value,
    /// separated by single spaces.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for declaration in self.snapshot() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&declaration.name);
            out.push_str(": ");
            out.push_str(&declaration.value);
            out.push(';');
        }
        out
    }

    /// Every declaration with a non-empty value, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Declaration> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let value = entry.try_current_string().ok()?;
                (!value.is_empty()).then(|| Declaration {
                    name: entry.key().name().to_string(),
                    value,
                })
            })
            .collect()
    }

    /// Names notified since the last call, one entry per notification.
    ///
    /// The queue is only emptied here. A consumer that installs no
    /// [`on_patch`](Self::on_patch) hook must call this after each batch of
    /// writes, or the queue keeps growing.
    pub fn take_changed(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut *self.changed.borrow_mut())
    }

    /// Call `hook(name, value)` on every change, after it is queued.
    ///
    /// Replaces any previous hook.
    pub fn on_patch(&mut self, hook: impl Fn(&'static str, &str) + 'static) {
        *self.hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Dispose and remove every declaration.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        tracing::debug!(count = self.entries.len(), "declaration.clear");
        self.index.clear();
        for mut entry in self.entries.drain(..) {
            entry.dispose();
        }
    }
}

impl Drop for DeclarationBlock {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for DeclarationBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarationBlock")
            .field("names", &self.names().collect::<Vec<_>>())
            .field("pending", &self.changed.borrow().len())
            .field("has_hook", &self.hook.borrow().is_some())
            .finish()
    }
}
