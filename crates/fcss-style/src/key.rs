#![forbid(unsafe_code)]

//! Property keys: interned CSS property names tagged with a value type.
//!
//! A [`PropertyKey<V>`] is a `&'static str` plus a phantom `V` describing the
//! shape of the value a property with this name carries. Two keys are equal
//! when their names are equal; the tag only exists at compile time.
//!
//! Keys declared as constants are interned by construction. Keys built from
//! runtime strings go through [`PropertyKey::intern`], which hands out one
//! `&'static str` per distinct name for the life of the process.

use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Mutex, OnceLock, PoisonError};

use ahash::AHashSet;

static INTERNED: OnceLock<Mutex<AHashSet<&'static str>>> = OnceLock::new();

/// Return the process-wide `&'static str` for `name`, allocating it once.
pub fn intern(name: &str) -> &'static str {
    let mut set = INTERNED
        .get_or_init(|| Mutex::new(AHashSet::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(&existing) = set.get(name) {
        return existing;
    }
    let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
    set.insert(leaked);
    leaked
}

/// Identity of a CSS property, tagged with its value type `V`.
pub struct PropertyKey<V> {
    name: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> PropertyKey<V> {
    /// A key for a literal property name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    /// A key for a property name only known at runtime.
    #[must_use]
    pub fn intern(name: &str) -> Self {
        Self::new(intern(name))
    }

    /// The CSS property name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<V: 'static> PropertyKey<V> {
    /// Drop the static value tag, keeping it as a runtime [`TypeId`].
    #[must_use]
    pub fn erase(self) -> AnyPropertyKey {
        AnyPropertyKey {
            name: self.name,
            value_type: TypeId::of::<V>(),
            type_name: std::any::type_name::<V>(),
        }
    }
}

impl<V> Clone for PropertyKey<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for PropertyKey<V> {}

impl<V> PartialEq for PropertyKey<V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<V> Eq for PropertyKey<V> {}

impl<V> Hash for PropertyKey<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<V> std::fmt::Debug for PropertyKey<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.name).finish()
    }
}

impl<V> std::fmt::Display for PropertyKey<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A [`PropertyKey`] with its value type moved to runtime.
///
/// Used where declarations of different shapes are stored together and
/// looked up by name.
#[derive(Debug, Clone, Copy)]
pub struct AnyPropertyKey {
    name: &'static str,
    value_type: TypeId,
    type_name: &'static str,
}

impl AnyPropertyKey {
    /// The CSS property name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the value type, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the key was erased from a `PropertyKey<V>`.
    #[must_use]
    pub fn is<V: 'static>(&self) -> bool {
        self.value_type == TypeId::of::<V>()
    }

    /// Recover the typed key if the value type matches.
    #[must_use]
    pub fn downcast<V: 'static>(&self) -> Option<PropertyKey<V>> {
        self.is::<V>().then(|| PropertyKey::new(self.name))
    }
}

impl PartialEq for AnyPropertyKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value_type == other.value_type
    }
}

impl Eq for AnyPropertyKey {}

impl Hash for AnyPropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value_type.hash(state);
    }
}

impl std::fmt::Display for AnyPropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
