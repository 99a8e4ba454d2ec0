#![forbid(unsafe_code)]

//! A single CSS declaration: key plus scalar or reactive value.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──on_value_changed──▶ Active ──dispose/drop──▶ Disposed
//!      └──────────────────dispose/drop──────────────────────────▲
//! ```
//!
//! Transitions only move right. A disposed property has released every
//! subscription its composite held; using it afterwards is a programming
//! error. The plain accessors panic, the `try_*` variants return
//! [`PropertyError::Disposed`].
//!
//! Dropping a property disposes it, so a property can never leave a callback
//! registered on a longer-lived cell.

use fcss_reactive::{CompositeValue, ValueSource};

use crate::key::{AnyPropertyKey, PropertyKey};
use crate::value::ToCss;

/// Where a property is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Value computed, nobody listening yet.
    Constructed,
    /// Forwarding notifications to a listener.
    Active,
    /// Subscriptions released. Terminal.
    Disposed,
}

/// Errors from using a property outside its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The property was used after `dispose()`.
    Disposed {
        /// Name of the property.
        name: &'static str,
    },
}

impl std::fmt::Display for PropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disposed { name } => write!(f, "property '{}' used after dispose", name),
        }
    }
}

impl std::error::Error for PropertyError {}

/// The value of a declaration.
#[derive(Debug)]
pub enum PropertyValue {
    /// Serialized once at construction; never changes.
    Scalar(String),
    /// Recomputed whenever one of its reactive inputs changes.
    Composite(CompositeValue),
}

impl PropertyValue {
    /// Current CSS text.
    #[must_use]
    pub fn current_string(&self) -> String {
        match self {
            Self::Scalar(text) => text.clone(),
            Self::Composite(composite) => composite.current_string(),
        }
    }
}

impl From<CompositeValue> for PropertyValue {
    fn from(composite: CompositeValue) -> Self {
        Self::Composite(composite)
    }
}

impl From<String> for PropertyValue {
    fn from(text: String) -> Self {
        Self::Scalar(text)
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        Self::Scalar(text.to_owned())
    }
}

/// One CSS declaration whose value has shape `V`.
pub struct Property<V> {
    key: PropertyKey<V>,
    value: PropertyValue,
    lifecycle: Lifecycle,
}

impl<V> Property<V> {
    /// A declaration with the given value.
    #[must_use]
    pub fn new(key: PropertyKey<V>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key,
            value: value.into(),
            lifecycle: Lifecycle::Constructed,
        }
    }

    /// A declaration whose value never changes.
    #[must_use]
    pub fn scalar(key: PropertyKey<V>, value: impl ToCss) -> Self {
        Self::new(key, PropertyValue::Scalar(value.to_css_string()))
    }

    /// A declaration backed by a composite value.
    #[must_use]
    pub fn composite(key: PropertyKey<V>, composite: CompositeValue) -> Self {
        Self::new(key, PropertyValue::Composite(composite))
    }

    /// A declaration with one input, constant or reactive.
    ///
    /// Constant sources become scalars; reactive ones a single-input
    /// composite labelled with the property name.
    #[must_use]
    pub fn from_source<T>(key: PropertyKey<V>, source: ValueSource<T>) -> Self
    where
        T: ToCss + Clone + 'static,
    {
        match source {
            ValueSource::Constant(value) => Self::scalar(key, value),
            reactive @ ValueSource::Reactive(_) => Self::composite(
                key,
                CompositeValue::builder(reactive)
                    .label(key.name())
                    .format(|value: T| value.to_css_string()),
            ),
        }
    }

    #[must_use]
    pub fn key(&self) -> PropertyKey<V> {
        self.key
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the value can change after construction.
    #[must_use]
    pub fn is_reactive(&self) -> bool {
        match &self.value {
            PropertyValue::Scalar(_) => false,
            PropertyValue::Composite(composite) => composite.reactive_inputs() > 0,
        }
    }

    /// The composite backing this property, if any.
    #[must_use]
    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match &self.value {
            PropertyValue::Scalar(_) => None,
            PropertyValue::Composite(composite) => Some(composite),
        }
    }

    /// Current CSS text of the value.
    ///
    /// # Panics
    ///
    /// Panics if the property has been disposed.
    #[track_caller]
    #[must_use]
    pub fn current_string(&self) -> String {
        match self.try_current_string() {
            Ok(text) => text,
            Err(err) => panic!("{err}"),
        }
    }

    /// Current CSS text of the value.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Disposed`] if the property has been disposed.
    pub fn try_current_string(&self) -> Result<String, PropertyError> {
        self.ensure_live()?;
        Ok(self.value.current_string())
    }

    /// Forward value changes to `callback`, replacing any previous callback.
    ///
    /// Scalars never change, so for them this only moves the property to
    /// [`Lifecycle::Active`].
    ///
    /// # Panics
    ///
    /// Panics if the property has been disposed.
    #[track_caller]
    pub fn on_value_changed(&mut self, callback: impl Fn(&str) + 'static) {
        if let Err(err) = self.try_on_value_changed(callback) {
            panic!("{err}");
        }
    }

    /// Forward value changes to `callback`, replacing any previous callback.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Disposed`] if the property has been disposed.
    pub fn try_on_value_changed(
        &mut self,
        callback: impl Fn(&str) + 'static,
    ) -> Result<(), PropertyError> {
        self.ensure_live()?;
        if let PropertyValue::Composite(composite) = &self.value {
            composite
                .try_on_change(callback)
                .map_err(|_| PropertyError::Disposed {
                    name: self.key.name(),
                })?;
        }
        self.lifecycle = Lifecycle::Active;
        Ok(())
    }

    /// Release every subscription. Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        if let PropertyValue::Composite(composite) = &self.value {
            composite.detach();
        }
        tracing::debug!(property = self.key.name(), from = ?self.lifecycle, "property.dispose");
        self.lifecycle = Lifecycle::Disposed;
    }

    fn ensure_live(&self) -> Result<(), PropertyError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Err(PropertyError::Disposed {
                name: self.key.name(),
            });
        }
        Ok(())
    }
}

impl<V> Drop for Property<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<V> std::fmt::Debug for Property<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.key.name())
            .field("value", &self.value)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

/// Object-safe view of a [`Property`] with its value type erased.
///
/// Lets declarations of different shapes live in one collection.
pub trait AnyProperty {
    /// The property's key, with the value type kept as a `TypeId`.
    fn key(&self) -> AnyPropertyKey;

    /// Current lifecycle state.
    fn lifecycle(&self) -> Lifecycle;

    /// See [`Property::try_current_string`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Disposed`] after dispose.
    fn try_current_string(&self) -> Result<String, PropertyError>;

    /// See [`Property::try_on_value_changed`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Disposed`] after dispose.
    fn try_on_value_changed(&mut self, callback: Box<dyn Fn(&str)>) -> Result<(), PropertyError>;

    /// Release every subscription. Idempotent.
    fn dispose(&mut self);
}

impl<V: 'static> AnyProperty for Property<V> {
    fn key(&self) -> AnyPropertyKey {
        self.key.erase()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn try_current_string(&self) -> Result<String, PropertyError> {
        Property::try_current_string(self)
    }

    fn try_on_value_changed(&mut self, callback: Box<dyn Fn(&str)>) -> Result<(), PropertyError> {
        Property::try_on_value_changed(self, callback)
    }

    fn dispose(&mut self) {
        Property::dispose(self);
    }
}
