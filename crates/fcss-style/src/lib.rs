#![forbid(unsafe_code)]

//! Typed CSS declarations for fcss.
//!
//! This crate provides:
//! - [`PropertyKey`] for interned property names tagged with their value shape
//! - [`Property`] for one declaration whose value is a scalar or a reactive
//!   [`CompositeValue`](fcss_reactive::CompositeValue)
//! - [`ToCss`] and value types ([`Length`], [`Color`]) for formatters
//! - A small [`catalog`] of representative properties
//! - [`DeclarationBlock`] for collecting declarations and tracking which ones
//!   need to be re-rendered

pub mod catalog;
pub mod declaration;
pub mod key;
pub mod property;
pub mod value;

pub use declaration::{Declaration, DeclarationBlock};
pub use key::{AnyPropertyKey, PropertyKey};
pub use property::{AnyProperty, Lifecycle, Property, PropertyError, PropertyValue};
pub use value::{BorderStyle, Color, Keyword, Length, ToCss, join_present};
