#![forbid(unsafe_code)]

//! Representative property builders.
//!
//! Every builder takes [`ValueSource`] arguments, so any subset of a
//! declaration's components may be bound to live state:
//!
//! ```
//! use fcss_reactive::{Observable, ValueSource};
//! use fcss_style::catalog::{self, Shadow};
//! use fcss_style::{Color, Length};
//!
//! let offset = Observable::new(Length::px(2.0));
//! let shadow = catalog::box_shadow(
//!     Shadow::new(ValueSource::reactive(&offset), ValueSource::constant(Length::px(4.0)))
//!         .color(ValueSource::constant(Some(Color::Named("black")))),
//! );
//! assert_eq!(shadow.current_string(), "2px 4px black");
//!
//! offset.set(Length::px(3.0));
//! assert_eq!(shadow.current_string(), "3px 4px black");
//! ```

use std::rc::Rc;

use fcss_reactive::{CompositeValue, Inputs, Subscription, ValueSource};

use crate::key::PropertyKey;
use crate::property::Property;
use crate::value::{BorderStyle, Color, Keyword, Length, ToCss, join_present};

pub const COLOR: PropertyKey<Color> = PropertyKey::new("color");
pub const OPACITY: PropertyKey<f32> = PropertyKey::new("opacity");
pub const MARGIN: PropertyKey<Edges> = PropertyKey::new("margin");
pub const PADDING: PropertyKey<Edges> = PropertyKey::new("padding");
pub const BORDER: PropertyKey<Border> = PropertyKey::new("border");
pub const BOX_SHADOW: PropertyKey<Shadow> = PropertyKey::new("box-shadow");

/// `color`.
#[must_use]
pub fn color(value: ValueSource<Color>) -> Property<Color> {
    Property::from_source(COLOR, value)
}

/// `opacity`, clamped to `[0, 1]`.
#[must_use]
pub fn opacity(value: ValueSource<f32>) -> Property<f32> {
    match value {
        ValueSource::Constant(v) => Property::scalar(OPACITY, v.clamp(0.0, 1.0)),
        reactive @ ValueSource::Reactive(_) => Property::composite(
            OPACITY,
            CompositeValue::builder(reactive)
                .label(OPACITY.name())
                .format(|v: f32| v.clamp(0.0, 1.0).to_css_string()),
        ),
    }
}

/// `margin`.
#[must_use]
pub fn margin(edges: Edges) -> Property<Edges> {
    edges_property(MARGIN, edges)
}

/// `padding`.
#[must_use]
pub fn padding(edges: Edges) -> Property<Edges> {
    edges_property(PADDING, edges)
}

fn edges_property(key: PropertyKey<Edges>, edges: Edges) -> Property<Edges> {
    Property::composite(
        key,
        CompositeValue::builder(edges)
            .label(key.name())
            .format(|values: EdgeValues| values.to_css_string()),
    )
}

/// `border: <width>? <style>? <color>?`.
///
/// Absent components are left out; if all are absent the value is empty.
#[must_use]
pub fn border(
    width: ValueSource<Option<Length>>,
    style: ValueSource<Option<BorderStyle>>,
    color: ValueSource<Option<Color>>,
) -> Property<Border> {
    Property::composite(
        BORDER,
        CompositeValue::builder((width, style, color))
            .label(BORDER.name())
            .format(|(width, style, color)| {
                let tokens: [&dyn ToCss; 3] = [&width, &style, &color];
                join_present(" ", tokens)
            }),
    )
}

/// `box-shadow` with a single shadow.
#[must_use]
pub fn box_shadow(shadow: Shadow) -> Property<Shadow> {
    box_shadows(vec![shadow])
}

/// `box-shadow` with a comma-separated list of shadows.
///
/// An empty list serializes as `none`.
#[must_use]
pub fn box_shadows(shadows: Vec<Shadow>) -> Property<Shadow> {
    Property::composite(
        BOX_SHADOW,
        CompositeValue::builder(shadows)
            .label(BOX_SHADOW.name())
            .format(|values: Vec<ShadowValue>| {
                if values.is_empty() {
                    "none".to_string()
                } else {
                    join_present(", ", &values)
                }
            }),
    )
}

// ── Edges ───────────────────────────────────────────────────────────────

/// Four box edges, each independently constant or reactive.
#[derive(Clone)]
pub struct Edges {
    pub top: ValueSource<Length>,
    pub right: ValueSource<Length>,
    pub bottom: ValueSource<Length>,
    pub left: ValueSource<Length>,
}

impl Edges {
    /// Edges in CSS order: top, right, bottom, left.
    #[must_use]
    pub fn new(
        top: ValueSource<Length>,
        right: ValueSource<Length>,
        bottom: ValueSource<Length>,
        left: ValueSource<Length>,
    ) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same source on all four edges.
    #[must_use]
    pub fn all(value: ValueSource<Length>) -> Self {
        Self::new(value.clone(), value.clone(), value.clone(), value)
    }

    /// `vertical` on top/bottom, `horizontal` on left/right.
    #[must_use]
    pub fn symmetric(vertical: ValueSource<Length>, horizontal: ValueSource<Length>) -> Self {
        Self::new(vertical.clone(), horizontal.clone(), vertical, horizontal)
    }
}

/// Resolved edge lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeValues {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl ToCss for EdgeValues {
    /// Shortest of the 1-, 2-, 3- or 4-value forms.
    fn to_css(&self, dest: &mut String) {
        let Self {
            top,
            right,
            bottom,
            left,
        } = self;
        let count = if left != right {
            4
        } else if top != bottom {
            3
        } else if top != right {
            2
        } else {
            1
        };
        let tokens = [top, right, bottom, left];
        dest.push_str(&join_present(" ", &tokens[..count]));
    }
}

impl Inputs for Edges {
    type Values = EdgeValues;

    fn current_values(&self) -> EdgeValues {
        EdgeValues {
            top: self.top.current_value(),
            right: self.right.current_value(),
            bottom: self.bottom.current_value(),
            left: self.left.current_value(),
        }
    }

    fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription> {
        (
            self.top.clone(),
            self.right.clone(),
            self.bottom.clone(),
            self.left.clone(),
        )
            .attach(on_change)
    }

    fn reactive_count(&self) -> usize {
        [&self.top, &self.right, &self.bottom, &self.left]
            .into_iter()
            .filter(|source| source.is_reactive())
            .count()
    }
}

// ── Shadow ──────────────────────────────────────────────────────────────

/// One shadow: offsets plus optional blur, spread, color and inset flag.
#[derive(Clone)]
pub struct Shadow {
    pub h: ValueSource<Length>,
    pub v: ValueSource<Length>,
    pub blur: ValueSource<Option<Length>>,
    pub spread: ValueSource<Option<Length>>,
    pub color: ValueSource<Option<Color>>,
    pub inset: ValueSource<bool>,
}

impl Shadow {
    /// A shadow with the given offsets and no blur, spread or color.
    #[must_use]
    pub fn new(h: ValueSource<Length>, v: ValueSource<Length>) -> Self {
        Self {
            h,
            v,
            blur: ValueSource::Constant(None),
            spread: ValueSource::Constant(None),
            color: ValueSource::Constant(None),
            inset: ValueSource::Constant(false),
        }
    }

    /// Blur radius; omitted when absent.
    #[must_use]
    pub fn blur(mut self, blur: ValueSource<Option<Length>>) -> Self {
        self.blur = blur;
        self
    }

    /// Spread distance; omitted when absent.
    #[must_use]
    pub fn spread(mut self, spread: ValueSource<Option<Length>>) -> Self {
        self.spread = spread;
        self
    }

    /// Shadow color; omitted when absent.
    #[must_use]
    pub fn color(mut self, color: ValueSource<Option<Color>>) -> Self {
        self.color = color;
        self
    }

    /// Draw inside the border box, written as a leading `inset`.
    #[must_use]
    pub fn inset(mut self, inset: ValueSource<bool>) -> Self {
        self.inset = inset;
        self
    }
}

/// Resolved shadow components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowValue {
    pub h: Length,
    pub v: Length,
    pub blur: Option<Length>,
    pub spread: Option<Length>,
    pub color: Option<Color>,
    pub inset: bool,
}

impl ToCss for ShadowValue {
    fn to_css(&self, dest: &mut String) {
        let inset = self.inset.then_some(Keyword("inset"));
        let tokens: [&dyn ToCss; 6] = [
            &inset,
            &self.h,
            &self.v,
            &self.blur,
            &self.spread,
            &self.color,
        ];
        dest.push_str(&join_present(" ", tokens));
    }
}

impl Inputs for Shadow {
    type Values = ShadowValue;

    fn current_values(&self) -> ShadowValue {
        ShadowValue {
            h: self.h.current_value(),
            v: self.v.current_value(),
            blur: self.blur.current_value(),
            spread: self.spread.current_value(),
            color: self.color.current_value(),
            inset: self.inset.current_value(),
        }
    }

    fn attach(&self, on_change: &Rc<dyn Fn()>) -> Vec<Subscription> {
        (
            self.h.clone(),
            self.v.clone(),
            self.blur.clone(),
            self.spread.clone(),
            self.color.clone(),
            self.inset.clone(),
        )
            .attach(on_change)
    }

    fn reactive_count(&self) -> usize {
        [
            self.h.is_reactive(),
            self.v.is_reactive(),
            self.blur.is_reactive(),
            self.spread.is_reactive(),
            self.color.is_reactive(),
            self.inset.is_reactive(),
        ]
        .into_iter()
        .filter(|reactive| *reactive)
        .count()
    }
}

// ── Border ──────────────────────────────────────────────────────────────

/// Value-shape tag for `border`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: Option<Length>,
    pub style: Option<BorderStyle>,
    pub color: Option<Color>,
}
