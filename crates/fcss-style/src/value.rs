#![forbid(unsafe_code)]

//! CSS value formatting.
//!
//! [`ToCss`] writes a value's CSS text into a `String`. Absent values
//! (`Option::None`) write nothing, and [`join_present`] skips empty tokens, so
//! a formatter can pass every component through unconditionally and still
//! produce `1px 2px` rather than `1px 2px  `.

/// Serialize a value as CSS text.
pub trait ToCss {
    /// Append the CSS text for `self` to `dest`.
    fn to_css(&self, dest: &mut String);

    /// The CSS text for `self`.
    fn to_css_string(&self) -> String {
        let mut out = String::new();
        self.to_css(&mut out);
        out
    }
}

impl<T: ToCss + ?Sized> ToCss for &T {
    fn to_css(&self, dest: &mut String) {
        (**self).to_css(dest);
    }
}

impl<T: ToCss> ToCss for Option<T> {
    fn to_css(&self, dest: &mut String) {
        if let Some(value) = self {
            value.to_css(dest);
        }
    }
}

impl ToCss for str {
    fn to_css(&self, dest: &mut String) {
        dest.push_str(self);
    }
}

impl ToCss for String {
    fn to_css(&self, dest: &mut String) {
        dest.push_str(self);
    }
}

macro_rules! impl_to_css_for_number {
    ($($ty:ty),+) => {
        $(
            impl ToCss for $ty {
                fn to_css(&self, dest: &mut String) {
                    use std::fmt::Write;
                    let _ = write!(dest, "{}", self);
                }
            }
        )+
    };
}

impl_to_css_for_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Join the CSS text of `tokens` with `separator`, skipping empty tokens.
///
/// Returns an empty string if every token is empty.
pub fn join_present<I>(separator: &str, tokens: I) -> String
where
    I: IntoIterator,
    I::Item: ToCss,
{
    let mut out = String::new();
    let mut token = String::new();
    for item in tokens {
        token.clear();
        item.to_css(&mut token);
        if token.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(separator);
        }
        out.push_str(&token);
    }
    out
}

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Unitless zero.
    #[default]
    Zero,
    /// `auto`.
    Auto,
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
}

impl Length {
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::Px(value)
    }

    #[must_use]
    pub const fn em(value: f32) -> Self {
        Self::Em(value)
    }

    #[must_use]
    pub const fn rem(value: f32) -> Self {
        Self::Rem(value)
    }

    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }
}

impl ToCss for Length {
    fn to_css(&self, dest: &mut String) {
        use std::fmt::Write;
        let _ = match *self {
            Self::Zero => write!(dest, "0"),
            Self::Auto => write!(dest, "auto"),
            Self::Px(v) => write!(dest, "{v}px"),
            Self::Em(v) => write!(dest, "{v}em"),
            Self::Rem(v) => write!(dest, "{v}rem"),
            Self::Percent(v) => write!(dest, "{v}%"),
            Self::Vw(v) => write!(dest, "{v}vw"),
            Self::Vh(v) => write!(dest, "{v}vh"),
        };
    }
}

/// A CSS color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Opaque sRGB, written as `#rrggbb`.
    Rgb(u8, u8, u8),
    /// sRGB with alpha in `[0, 1]`, written as `rgba(r, g, b, a)`.
    Rgba(u8, u8, u8, f32),
    /// A named color such as `rebeccapurple`.
    Named(&'static str),
    CurrentColor,
    Transparent,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(r, g, b)
    }

    /// Color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn hex(rgb: u32) -> Self {
        Self::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

impl ToCss for Color {
    fn to_css(&self, dest: &mut String) {
        use std::fmt::Write;
        let _ = match *self {
            Self::Rgb(r, g, b) => write!(dest, "#{r:02x}{g:02x}{b:02x}"),
            Self::Rgba(r, g, b, a) => write!(dest, "rgba({r}, {g}, {b}, {})", a.clamp(0.0, 1.0)),
            Self::Named(name) => write!(dest, "{name}"),
            Self::CurrentColor => write!(dest, "currentcolor"),
            Self::Transparent => write!(dest, "transparent"),
        };
    }
}

/// A bare CSS keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keyword(pub &'static str);

impl ToCss for Keyword {
    fn to_css(&self, dest: &mut String) {
        dest.push_str(self.0);
    }
}

/// Line style for borders and outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hidden => "hidden",
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
        }
    }
}

impl ToCss for BorderStyle {
    fn to_css(&self, dest: &mut String) {
        dest.push_str(self.as_str());
    }
}
