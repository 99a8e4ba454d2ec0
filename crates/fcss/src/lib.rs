#![forbid(unsafe_code)]

//! fcss public facade crate.
//!
//! Re-exports the reactive core and the typed declaration layer.
//!
//! ```
//! use fcss::prelude::*;
//!
//! let gap = Observable::new(Length::px(4.0));
//! let mut block = DeclarationBlock::new();
//! block
//!     .insert(catalog::padding(Edges::all(ValueSource::reactive(&gap))))
//!     .unwrap();
//! assert_eq!(block.render(), "padding: 4px;");
//!
//! gap.set(Length::px(6.0));
//! assert_eq!(block.get("padding").as_deref(), Some("6px"));
//! ```

pub use fcss_reactive as reactive;
pub use fcss_style as style;

pub mod prelude {
    pub use fcss_reactive::{
        CompositeBuilder, CompositeError, CompositeValue, Inputs, NotifyPolicy, Observable,
        Subscription, ValueSource,
    };
    pub use fcss_style::catalog::{self, Edges, Shadow};
    pub use fcss_style::{
        AnyProperty, BorderStyle, Color, Declaration, DeclarationBlock, Keyword, Length,
        Lifecycle, Property, PropertyError, PropertyKey, ToCss, join_present,
    };
}
