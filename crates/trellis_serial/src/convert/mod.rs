//! Converters and the dispatch picking one for every value.
//!
//! ## Menu
//!
//! - [`Converter`]: one value to one tree node and back.
//! - [`SingleValueConverter`]: one value to a text and back, usable for
//!   attributes. [`SingleValueConverterWrapper`] turns it into a [`Converter`].
//! - [`ConverterLookup`]: registrations ranked by [`Priority`].
//! - Bundled converters:
//!     - [`FromStrConverter`] for the primitives and `String`
//!     - [`CharArrayConverter`] writing `Vec<char>` as text
//!     - [`EnumConverter`] writing unit variants by name
//!     - [`ArrayConverter`], one child per item
//!     - [`StructConverter`], driven by the registered fields

// -----------------------------------------------------------------------------
// Modules

mod array;
mod converter;
mod lookup;
mod scalar;
mod structure;

// -----------------------------------------------------------------------------
// Exports

pub use converter::{Converter, SingleValueConverter, SingleValueConverterWrapper};
pub use lookup::{ConverterLookup, Priority};

pub use array::ArrayConverter;
pub use scalar::{CharArrayConverter, EnumConverter, FromStrConverter};
pub use structure::StructConverter;
