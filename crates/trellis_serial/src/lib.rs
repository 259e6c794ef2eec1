//! Converts object graphs to and from a tree of named nodes.
//!
//! The crate is organised around three collaborating parts:
//!
//! - [`convert`]: the [`Converter`](convert::Converter) contract and the
//!   priority-ranked [`ConverterLookup`](convert::ConverterLookup) that picks a
//!   converter for every value.
//! - [`mapper`]: a chain of naming stages translating types and members to the
//!   names used in the tree and back.
//! - [`security`]: the [`TypeGate`](security::TypeGate) deciding which types may be
//!   instantiated from input. It is fail-closed.
//!
//! Types take part through explicitly registered [`TypeInfo`](info::TypeInfo),
//! usually declared with [`impl_typed!`]. The [`Trellis`] engine ties everything
//! together and is configured once through its [`TrellisBuilder`].
//!
//! # Example
//!
//! ```
//! use trellis_serial::{Trellis, impl_typed};
//! use trellis_serial::info::Type;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: String,
//! }
//!
//! impl_typed! {
//!     struct Point as "geo.Point" { x: i32, y: i32, label: String }
//! }
//!
//! let trellis = Trellis::builder()
//!     .alias::<Point>("point")
//!     .use_attribute_for(Type::of::<Point>(), "x")
//!     .allow_types([Type::of::<Point>()])
//!     .build();
//!
//! let point = Point { x: 1, y: 2, label: "origin".into() };
//! let tree = trellis.to_tree(&point).unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     r#"<point x="1"><y>2</y><label>origin</label></point>"#
//! );
//!
//! let back: Point = trellis.from_tree_as(&tree).unwrap();
//! assert_eq!(back, point);
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod engine;
mod error;

pub mod convert;
pub mod info;
pub mod mapper;
pub mod marshal;
pub mod registry;
pub mod security;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use engine::{Trellis, TrellisBuilder};
pub use error::{ConversionError, ForbiddenType};

pub use trellis_tree as tree;
