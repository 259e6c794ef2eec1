//! Explicit type information replacing runtime reflection.
//!
//! - [`Type`]: a structurally comparable type descriptor.
//! - [`TypeInfo`]: what the engine knows about one registered type, its
//!   [`TypeKind`], supertypes, constructor and accessors.
//! - [`FieldInfo`], [`VariantTable`], [`ListAccess`]: function pointer
//!   accessors for struct fields, unit enum variants and arrays.
//! - [`Typed`]: implemented by every Rust type taking part in conversion,
//!   usually through [`impl_typed!`](crate::impl_typed).

// -----------------------------------------------------------------------------
// Modules

mod macros;
mod ty;
mod type_info;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use ty::Type;
pub use type_info::{FieldInfo, ListAccess, TypeInfo, TypeKind, VariantTable};
pub use typed::Typed;
