//! The store of registered [`TypeInfo`](crate::info::TypeInfo).
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! The [`inventory`] crate implements the static registration. Not every
//! platform supports it, on those the call registers nothing.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod auto;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use auto::AutoRegistration;
pub use type_registry::TypeRegistry;
