//! The Type Permission Gate.
//!
//! Instantiating arbitrary types named by untrusted input is a code execution
//! vector, so every type read from a tree passes the [`TypeGate`] before an
//! instance is created. The gate is fail-closed: without a deciding rule a
//! type is denied.
//!
//! ## Menu
//!
//! - [`Permission`]: the verdict of one rule, `Allow`, `Deny` or `Abstain`.
//! - [`TypePermission`]: a single rule.
//! - [`PermissionRules`]: rules evaluated newest first.
//! - [`TypeGate`]: rules plus the registry they consult.
//! - Rules:
//!     - [`AnyTypePermission`], [`NoTypePermission`]
//!     - [`PrimitiveTypePermission`], [`ArrayTypePermission`]
//!     - [`ExplicitTypePermission`], [`TypeHierarchyPermission`]
//!     - [`PrefixTypePermission`]
//!     - [`RegexTypePermission`], [`WildcardTypePermission`] (feature `std`)
//!     - [`SyntheticTypePermission`]
//!     - [`DenyPermission`]

// -----------------------------------------------------------------------------
// Modules

mod gate;
mod permission;
mod rules;

#[cfg(feature = "std")]
mod pattern;

// -----------------------------------------------------------------------------
// Exports

pub use gate::{PermissionRules, TypeGate};
pub use permission::{Permission, TypePermission, same_rule};
pub use rules::{AnyTypePermission, NoTypePermission};
pub use rules::{ArrayTypePermission, PrimitiveTypePermission};
pub use rules::{DenyPermission, SyntheticTypePermission};
pub use rules::{ExplicitTypePermission, PrefixTypePermission, TypeHierarchyPermission};

#[cfg(feature = "std")]
pub use pattern::{RegexTypePermission, WildcardTypePermission};
