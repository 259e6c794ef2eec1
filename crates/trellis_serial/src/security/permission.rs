use core::any::Any;
use core::fmt::Debug;

use crate::info::Type;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Permission

/// The verdict of a [`TypePermission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Allow,
    Deny,
    /// The rule has no opinion, older rules decide.
    Abstain,
}

// -----------------------------------------------------------------------------
// TypePermission

/// A rule deciding whether a type may be instantiated from input.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, TypePermission, same_rule};
///
/// #[derive(Debug, PartialEq)]
/// struct ShortNames(usize);
///
/// impl TypePermission for ShortNames {
///     fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
///         match ty.path() {
///             Some(path) if path.len() <= self.0 => Permission::Allow,
///             _ => Permission::Abstain,
///         }
///     }
///
///     fn same_as(&self, other: &dyn TypePermission) -> bool {
///         same_rule(self, other)
///     }
/// }
///
/// let registry = TypeRegistry::empty();
/// let rule = ShortNames(4);
/// assert_eq!(rule.check(&Type::from_static("a.B"), &registry), Permission::Allow);
/// assert_eq!(rule.check(&Type::from_static("a.Long"), &registry), Permission::Abstain);
/// assert!(rule.same_as(&ShortNames(4)));
/// assert!(!rule.same_as(&ShortNames(5)));
/// ```
pub trait TypePermission: Any + Send + Sync + Debug {
    fn check(&self, ty: &Type, registry: &TypeRegistry) -> Permission;

    /// Returns `true` if `other` is the same rule.
    ///
    /// Only used to avoid duplicate rules, the default never matches.
    fn same_as(&self, _other: &dyn TypePermission) -> bool {
        false
    }
}

/// Compares `this` to `other` when both are of type `T`.
#[inline]
pub fn same_rule<T: TypePermission + PartialEq>(this: &T, other: &dyn TypePermission) -> bool {
    let other: &dyn Any = other;
    other.downcast_ref::<T>().is_some_and(|other| other == this)
}
