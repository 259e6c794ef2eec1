use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use trellis_utils::hash::HashSet;

use crate::info::{Type, TypeKind};
use crate::registry::TypeRegistry;
use crate::security::{Permission, TypePermission, same_rule};

#[inline]
fn allow_if(condition: bool) -> Permission {
    if condition {
        Permission::Allow
    } else {
        Permission::Abstain
    }
}

// -----------------------------------------------------------------------------
// Any / No

/// Allows every type.
///
/// Adding it to [`PermissionRules`](crate::security::PermissionRules) drops
/// every older rule. Only use it for fully trusted input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyTypePermission;

impl TypePermission for AnyTypePermission {
    fn check(&self, _: &Type, _: &TypeRegistry) -> Permission {
        Permission::Allow
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

/// Denies every type.
///
/// Adding it to [`PermissionRules`](crate::security::PermissionRules) drops
/// every older rule, which makes it the starting point of a fresh rule set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTypePermission;

impl TypePermission for NoTypePermission {
    fn check(&self, _: &Type, _: &TypeRegistry) -> Permission {
        Permission::Deny
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Primitive / Array

/// Allows the primitives and `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveTypePermission;

impl TypePermission for PrimitiveTypePermission {
    fn check(&self, ty: &Type, registry: &TypeRegistry) -> Permission {
        let kind = registry.get(ty).map(|info| info.kind());
        allow_if(matches!(kind, Some(TypeKind::Primitive | TypeKind::Text)))
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

/// Allows every array.
///
/// Items are instantiated on their own, so their types still pass the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayTypePermission;

impl TypePermission for ArrayTypePermission {
    fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
        allow_if(ty.is_array())
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Explicit / Hierarchy

/// Allows an explicit set of types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitTypePermission {
    types: HashSet<Type>,
}

impl ExplicitTypePermission {
    pub fn new(types: impl IntoIterator<Item = Type>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }
}

impl TypePermission for ExplicitTypePermission {
    fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
        allow_if(self.types.contains(ty))
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

/// Allows a type and every type assignable to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHierarchyPermission {
    base: Type,
}

impl TypeHierarchyPermission {
    #[inline]
    pub fn new(base: Type) -> Self {
        Self { base }
    }
}

impl TypePermission for TypeHierarchyPermission {
    fn check(&self, ty: &Type, registry: &TypeRegistry) -> Permission {
        allow_if(registry.is_assignable(ty, &self.base))
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Prefix

/// Allows named types whose path starts with one of the given prefixes.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, PrefixTypePermission, TypePermission};
///
/// let registry = TypeRegistry::empty();
/// let rule = PrefixTypePermission::new(["proxy."]);
/// assert_eq!(rule.check(&Type::from_static("proxy.Generated42"), &registry), Permission::Allow);
/// assert_eq!(rule.check(&Type::from_static("proxy2.Other"), &registry), Permission::Abstain);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTypePermission {
    prefixes: Vec<String>,
}

impl PrefixTypePermission {
    pub fn new<S: Into<String>>(prefixes: impl IntoIterator<Item = S>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl TypePermission for PrefixTypePermission {
    fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
        let Some(path) = ty.path() else {
            return Permission::Abstain;
        };
        allow_if(self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())))
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Synthetic

/// Allows generated types recognised by a naming convention.
///
/// A type is synthetic when its path lies in the configured namespace, or
/// when it contains the configured marker.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, SyntheticTypePermission, TypePermission};
///
/// let registry = TypeRegistry::empty();
/// let rule = SyntheticTypePermission::new("gen.proxy").with_marker("$$Enhanced$$");
///
/// let check = |path: &'static str| rule.check(&Type::from_static(path), &registry);
/// assert_eq!(check("gen.proxy.Handle"), Permission::Allow);
/// assert_eq!(check("app.Order$$Enhanced$$1"), Permission::Allow);
/// assert_eq!(check("gen.proxyish.Handle"), Permission::Abstain);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTypePermission {
    namespace: String,
    marker: Option<String>,
}

impl SyntheticTypePermission {
    /// Types inside `namespace`, with or without a trailing separator.
    pub fn new(namespace: impl Into<String>) -> Self {
        let mut namespace = namespace.into();
        if !namespace.is_empty() && !namespace.ends_with(['.', ':']) {
            namespace.push('.');
        }
        Self {
            namespace,
            marker: None,
        }
    }

    /// Also allow types whose path contains `marker`.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }
}

impl TypePermission for SyntheticTypePermission {
    fn check(&self, ty: &Type, _: &TypeRegistry) -> Permission {
        let Some(path) = ty.path() else {
            return Permission::Abstain;
        };
        let in_namespace = !self.namespace.is_empty() && path.starts_with(self.namespace.as_str());
        let marked = self
            .marker
            .as_deref()
            .is_some_and(|marker| path.contains(marker));
        allow_if(in_namespace || marked)
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        same_rule(self, other)
    }
}

// -----------------------------------------------------------------------------
// Deny

/// Turns the `Allow` of the inner rule into `Deny`.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{DenyPermission, Permission, PrefixTypePermission, TypePermission};
///
/// let registry = TypeRegistry::empty();
/// let rule = DenyPermission::new(PrefixTypePermission::new(["unsafe."]));
/// assert_eq!(rule.check(&Type::from_static("unsafe.Exec"), &registry), Permission::Deny);
/// assert_eq!(rule.check(&Type::from_static("app.Item"), &registry), Permission::Abstain);
/// ```
#[derive(Debug)]
pub struct DenyPermission {
    inner: Box<dyn TypePermission>,
}

impl DenyPermission {
    pub fn new(inner: impl TypePermission) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    #[inline]
    pub fn inner(&self) -> &dyn TypePermission {
        &*self.inner
    }
}

impl TypePermission for DenyPermission {
    fn check(&self, ty: &Type, registry: &TypeRegistry) -> Permission {
        match self.inner.check(ty, registry) {
            Permission::Allow => Permission::Deny,
            Permission::Deny | Permission::Abstain => Permission::Abstain,
        }
    }

    fn same_as(&self, other: &dyn TypePermission) -> bool {
        let other: &dyn Any = other;
        other
            .downcast_ref::<DenyPermission>()
            .is_some_and(|other| self.inner.same_as(other.inner()))
    }
}

// -----------------------------------------------------------------------------
// Tests
