use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use crate::ForbiddenType;
use crate::info::Type;
use crate::registry::TypeRegistry;
use crate::security::{AnyTypePermission, NoTypePermission, Permission, TypePermission};

// -----------------------------------------------------------------------------
// PermissionRules

/// An ordered list of [`TypePermission`]s.
///
/// Rules are evaluated newest first and the first rule that does not abstain
/// decides. When every rule abstains the type is denied.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
/// use trellis_serial::security::{Permission, PermissionRules};
/// use trellis_serial::security::{DenyPermission, NoTypePermission, PrefixTypePermission};
///
/// let registry = TypeRegistry::empty();
/// let mut rules = PermissionRules::new();
/// rules.add(NoTypePermission);
/// rules.add(PrefixTypePermission::new(["app."]));
/// rules.add(DenyPermission::new(PrefixTypePermission::new(["app.internal."])));
///
/// let evaluate = |path: &'static str| rules.evaluate(&Type::from_static(path), &registry);
/// assert_eq!(evaluate("app.Order"), Permission::Allow);
/// assert_eq!(evaluate("app.internal.Secret"), Permission::Deny);
/// assert_eq!(evaluate("other.Thing"), Permission::Deny);
/// ```
#[derive(Debug, Default)]
pub struct PermissionRules {
    rules: Vec<Box<dyn TypePermission>>,
}

impl PermissionRules {
    /// Empty rules, which deny everything.
    #[inline]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule as the newest one.
    ///
    /// An equal rule already present is moved to the newest position.
    /// [`AnyTypePermission`] and [`NoTypePermission`] decide for every type,
    /// so adding one of them removes all older rules.
    pub fn add(&mut self, rule: impl TypePermission) {
        self.add_boxed(Box::new(rule));
    }

    /// See [`add`](Self::add).
    pub fn add_boxed(&mut self, rule: Box<dyn TypePermission>) {
        let any: &dyn Any = &*rule;
        if any.is::<AnyTypePermission>() || any.is::<NoTypePermission>() {
            self.rules.clear();
        } else {
            self.rules.retain(|old| !old.same_as(&*rule));
        }
        self.rules.push(rule);
    }

    pub fn evaluate(&self, ty: &Type, registry: &TypeRegistry) -> Permission {
        self.rules
            .iter()
            .rev()
            .map(|rule| rule.check(ty, registry))
            .find(|permission| *permission != Permission::Abstain)
            .unwrap_or(Permission::Deny)
    }

    /// Rules, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &dyn TypePermission> {
        self.rules.iter().map(|rule| &**rule)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// -----------------------------------------------------------------------------
// TypeGate

/// Decides which types may be instantiated from input.
///
/// The gate is consulted immediately before every instantiation. A denied
/// type aborts the whole read with a [`ForbiddenType`], it is never skipped.
#[derive(Debug)]
pub struct TypeGate {
    rules: PermissionRules,
    registry: Arc<TypeRegistry>,
}

impl TypeGate {
    #[inline]
    pub fn new(rules: PermissionRules, registry: Arc<TypeRegistry>) -> Self {
        Self { rules, registry }
    }

    /// Returns `true` if the type may be instantiated.
    ///
    /// An absent type is never allowed.
    pub fn allows(&self, ty: Option<&Type>) -> bool {
        match ty {
            Some(ty) => self.rules.evaluate(ty, &self.registry) == Permission::Allow,
            None => false,
        }
    }

    /// Like [`allows`](Self::allows), but reports the rejected type.
    pub fn check(&self, ty: &Type) -> Result<(), ForbiddenType> {
        if self.allows(Some(ty)) {
            Ok(())
        } else {
            log::warn!("type `{ty}` rejected by the type permissions");
            Err(ForbiddenType(ty.clone()))
        }
    }

    #[inline]
    pub fn rules(&self) -> &PermissionRules {
        &self.rules
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::{PermissionRules, TypeGate};
    use crate::info::Type;
    use crate::registry::TypeRegistry;
    use crate::security::*;

    fn gate(rules: PermissionRules) -> TypeGate {
        TypeGate::new(rules, Arc::new(TypeRegistry::new()))
    }

    #[test]
    fn zero_rules_deny_everything() {
        let gate = gate(PermissionRules::new());
        assert!(!gate.allows(None));
        assert!(!gate.allows(Some(&Type::of::<i32>())));
        assert!(!gate.allows(Some(&Type::from_static("demo.Item"))));
        assert!(gate.check(&Type::of::<String>()).is_err());
    }

    #[test]
    fn absent_type_is_denied_even_with_any() {
        let mut rules = PermissionRules::new();
        rules.add(AnyTypePermission);
        let gate = gate(rules);
        assert!(!gate.allows(None));
        assert!(gate.allows(Some(&Type::from_static("whatever.Type"))));
    }

    #[test]
    fn prefix_scenario() {
        let mut rules = PermissionRules::new();
        rules.add(PrefixTypePermission::new(["proxy."]));
        let gate = gate(rules);
        assert!(gate.allows(Some(&Type::from_static("proxy.Generated42"))));
        assert!(!gate.allows(Some(&Type::from_static("proxy2.Other"))));
        assert_eq!(
            gate.check(&Type::from_static("proxy2.Other")),
            Err(crate::ForbiddenType(Type::from_static("proxy2.Other")))
        );
    }

    #[test]
    fn newest_rule_wins() {
        let mut rules = PermissionRules::new();
        rules.add(DenyPermission::new(PrefixTypePermission::new(["app."])));
        rules.add(ExplicitTypePermission::new([Type::from_static("app.Order")]));
        let gate = gate(rules);
        assert!(gate.allows(Some(&Type::from_static("app.Order"))));
        assert!(!gate.allows(Some(&Type::from_static("app.Other"))));
    }

    #[test]
    fn any_and_no_reset_rules() {
        let mut rules = PermissionRules::new();
        rules.add(PrimitiveTypePermission);
        rules.add(ArrayTypePermission);
        rules.add(AnyTypePermission);
        assert_eq!(rules.len(), 1);

        rules.add(NoTypePermission);
        assert_eq!(rules.len(), 1);
        rules.add(PrimitiveTypePermission);
        assert_eq!(rules.len(), 2);

        let gate = gate(rules);
        assert!(gate.allows(Some(&Type::of::<u8>())));
        assert!(!gate.allows(Some(&Type::of::<Vec<u8>>())));
    }

    #[test]
    fn duplicates_move_to_newest() {
        let mut rules = PermissionRules::new();
        rules.add(PrefixTypePermission::new(["app."]));
        rules.add(DenyPermission::new(PrefixTypePermission::new(["app."])));
        rules.add(PrefixTypePermission::new(["app."]));
        assert_eq!(rules.len(), 2);

        let gate = gate(rules);
        assert!(gate.allows(Some(&Type::from_static("app.Order"))));
    }
}
