use alloc::borrow::Cow;
use alloc::string::String;

use trellis_utils::hash::HashMap;

use crate::info::Type;
use crate::mapper::{Mapper, Next, SystemAttribute};
use crate::registry::TypeRegistry;

/// Two-way alias table scoped by owner type.
type ScopedTable = HashMap<Type, HashMap<String, String>>;

fn insert_scoped(table: &mut ScopedTable, owner: Type, key: String, value: String) {
    table.entry(owner).or_default().insert(key, value);
}

/// Looks `key` up for `owner`, then for its supertypes.
fn lookup_scoped<'a>(
    table: &'a ScopedTable,
    owner: &Type,
    key: &str,
    registry: &TypeRegistry,
) -> Option<&'a str> {
    if table.is_empty() {
        return None;
    }
    if let Some(value) = table.get(owner).and_then(|names| names.get(key)) {
        return Some(value);
    }
    registry
        .supertypes_of(owner)
        .iter()
        .find_map(|supertype| table.get(supertype).and_then(|names| names.get(key)))
        .map(String::as_str)
}

// -----------------------------------------------------------------------------
// ClassAliasingMapper

/// Element names for types.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::mapper::{ClassAliasingMapper, MapperChain};
/// use trellis_serial::registry::TypeRegistry;
///
/// let mut aliases = ClassAliasingMapper::default();
/// aliases.add_class_alias("text", Type::of::<String>());
///
/// let mut chain = MapperChain::new(TypeRegistry::new().into());
/// chain.push(aliases);
///
/// assert_eq!(chain.serialized_class(&Type::of::<String>()), "text");
/// assert_eq!(chain.real_class("text"), Some(Type::of::<String>()));
/// // The natural name still resolves.
/// assert_eq!(chain.real_class("string"), Some(Type::of::<String>()));
/// ```
#[derive(Debug, Default)]
pub struct ClassAliasingMapper {
    class_to_name: HashMap<Type, String>,
    name_to_class: HashMap<String, Type>,
}

impl ClassAliasingMapper {
    /// Names `ty` as `name`, replacing older aliases of either.
    pub fn add_class_alias(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        if let Some(previous) = self.class_to_name.insert(ty.clone(), name.clone()) {
            self.name_to_class.remove(&previous);
        }
        if let Some(previous) = self.name_to_class.insert(name, ty.clone())
            && previous != ty
        {
            self.class_to_name.remove(&previous);
        }
    }

    pub fn alias_of(&self, ty: &Type) -> Option<&str> {
        self.class_to_name.get(ty).map(String::as_str)
    }
}

impl Mapper for ClassAliasingMapper {
    fn serialized_class<'a>(&'a self, ty: &Type, next: Next<'a>) -> Cow<'a, str> {
        match self.class_to_name.get(ty) {
            Some(name) => Cow::Borrowed(name),
            None => next.serialized_class(ty),
        }
    }

    fn real_class(&self, name: &str, next: Next<'_>) -> Option<Type> {
        match self.name_to_class.get(name) {
            Some(ty) => Some(ty.clone()),
            None => next.real_class(name),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldAliasingMapper

/// Element names for members, per owner type.
///
/// An alias declared for a type also applies to its subtypes.
#[derive(Debug, Default)]
pub struct FieldAliasingMapper {
    aliases: ScopedTable,
    members: ScopedTable,
}

impl FieldAliasingMapper {
    pub fn add_field_alias(&mut self, alias: impl Into<String>, owner: Type, member: impl Into<String>) {
        let alias = alias.into();
        let member = member.into();
        insert_scoped(&mut self.aliases, owner.clone(), member.clone(), alias.clone());
        insert_scoped(&mut self.members, owner, alias, member);
    }
}

impl Mapper for FieldAliasingMapper {
    fn serialized_member<'a>(&'a self, owner: &Type, member: &'a str, next: Next<'a>) -> Cow<'a, str> {
        match lookup_scoped(&self.aliases, owner, member, next.registry()) {
            Some(alias) => Cow::Borrowed(alias),
            None => next.serialized_member(owner, member),
        }
    }

    fn real_member<'a>(&'a self, owner: &Type, name: &'a str, next: Next<'a>) -> Cow<'a, str> {
        match lookup_scoped(&self.members, owner, name, next.registry()) {
            Some(member) => Cow::Borrowed(member),
            None => next.real_member(owner, name),
        }
    }
}

// -----------------------------------------------------------------------------
// AttributeAliasingMapper

/// Names of attributes, globally or for one owner type.
///
/// An alias for the owner wins over a global one.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::mapper::{AttributeAliasingMapper, MapperChain};
/// use trellis_serial::registry::TypeRegistry;
///
/// let order = Type::from_static("shop.Order");
/// let mut aliases = AttributeAliasingMapper::default();
/// aliases.add_alias("id", None, "identifier");
/// aliases.add_alias("oid", Some(order.clone()), "identifier");
///
/// let mut chain = MapperChain::new(TypeRegistry::new().into());
/// chain.push(aliases);
///
/// assert_eq!(chain.alias_for_attribute(None, "identifier"), "id");
/// assert_eq!(chain.alias_for_attribute(Some(&order), "identifier"), "oid");
/// assert_eq!(chain.attribute_for_alias(Some(&order), "oid"), "identifier");
/// assert_eq!(chain.attribute_for_alias(None, "other"), "other");
/// ```
#[derive(Debug, Default)]
pub struct AttributeAliasingMapper {
    global_aliases: HashMap<String, String>,
    global_attributes: HashMap<String, String>,
    scoped_aliases: ScopedTable,
    scoped_attributes: ScopedTable,
}

impl AttributeAliasingMapper {
    /// Writes `attribute` as `alias`, for `scope` or for every type.
    pub fn add_alias(&mut self, alias: impl Into<String>, scope: Option<Type>, attribute: impl Into<String>) {
        let alias = alias.into();
        let attribute = attribute.into();
        match scope {
            Some(owner) => {
                insert_scoped(&mut self.scoped_aliases, owner.clone(), attribute.clone(), alias.clone());
                insert_scoped(&mut self.scoped_attributes, owner, alias, attribute);
            }
            None => {
                self.global_aliases.insert(attribute.clone(), alias.clone());
                self.global_attributes.insert(alias, attribute);
            }
        }
    }
}

impl Mapper for AttributeAliasingMapper {
    fn alias_for_attribute<'a>(
        &'a self,
        scope: Option<&Type>,
        attribute: &'a str,
        next: Next<'a>,
    ) -> Cow<'a, str> {
        let scoped = scope.and_then(|owner| lookup_scoped(&self.scoped_aliases, owner, attribute, next.registry()));
        match scoped.or_else(|| self.global_aliases.get(attribute).map(String::as_str)) {
            Some(alias) => Cow::Borrowed(alias),
            None => next.alias_for_attribute(scope, attribute),
        }
    }

    fn attribute_for_alias<'a>(
        &'a self,
        scope: Option<&Type>,
        alias: &'a str,
        next: Next<'a>,
    ) -> Cow<'a, str> {
        let scoped = scope.and_then(|owner| lookup_scoped(&self.scoped_attributes, owner, alias, next.registry()));
        match scoped.or_else(|| self.global_attributes.get(alias).map(String::as_str)) {
            Some(attribute) => Cow::Borrowed(attribute),
            None => next.attribute_for_alias(scope, alias),
        }
    }
}

// -----------------------------------------------------------------------------
// SystemAttributeAliasingMapper

/// Renames or disables [`SystemAttribute`]s.
#[derive(Debug, Default)]
pub struct SystemAttributeAliasingMapper {
    names: HashMap<SystemAttribute, Option<String>>,
}

impl SystemAttributeAliasingMapper {
    /// Writes `attribute` as `name`.
    pub fn alias(&mut self, attribute: SystemAttribute, name: impl Into<String>) {
        self.names.insert(attribute, Some(name.into()));
    }

    /// Stops writing `attribute`.
    pub fn disable(&mut self, attribute: SystemAttribute) {
        self.names.insert(attribute, None);
    }
}

impl Mapper for SystemAttributeAliasingMapper {
    fn system_attribute<'a>(&'a self, attribute: SystemAttribute, next: Next<'a>) -> Option<&'a str> {
        match self.names.get(&attribute) {
            Some(name) => name.as_deref(),
            None => next.system_attribute(attribute),
        }
    }
}

// -----------------------------------------------------------------------------
// ArrayMapper

const ARRAY_SUFFIX: &str = "-array";

/// Names arrays after their element, `u8[][]` becomes `u8-array-array`.
///
/// An alias registered for the array type itself takes precedence.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::mapper::{ArrayMapper, MapperChain};
/// use trellis_serial::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Vec<Vec<u8>>>();
///
/// let mut chain = MapperChain::new(registry.into());
/// chain.push(ArrayMapper);
///
/// let bytes = Type::of::<Vec<Vec<u8>>>();
/// assert_eq!(chain.serialized_class(&bytes), "u8-array-array");
/// assert_eq!(chain.real_class("u8-array-array"), Some(bytes));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayMapper;

impl Mapper for ArrayMapper {
    fn serialized_class<'a>(&'a self, ty: &Type, next: Next<'a>) -> Cow<'a, str> {
        let mut ty = ty;
        let mut depth = 0;
        let name = loop {
            let name = next.serialized_class(ty);
            match ty.element() {
                Some(element) if name == ty.name() => {
                    ty = element;
                    depth += 1;
                }
                _ => break name,
            }
        };
        if depth == 0 {
            return name;
        }

        let mut name = name.into_owned();
        for _ in 0..depth {
            name.push_str(ARRAY_SUFFIX);
        }
        Cow::Owned(name)
    }

    fn real_class(&self, name: &str, next: Next<'_>) -> Option<Type> {
        let mut base = name;
        let mut depth = 0;
        while let Some(element) = base.strip_suffix(ARRAY_SUFFIX) {
            base = element;
            depth += 1;
        }
        if depth == 0 {
            return next.real_class(name);
        }

        match next.real_class(base) {
            Some(mut ty) => {
                for _ in 0..depth {
                    ty = Type::array_of(ty);
                }
                Some(ty)
            }
            None => next.real_class(name),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::*;
    use crate::mapper::MapperChain;

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Derived {
        id: u32,
    }

    crate::impl_typed! { struct Base as "test.Base" { id: u32 } }
    crate::impl_typed! { struct Derived as "test.Derived": "test.Base" { id: u32 } }

    fn chain() -> MapperChain {
        let mut registry = TypeRegistry::new();
        registry.register::<Base>();
        registry.register::<Derived>();
        registry.register::<alloc::vec::Vec<Base>>();
        MapperChain::new(Arc::new(registry))
    }

    #[test]
    fn class_alias_round_trip() {
        let mut aliases = ClassAliasingMapper::default();
        aliases.add_class_alias("base", Type::of::<Base>());
        aliases.add_class_alias("root", Type::of::<Base>());

        let mut chain = chain();
        chain.push(ArrayMapper);
        chain.push(aliases);

        let base = Type::of::<Base>();
        assert_eq!(chain.serialized_class(&base), "root");
        assert_eq!(chain.real_class("root"), Some(base.clone()));
        assert_eq!(chain.real_class("base"), None);

        let bases = Type::array_of(base);
        assert_eq!(chain.serialized_class(&bases), "root-array");
        assert_eq!(chain.real_class("root-array"), Some(bases));
        assert_eq!(chain.real_class("unknown-array"), None);
    }

    #[test]
    fn field_alias_applies_to_subtypes() {
        let mut aliases = FieldAliasingMapper::default();
        aliases.add_field_alias("key", Type::of::<Base>(), "id");

        let mut chain = chain();
        chain.push(aliases);

        let derived = Type::of::<Derived>();
        assert_eq!(chain.serialized_member(&derived, "id"), "key");
        assert_eq!(chain.real_member(&derived, "key"), "id");
        assert_eq!(chain.serialized_member(&Type::of::<String>(), "id"), "id");
        assert_eq!(Base::default().id + Derived::default().id, 0);
    }

    #[test]
    fn system_attributes() {
        let mut names = SystemAttributeAliasingMapper::default();
        names.alias(SystemAttribute::Class, "kind");
        names.disable(SystemAttribute::ResolvesTo);

        let mut chain = chain();
        assert_eq!(chain.system_attribute(SystemAttribute::Class), Some("class"));
        chain.push(names);
        assert_eq!(chain.system_attribute(SystemAttribute::Class), Some("kind"));
        assert_eq!(chain.system_attribute(SystemAttribute::ResolvesTo), None);
        assert_eq!(chain.system_attribute(SystemAttribute::EnumType), Some("enum-type"));
    }
}
