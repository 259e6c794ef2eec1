use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::Any;

use crate::convert::{Converter, SingleValueConverter};
use crate::info::Type;
use crate::mapper::{DefaultMapper, ImplicitCollectionMapping, SystemAttribute};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Mapper

/// One stage of the [`MapperChain`](crate::mapper::MapperChain).
///
/// Every query receives the [`Next`] part of the chain. A stage answers the
/// queries it has an override for and hands everything else on, which is
/// what the provided implementations do.
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
///
/// use trellis_serial::info::Type;
/// use trellis_serial::mapper::{Mapper, MapperChain, Next};
/// use trellis_serial::registry::TypeRegistry;
///
/// /// Writes every member in upper case.
/// struct Shouting;
///
/// impl Mapper for Shouting {
///     fn serialized_member<'a>(&'a self, _: &Type, member: &'a str, _: Next<'a>) -> Cow<'a, str> {
///         Cow::Owned(member.to_uppercase())
///     }
///
///     fn real_member<'a>(&'a self, _: &Type, name: &'a str, _: Next<'a>) -> Cow<'a, str> {
///         Cow::Owned(name.to_lowercase())
///     }
/// }
///
/// let mut chain = MapperChain::new(TypeRegistry::new().into());
/// chain.wrap(Shouting);
///
/// let owner = Type::from_static("demo.Item");
/// assert_eq!(chain.serialized_member(&owner, "price"), "PRICE");
/// assert_eq!(chain.real_member(&owner, "PRICE"), "price");
/// assert_eq!(chain.serialized_class(&owner), "demo.Item");
/// ```
pub trait Mapper: Any + Send + Sync {
    /// The element name of a type.
    fn serialized_class<'a>(&'a self, ty: &Type, next: Next<'a>) -> Cow<'a, str> {
        next.serialized_class(ty)
    }

    /// The type named by an element, `None` if the name is unknown.
    fn real_class(&self, name: &str, next: Next<'_>) -> Option<Type> {
        next.real_class(name)
    }

    fn serialized_member<'a>(&'a self, owner: &Type, member: &'a str, next: Next<'a>) -> Cow<'a, str> {
        next.serialized_member(owner, member)
    }

    fn real_member<'a>(&'a self, owner: &Type, name: &'a str, next: Next<'a>) -> Cow<'a, str> {
        next.real_member(owner, name)
    }

    /// The alias of an attribute, `scope` `None` meaning every type.
    fn alias_for_attribute<'a>(
        &'a self,
        scope: Option<&Type>,
        attribute: &'a str,
        next: Next<'a>,
    ) -> Cow<'a, str> {
        next.alias_for_attribute(scope, attribute)
    }

    fn attribute_for_alias<'a>(
        &'a self,
        scope: Option<&Type>,
        alias: &'a str,
        next: Next<'a>,
    ) -> Cow<'a, str> {
        next.attribute_for_alias(scope, alias)
    }

    /// The name of a system attribute, `None` if it is not written.
    fn system_attribute<'a>(&'a self, attribute: SystemAttribute, next: Next<'a>) -> Option<&'a str> {
        next.system_attribute(attribute)
    }

    fn is_immutable_value_type(&self, ty: &Type, next: Next<'_>) -> bool {
        next.is_immutable_value_type(ty)
    }

    /// The type instantiated for a declared type.
    fn default_implementation_of(&self, ty: &Type, next: Next<'_>) -> Type {
        next.default_implementation_of(ty)
    }

    /// The implicit collection field of `owner` receiving items of
    /// `item_type`, or items written as `item_name`.
    fn field_name_for_item_type_and_name<'a>(
        &'a self,
        owner: &Type,
        item_type: Option<&Type>,
        item_name: Option<&str>,
        next: Next<'a>,
    ) -> Option<&'a str> {
        next.field_name_for_item_type_and_name(owner, item_type, item_name)
    }

    fn item_type_for_item_field_name(&self, owner: &Type, item_name: &str, next: Next<'_>) -> Option<Type> {
        next.item_type_for_item_field_name(owner, item_name)
    }

    fn implicit_collection_def_for_field_name<'a>(
        &'a self,
        owner: &Type,
        field: &str,
        next: Next<'a>,
    ) -> Option<&'a ImplicitCollectionMapping> {
        next.implicit_collection_def_for_field_name(owner, field)
    }

    /// `false` for members left out of the tree.
    fn should_serialize_member(&self, owner: &Type, member: &str, next: Next<'_>) -> bool {
        next.should_serialize_member(owner, member)
    }

    /// `true` for unknown elements skipped while reading.
    fn is_ignored_element(&self, owner: &Type, element: &str, next: Next<'_>) -> bool {
        next.is_ignored_element(owner, element)
    }

    /// The single value converter for a value of type `ty`, optionally held
    /// by the field `member` of its owner.
    fn converter_from_item_type<'a>(
        &'a self,
        ty: &Type,
        member: Option<(&Type, &str)>,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        next.converter_from_item_type(ty, member)
    }

    /// The single value converter for the attribute `attribute` of type `ty`.
    fn converter_from_attribute<'a>(
        &'a self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        next.converter_from_attribute(owner, attribute, ty)
    }

    /// A converter bound to one field, checked before any other.
    fn local_converter<'a>(&'a self, owner: &Type, field: &str, next: Next<'a>) -> Option<&'a dyn Converter> {
        next.local_converter(owner, field)
    }
}

// -----------------------------------------------------------------------------
// Next

/// The rest of a [`MapperChain`](crate::mapper::MapperChain), ending in its
/// [`DefaultMapper`].
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Box<dyn Mapper>],
    terminal: &'a DefaultMapper,
}

macro_rules! forward {
    ($next:ident . $method:ident ( $($arg:expr),* )) => {
        match $next.rest.split_first() {
            Some((stage, rest)) => stage.$method(
                $($arg,)*
                Next {
                    rest,
                    terminal: $next.terminal,
                },
            ),
            None => $next.terminal.$method($($arg),*),
        }
    };
}

impl<'a> Next<'a> {
    #[inline]
    pub(crate) const fn new(rest: &'a [Box<dyn Mapper>], terminal: &'a DefaultMapper) -> Self {
        Self { rest, terminal }
    }

    /// The registry of the chain.
    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.terminal.registry()
    }

    /// Finds the first remaining stage of type `M`.
    pub fn lookup_stage<M: Mapper>(&self) -> Option<&'a M> {
        self.rest.iter().find_map(|stage| {
            let stage: &'a dyn Any = &**stage;
            stage.downcast_ref::<M>()
        })
    }

    pub fn serialized_class(self, ty: &Type) -> Cow<'a, str> {
        forward!(self.serialized_class(ty))
    }

    pub fn real_class(self, name: &str) -> Option<Type> {
        forward!(self.real_class(name))
    }

    pub fn serialized_member(self, owner: &Type, member: &'a str) -> Cow<'a, str> {
        forward!(self.serialized_member(owner, member))
    }

    pub fn real_member(self, owner: &Type, name: &'a str) -> Cow<'a, str> {
        forward!(self.real_member(owner, name))
    }

    pub fn alias_for_attribute(self, scope: Option<&Type>, attribute: &'a str) -> Cow<'a, str> {
        forward!(self.alias_for_attribute(scope, attribute))
    }

    pub fn attribute_for_alias(self, scope: Option<&Type>, alias: &'a str) -> Cow<'a, str> {
        forward!(self.attribute_for_alias(scope, alias))
    }

    pub fn system_attribute(self, attribute: SystemAttribute) -> Option<&'a str> {
        forward!(self.system_attribute(attribute))
    }

    pub fn is_immutable_value_type(self, ty: &Type) -> bool {
        forward!(self.is_immutable_value_type(ty))
    }

    pub fn default_implementation_of(self, ty: &Type) -> Type {
        forward!(self.default_implementation_of(ty))
    }

    pub fn field_name_for_item_type_and_name(
        self,
        owner: &Type,
        item_type: Option<&Type>,
        item_name: Option<&str>,
    ) -> Option<&'a str> {
        forward!(self.field_name_for_item_type_and_name(owner, item_type, item_name))
    }

    pub fn item_type_for_item_field_name(self, owner: &Type, item_name: &str) -> Option<Type> {
        forward!(self.item_type_for_item_field_name(owner, item_name))
    }

    pub fn implicit_collection_def_for_field_name(
        self,
        owner: &Type,
        field: &str,
    ) -> Option<&'a ImplicitCollectionMapping> {
        forward!(self.implicit_collection_def_for_field_name(owner, field))
    }

    pub fn should_serialize_member(self, owner: &Type, member: &str) -> bool {
        forward!(self.should_serialize_member(owner, member))
    }

    pub fn is_ignored_element(self, owner: &Type, element: &str) -> bool {
        forward!(self.is_ignored_element(owner, element))
    }

    pub fn converter_from_item_type(
        self,
        ty: &Type,
        member: Option<(&Type, &str)>,
    ) -> Option<&'a dyn SingleValueConverter> {
        forward!(self.converter_from_item_type(ty, member))
    }

    pub fn converter_from_attribute(
        self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
    ) -> Option<&'a dyn SingleValueConverter> {
        forward!(self.converter_from_attribute(owner, attribute, ty))
    }

    pub fn local_converter(self, owner: &Type, field: &str) -> Option<&'a dyn Converter> {
        forward!(self.local_converter(owner, field))
    }
}
