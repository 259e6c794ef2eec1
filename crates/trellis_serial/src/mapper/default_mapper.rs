use alloc::borrow::Cow;
use alloc::sync::Arc;

use crate::convert::{Converter, SingleValueConverter};
use crate::info::{Type, TypeKind};
use crate::mapper::{ImplicitCollectionMapping, SystemAttribute};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// DefaultMapper

/// The end of every [`MapperChain`](crate::mapper::MapperChain).
///
/// It never delegates: types and members keep their natural names, names
/// resolve through the [`TypeRegistry`] and every override query answers
/// "no mapping".
#[derive(Debug, Clone)]
pub struct DefaultMapper {
    registry: Arc<TypeRegistry>,
}

impl DefaultMapper {
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn serialized_class<'a>(&'a self, ty: &Type) -> Cow<'a, str> {
        ty.name()
    }

    pub fn real_class(&self, name: &str) -> Option<Type> {
        self.registry.resolve_name(name)
    }

    pub fn serialized_member<'a>(&'a self, _owner: &Type, member: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(member)
    }

    pub fn real_member<'a>(&'a self, _owner: &Type, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    pub fn alias_for_attribute<'a>(&'a self, _scope: Option<&Type>, attribute: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(attribute)
    }

    pub fn attribute_for_alias<'a>(&'a self, _scope: Option<&Type>, alias: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(alias)
    }

    pub fn system_attribute(&self, attribute: SystemAttribute) -> Option<&'static str> {
        Some(attribute.default_name())
    }

    pub fn is_immutable_value_type(&self, ty: &Type) -> bool {
        matches!(
            self.registry.get(ty).map(|info| info.kind()),
            Some(TypeKind::Primitive | TypeKind::Text)
        )
    }

    pub fn default_implementation_of(&self, ty: &Type) -> Type {
        ty.clone()
    }

    pub fn field_name_for_item_type_and_name<'a>(
        &'a self,
        _owner: &Type,
        _item_type: Option<&Type>,
        _item_name: Option<&str>,
    ) -> Option<&'a str> {
        None
    }

    pub fn item_type_for_item_field_name(&self, _owner: &Type, _item_name: &str) -> Option<Type> {
        None
    }

    pub fn implicit_collection_def_for_field_name<'a>(
        &'a self,
        _owner: &Type,
        _field: &str,
    ) -> Option<&'a ImplicitCollectionMapping> {
        None
    }

    pub fn should_serialize_member(&self, _owner: &Type, _member: &str) -> bool {
        true
    }

    pub fn is_ignored_element(&self, _owner: &Type, _element: &str) -> bool {
        false
    }

    pub fn converter_from_item_type<'a>(
        &'a self,
        _ty: &Type,
        _member: Option<(&Type, &str)>,
    ) -> Option<&'a dyn SingleValueConverter> {
        None
    }

    pub fn converter_from_attribute<'a>(
        &'a self,
        _owner: Option<&Type>,
        _attribute: &str,
        _ty: &Type,
    ) -> Option<&'a dyn SingleValueConverter> {
        None
    }

    pub fn local_converter<'a>(&'a self, _owner: &Type, _field: &str) -> Option<&'a dyn Converter> {
        None
    }
}
