use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use trellis_utils::hash::{HashMap, HashSet};

use crate::convert::{Converter, ConverterLookup, EnumConverter, SingleValueConverter};
use crate::info::{Type, TypeKind};
use crate::mapper::{Mapper, Next};
use crate::registry::TypeRegistry;

/// The [`AttributeMapper`] further down the chain, if any.
#[inline]
fn attribute_stage<'a>(next: &Next<'a>) -> Option<&'a AttributeMapper> {
    next.lookup_stage::<AttributeMapper>()
}

fn writes_attribute(next: &Next<'_>, field: Option<&str>, ty: &Type, owner: Option<&Type>) -> bool {
    attribute_stage(next).is_some_and(|stage| stage.should_look_for_single_value_converter(field, ty, owner))
}

// -----------------------------------------------------------------------------
// AttributeMapper

/// Fields and types written as attributes instead of child elements.
///
/// A classified value is only written as an attribute if a
/// [`SingleValueConverter`] exists for its type, otherwise it stays an
/// element.
pub struct AttributeMapper {
    converters: Arc<ConverterLookup>,
    fields: HashMap<Type, HashSet<String>>,
    types: HashSet<Type>,
}

impl AttributeMapper {
    pub fn new(converters: Arc<ConverterLookup>) -> Self {
        Self {
            converters,
            fields: HashMap::default(),
            types: HashSet::default(),
        }
    }

    /// Writes the field `field` of `owner` as an attribute.
    pub fn add_attribute_for(&mut self, owner: Type, field: impl Into<String>) {
        self.fields.entry(owner).or_default().insert(field.into());
    }

    /// Writes every field holding a `ty` as an attribute.
    pub fn add_attribute_type(&mut self, ty: Type) {
        self.types.insert(ty);
    }

    /// Returns `true` if a value of `ty`, held by `field` of `owner`, is
    /// classified as an attribute.
    pub fn should_look_for_single_value_converter(
        &self,
        field: Option<&str>,
        ty: &Type,
        owner: Option<&Type>,
    ) -> bool {
        if self.types.contains(ty) {
            return true;
        }
        match (owner, field) {
            (Some(owner), Some(field)) => self
                .fields
                .get(owner)
                .is_some_and(|fields| fields.contains(field)),
            _ => false,
        }
    }

    fn single_value(&self, ty: &Type) -> Option<&dyn SingleValueConverter> {
        self.converters.lookup(ty).ok()?.as_single_value()
    }
}

impl Mapper for AttributeMapper {
    fn converter_from_item_type<'a>(
        &'a self,
        ty: &Type,
        member: Option<(&Type, &str)>,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        let (owner, field) = member.unzip();
        if self.should_look_for_single_value_converter(field, ty, owner)
            && let Some(converter) = self.single_value(ty)
        {
            return Some(converter);
        }
        next.converter_from_item_type(ty, member)
    }

    fn converter_from_attribute<'a>(
        &'a self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        if self.should_look_for_single_value_converter(Some(attribute), ty, owner)
            && let Some(converter) = self.single_value(ty)
        {
            return Some(converter);
        }
        next.converter_from_attribute(owner, attribute, ty)
    }
}

impl fmt::Debug for AttributeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeMapper")
            .field("fields", &self.fields)
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// LocalConversionMapper

/// Converters bound to a single field of a single type.
///
/// A local converter is used for its field before anything the
/// [`ConverterLookup`] would pick. If the field is also classified as an
/// attribute and the converter handles single values, it writes the
/// attribute too.
#[derive(Default)]
pub struct LocalConversionMapper {
    locals: HashMap<Type, HashMap<String, Arc<dyn Converter>>>,
}

impl LocalConversionMapper {
    pub fn register_local_converter(&mut self, owner: Type, field: impl Into<String>, converter: Arc<dyn Converter>) {
        self.locals
            .entry(owner)
            .or_default()
            .insert(field.into(), converter);
    }

    fn local(&self, owner: &Type, field: &str) -> Option<&dyn Converter> {
        let converter = self.locals.get(owner)?.get(field)?;
        Some(&**converter)
    }

    fn local_single_value<'a>(
        &'a self,
        owner: &Type,
        field: &str,
        ty: &Type,
        next: &Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        let local = self.local(owner, field)?;
        if writes_attribute(next, Some(field), ty, Some(owner)) {
            local.as_single_value()
        } else {
            None
        }
    }
}

impl Mapper for LocalConversionMapper {
    fn local_converter<'a>(&'a self, owner: &Type, field: &str, next: Next<'a>) -> Option<&'a dyn Converter> {
        self.local(owner, field)
            .or_else(|| next.local_converter(owner, field))
    }

    fn converter_from_item_type<'a>(
        &'a self,
        ty: &Type,
        member: Option<(&Type, &str)>,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        if let Some((owner, field)) = member
            && let Some(converter) = self.local_single_value(owner, field, ty, &next)
        {
            return Some(converter);
        }
        next.converter_from_item_type(ty, member)
    }

    fn converter_from_attribute<'a>(
        &'a self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        if let Some(owner) = owner
            && let Some(converter) = self.local_single_value(owner, attribute, ty, &next)
        {
            return Some(converter);
        }
        next.converter_from_attribute(owner, attribute, ty)
    }
}

impl fmt::Debug for LocalConversionMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (owner, fields) in &self.locals {
            for (field, converter) in fields {
                map.entry(&(owner, field), &converter.name());
            }
        }
        map.finish()
    }
}

// -----------------------------------------------------------------------------
// EnumMapper

/// Enums are immutable values and may be written as attributes.
#[derive(Debug)]
pub struct EnumMapper {
    converter: EnumConverter,
}

impl EnumMapper {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            converter: EnumConverter::new(registry),
        }
    }

    fn is_enum(ty: &Type, next: &Next<'_>) -> bool {
        next.registry()
            .get(ty)
            .is_some_and(|info| info.kind() == TypeKind::Enum)
    }
}

impl Mapper for EnumMapper {
    fn is_immutable_value_type(&self, ty: &Type, next: Next<'_>) -> bool {
        Self::is_enum(ty, &next) || next.is_immutable_value_type(ty)
    }

    fn converter_from_item_type<'a>(
        &'a self,
        ty: &Type,
        member: Option<(&Type, &str)>,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        let found = next.converter_from_item_type(ty, member);
        if found.is_some() || !Self::is_enum(ty, &next) {
            return found;
        }
        let (owner, field) = member.unzip();
        if writes_attribute(&next, field, ty, owner) {
            Some(&self.converter)
        } else {
            None
        }
    }

    fn converter_from_attribute<'a>(
        &'a self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
        next: Next<'a>,
    ) -> Option<&'a dyn SingleValueConverter> {
        let found = next.converter_from_attribute(owner, attribute, ty);
        if found.is_some() || !Self::is_enum(ty, &next) {
            return found;
        }
        if writes_attribute(&next, Some(attribute), ty, owner) {
            Some(&self.converter)
        } else {
            None
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
