use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use trellis_tree::{TreeReader, TreeWriter};

use crate::ConversionError;
use crate::convert::Converter;
use crate::info::{FieldInfo, Type, TypeInfo, TypeKind};
use crate::mapper::{ImplicitCollectionMapping, MapperChain, SystemAttribute};
use crate::marshal::{MarshalContext, UnmarshalContext};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// StructConverter

/// The generic converter for registered structs.
///
/// Fields are written in declaration order. Fields with a single value
/// converter from the mapper chain become attributes, every other field a
/// child element named by the chain. Implicit collections write their
/// items directly below the struct.
///
/// Reading accepts children in any order. A child matching no field and no
/// implicit collection fails the read unless the chain ignores it.
#[derive(Debug, Clone)]
pub struct StructConverter {
    registry: Arc<TypeRegistry>,
}

impl StructConverter {
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

fn struct_info<'r>(registry: &'r TypeRegistry, ty: &Type) -> Result<&'r TypeInfo, ConversionError> {
    match registry.get(ty) {
        Some(info) if info.kind() == TypeKind::Struct => Ok(info),
        Some(_) => Err(ConversionError::NoConverter(ty.clone())),
        None => Err(ConversionError::UnregisteredType(ty.clone())),
    }
}

#[inline]
fn field_mismatch(field: &FieldInfo) -> ConversionError {
    ConversionError::mismatch(field.ty(), None)
}

impl Converter for StructConverter {
    fn can_convert(&self, ty: &Type) -> bool {
        struct_info(&self.registry, ty).is_ok()
    }

    fn marshal(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        context: &mut MarshalContext<'_>,
    ) -> Result<(), ConversionError> {
        let mapper = context.mapper();
        let ty = context.type_of(value)?;
        let info = struct_info(context.registry(), ty)?;

        // Attributes must precede every child node.
        let mut elements = Vec::with_capacity(info.fields().len());
        let mut attributes: Vec<String> = system_attributes(mapper).into_iter().map(String::from).collect();
        for field in info.fields() {
            if !mapper.should_serialize_member(ty, field.name()) {
                continue;
            }
            let field_value = field.get(value).ok_or_else(|| field_mismatch(field))?;
            match mapper.converter_from_item_type(field.ty(), Some((ty, field.name()))) {
                Some(converter) => {
                    let member = mapper.serialized_member(ty, field.name());
                    let name = mapper.alias_for_attribute(Some(ty), &member);
                    if attributes.iter().any(|used| *used == *name) {
                        return Err(ConversionError::AttributeInUse {
                            owner: ty.clone(),
                            attribute: name.into_owned(),
                        });
                    }
                    writer.add_attribute(&name, &converter.to_text(field_value)?)?;
                    attributes.push(name.into_owned());
                }
                None => elements.push((field, field_value)),
            }
        }

        for (field, field_value) in elements {
            if let Some(mapping) = mapper.implicit_collection_def_for_field_name(ty, field.name()) {
                write_implicit(mapping, field, field_value, writer, context)?;
                continue;
            }
            let name = mapper.serialized_member(ty, field.name());
            match mapper.local_converter(ty, field.name()) {
                Some(local) => context.write_node_with(&name, field_value, local, writer)?,
                None => context.write_node(&name, field_value, field.ty(), writer)?,
            }
        }
        Ok(())
    }

    fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        context: &mut UnmarshalContext<'_>,
    ) -> Result<Box<dyn Any>, ConversionError> {
        let ty = context.required_type()?.clone();
        let info = struct_info(context.registry(), &ty)?;
        let mut value = context.instantiate(&ty)?;

        read_attributes(&ty, info, &mut *value, reader, context)?;
        while reader.has_more_children() {
            reader.move_down()?;
            read_child(&ty, info, &mut *value, reader, context)?;
            reader.move_up()?;
        }
        Ok(value)
    }
}

/// Names of the enabled system attributes. Fields never use them.
fn system_attributes(mapper: &MapperChain) -> Vec<&str> {
    SystemAttribute::ALL
        .into_iter()
        .filter_map(|attribute| mapper.system_attribute(attribute))
        .collect()
}

// -----------------------------------------------------------------------------
// Writing

fn write_implicit(
    mapping: &ImplicitCollectionMapping,
    field: &FieldInfo,
    list: &dyn Any,
    writer: &mut dyn TreeWriter,
    context: &mut MarshalContext<'_>,
) -> Result<(), ConversionError> {
    let list_type = context.type_of(list)?;
    let items = context
        .registry()
        .get(list_type)
        .and_then(TypeInfo::list)
        .and_then(|access| access.items(list))
        .ok_or_else(|| ConversionError::mismatch(field.ty(), Some(list_type)))?;

    for item in items {
        match mapping.item_name() {
            Some(name) => context.write_node(name, item, mapping.item_type(), writer)?,
            None => context.write_item(item, writer)?,
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Reading

fn read_attributes(
    ty: &Type,
    info: &TypeInfo,
    value: &mut dyn Any,
    reader: &dyn TreeReader,
    context: &UnmarshalContext<'_>,
) -> Result<(), ConversionError> {
    let mapper = context.mapper();
    let system = system_attributes(mapper);

    for index in 0..reader.attribute_count() {
        let Some(alias) = reader.attribute_name(index) else {
            continue;
        };
        if system.contains(&alias) {
            continue;
        }
        let attribute = mapper.attribute_for_alias(Some(ty), alias);
        let member = mapper.real_member(ty, &attribute);
        // Unknown attributes are skipped.
        let Some(field) = info.field(&member) else {
            continue;
        };
        if !mapper.should_serialize_member(ty, field.name()) {
            continue;
        }
        let Some(converter) = mapper.converter_from_attribute(Some(ty), field.name(), field.ty()) else {
            continue;
        };
        let Some(text) = reader.attribute(alias) else {
            continue;
        };

        context.check_permission(field.ty())?;
        let field_value = converter.from_text(text, field.ty())?;
        field
            .set(value, field_value)
            .map_err(|_| field_mismatch(field))?;
    }
    Ok(())
}

fn read_child(
    ty: &Type,
    info: &TypeInfo,
    value: &mut dyn Any,
    reader: &mut dyn TreeReader,
    context: &mut UnmarshalContext<'_>,
) -> Result<(), ConversionError> {
    let mapper = context.mapper();
    let element = String::from(reader.node_name());
    let member = mapper.real_member(ty, &element);

    let field = info
        .field(&member)
        .filter(|field| mapper.implicit_collection_def_for_field_name(ty, field.name()).is_none());
    if let Some(field) = field {
        if !mapper.should_serialize_member(ty, field.name()) {
            return Ok(());
        }
        let field_value = match mapper.local_converter(ty, field.name()) {
            Some(local) => context.read_node_with(reader, field.ty(), local)?,
            None => context.read_node(reader, field.ty())?,
        };
        return field
            .set(value, field_value)
            .map_err(|_| field_mismatch(field));
    }

    let item_type = mapper
        .item_type_for_item_field_name(ty, &element)
        .or_else(|| mapper.real_class(&element));
    if let Some(field_name) = mapper.field_name_for_item_type_and_name(ty, item_type.as_ref(), Some(element.as_str())) {
        return read_implicit_item(ty, info, field_name, &element, value, reader, context);
    }

    if mapper.is_ignored_element(ty, &element) {
        log::trace!("ignoring element `{element}` of `{ty}`");
        return Ok(());
    }
    Err(ConversionError::UnknownField {
        owner: ty.clone(),
        element,
    })
}

fn read_implicit_item(
    ty: &Type,
    info: &TypeInfo,
    field_name: &str,
    element: &str,
    value: &mut dyn Any,
    reader: &mut dyn TreeReader,
    context: &mut UnmarshalContext<'_>,
) -> Result<(), ConversionError> {
    let unknown = || ConversionError::UnknownField {
        owner: ty.clone(),
        element: String::from(element),
    };
    let mapper = context.mapper();
    let field = info.field(field_name).ok_or_else(unknown)?;
    let mapping = mapper
        .implicit_collection_def_for_field_name(ty, field_name)
        .ok_or_else(unknown)?;

    let item = match mapping.item_name() {
        Some(name) if name == element => context.read_node(reader, mapping.item_type())?,
        _ => context.read_item(reader, mapping.item_type())?,
    };

    let access = context
        .registry()
        .get(field.ty())
        .and_then(TypeInfo::list)
        .ok_or_else(|| field_mismatch(field))?;
    let list = field.get_mut(value).ok_or_else(|| field_mismatch(field))?;
    access
        .push(list, item)
        .map_err(|_| ConversionError::mismatch(mapping.item_type(), None))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use super::StructConverter;
    use crate::convert::Converter;
    use crate::info::Type;
    use crate::registry::TypeRegistry;

    #[derive(Default)]
    struct Pair {
        left: u8,
        right: String,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        On,
    }

    crate::impl_typed! { struct Pair as "test.Pair" { left: u8, right: String } }
    crate::impl_typed! { enum Mode as "test.Mode" { On } }

    #[test]
    fn accepts_registered_structs_only() {
        let mut registry = TypeRegistry::new();
        registry.register::<Pair>();
        registry.register::<Mode>();
        let converter = StructConverter::new(Arc::new(registry));

        assert!(converter.can_convert(&Type::of::<Pair>()));
        assert!(!converter.can_convert(&Type::of::<Mode>()));
        assert!(!converter.can_convert(&Type::of::<String>()));
        assert!(!converter.can_convert(&Type::from_static("test.Missing")));
    }
}
