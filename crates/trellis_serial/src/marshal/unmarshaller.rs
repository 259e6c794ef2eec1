use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use trellis_tree::TreeReader;

use crate::ConversionError;
use crate::convert::{Converter, ConverterLookup};
use crate::info::Type;
use crate::mapper::{MapperChain, SystemAttribute};
use crate::marshal::{DataHolder, NodePath};
use crate::registry::TypeRegistry;
use crate::security::TypeGate;

// -----------------------------------------------------------------------------
// UnmarshalContext

/// State threaded through the converters while reading one value.
///
/// Every type named by the input passes the [`TypeGate`] before a converter
/// or constructor runs for it. A denied type fails the whole read with
/// [`ConversionError::Forbidden`].
pub struct UnmarshalContext<'a> {
    mapper: &'a MapperChain,
    converters: &'a ConverterLookup,
    gate: &'a TypeGate,
    data: &'a mut DataHolder,
    required: Vec<Type>,
    path: NodePath,
    max_depth: usize,
}

impl<'a> UnmarshalContext<'a> {
    pub fn new(
        mapper: &'a MapperChain,
        converters: &'a ConverterLookup,
        gate: &'a TypeGate,
        data: &'a mut DataHolder,
    ) -> Self {
        Self {
            mapper,
            converters,
            gate,
            data,
            required: Vec::new(),
            path: NodePath::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Nesting depth accepted unless configured otherwise.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Fails reads of trees nested deeper than `max_depth` nodes with
    /// [`ConversionError::TooDeep`].
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn mapper(&self) -> &'a MapperChain {
        self.mapper
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.mapper.registry()
    }

    #[inline]
    pub fn converters(&self) -> &'a ConverterLookup {
        self.converters
    }

    #[inline]
    pub fn gate(&self) -> &'a TypeGate {
        self.gate
    }

    #[inline]
    pub fn data(&self) -> &DataHolder {
        &*self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut DataHolder {
        &mut *self.data
    }

    /// The type the running converter has to produce.
    pub fn required_type(&self) -> Result<&Type, ConversionError> {
        self.required.last().ok_or(ConversionError::MissingRequiredType)
    }

    #[inline]
    pub fn check_permission(&self, ty: &Type) -> Result<(), ConversionError> {
        self.gate.check(ty)?;
        Ok(())
    }

    /// A default instance of `ty`, after asking the gate.
    pub fn instantiate(&self, ty: &Type) -> Result<Box<dyn Any>, ConversionError> {
        self.check_permission(ty)?;
        let info = self
            .registry()
            .get(ty)
            .ok_or_else(|| ConversionError::UnregisteredType(ty.clone()))?;
        info.construct()
            .ok_or_else(|| ConversionError::NotInstantiable(ty.clone()))
    }

    /// The type of the current node, which sits in a slot of type `declared`.
    ///
    /// The `class` system attribute wins, otherwise the default
    /// implementation of `declared` is used.
    pub fn resolve_type(&self, reader: &dyn TreeReader, declared: &Type) -> Result<Type, ConversionError> {
        match self.class_attribute(reader) {
            Some(name) => self.real_class(name),
            None => Ok(self.mapper.default_implementation_of(declared)),
        }
    }

    /// The type of the current node, named by the `class` system attribute
    /// or by the node itself.
    pub fn resolve_item_type(&self, reader: &dyn TreeReader) -> Result<Type, ConversionError> {
        let name = self
            .class_attribute(reader)
            .unwrap_or_else(|| reader.node_name());
        self.real_class(name)
    }

    fn class_attribute<'r>(&self, reader: &'r dyn TreeReader) -> Option<&'r str> {
        let class = self.mapper.system_attribute(SystemAttribute::Class)?;
        reader.attribute(class)
    }

    fn real_class(&self, name: &str) -> Result<Type, ConversionError> {
        self.mapper
            .real_class(name)
            .ok_or_else(|| ConversionError::UnknownElement(String::from(name)))
    }

    /// Reads the current node as a value of type `ty`.
    pub fn convert_another(&mut self, reader: &mut dyn TreeReader, ty: &Type) -> Result<Box<dyn Any>, ConversionError> {
        self.check_permission(ty)?;
        let converter = self.converters.lookup(ty)?;
        self.convert_with(reader, ty, converter)
    }

    /// Reads the current node as a value of type `ty` with `converter`.
    ///
    /// The produced value must be assignable to `ty`.
    pub fn convert_with(
        &mut self,
        reader: &mut dyn TreeReader,
        ty: &Type,
        converter: &dyn Converter,
    ) -> Result<Box<dyn Any>, ConversionError> {
        self.required.push(ty.clone());
        let result = converter.unmarshal(reader, self);
        self.required.pop();

        let value = result?;
        let registry = self.registry();
        match registry.type_of_value(&*value) {
            Some(actual) if registry.is_assignable(actual, ty) => Ok(value),
            actual => Err(ConversionError::mismatch(ty, actual)),
        }
    }

    /// Reads the current node, held in a slot of type `declared`.
    pub fn read_node(&mut self, reader: &mut dyn TreeReader, declared: &Type) -> Result<Box<dyn Any>, ConversionError> {
        self.in_node(reader, |context, reader| {
            let ty = context.resolve_type(reader, declared)?;
            context.check_assignable(&ty, declared)?;
            context.convert_another(reader, &ty)
        })
    }

    /// Reads the current node with `converter`, held in a slot of type `declared`.
    pub fn read_node_with(
        &mut self,
        reader: &mut dyn TreeReader,
        declared: &Type,
        converter: &dyn Converter,
    ) -> Result<Box<dyn Any>, ConversionError> {
        self.in_node(reader, |context, reader| {
            let ty = context.resolve_type(reader, declared)?;
            context.check_assignable(&ty, declared)?;
            context.convert_with(reader, &ty, converter)
        })
    }

    /// Reads the current node, named after its type, as an item of type `element`.
    pub fn read_item(&mut self, reader: &mut dyn TreeReader, element: &Type) -> Result<Box<dyn Any>, ConversionError> {
        self.in_node(reader, |context, reader| {
            let ty = context.resolve_item_type(reader)?;
            context.check_assignable(&ty, element)?;
            context.convert_another(reader, &ty)
        })
    }

    /// Reads the root node, whatever its type.
    pub(crate) fn read_root(&mut self, reader: &mut dyn TreeReader) -> Result<Box<dyn Any>, ConversionError> {
        self.in_node(reader, |context, reader| {
            let ty = context.resolve_item_type(reader)?;
            context.convert_another(reader, &ty)
        })
    }

    /// Fails for types outside of their slot. The gate is asked first, so a
    /// forbidden type is reported as such.
    fn check_assignable(&self, ty: &Type, declared: &Type) -> Result<(), ConversionError> {
        self.check_permission(ty)?;
        if self.registry().is_assignable(ty, declared) {
            Ok(())
        } else {
            Err(ConversionError::mismatch(declared, Some(ty)))
        }
    }

    fn in_node(
        &mut self,
        reader: &mut dyn TreeReader,
        body: impl FnOnce(&mut Self, &mut dyn TreeReader) -> Result<Box<dyn Any>, ConversionError>,
    ) -> Result<Box<dyn Any>, ConversionError> {
        if self.path.depth() >= self.max_depth {
            return Err(self.path.locate(ConversionError::TooDeep(self.max_depth)));
        }
        self.path.push(reader.node_name());
        let result = body(self, reader).map_err(|error| self.path.locate(error));
        self.path.pop();
        result
    }
}
