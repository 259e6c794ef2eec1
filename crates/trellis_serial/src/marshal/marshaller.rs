use core::any::Any;

use trellis_tree::TreeWriter;

use crate::ConversionError;
use crate::convert::{Converter, ConverterLookup};
use crate::info::Type;
use crate::mapper::{MapperChain, SystemAttribute};
use crate::marshal::{DataHolder, NodePath};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// MarshalContext

/// State threaded through the converters while writing one value.
///
/// Converters write nested values through [`write_node`](Self::write_node)
/// and [`write_item`](Self::write_item), which open the child node, pick
/// the converter and record where a failure happened.
pub struct MarshalContext<'a> {
    mapper: &'a MapperChain,
    converters: &'a ConverterLookup,
    data: &'a mut DataHolder,
    path: NodePath,
}

impl<'a> MarshalContext<'a> {
    pub fn new(mapper: &'a MapperChain, converters: &'a ConverterLookup, data: &'a mut DataHolder) -> Self {
        Self {
            mapper,
            converters,
            data,
            path: NodePath::default(),
        }
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
    pub fn data(&self) -> &DataHolder {
        &*self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut DataHolder {
        &mut *self.data
    }

    /// The registered runtime type of `value`.
    pub fn type_of(&self, value: &dyn Any) -> Result<&'a Type, ConversionError> {
        self.registry()
            .type_of_value(value)
            .ok_or(ConversionError::UnregisteredValue)
    }

    /// Writes `value` into the open node with the converter of its type.
    pub fn convert_another(&mut self, value: &dyn Any, writer: &mut dyn TreeWriter) -> Result<(), ConversionError> {
        let ty = self.type_of(value)?;
        let converter = self.converters.lookup(ty)?;
        self.convert_with(value, converter, writer)
    }

    /// Like [`convert_another`](Self::convert_another) for a value held in a
    /// slot of type `declared`.
    ///
    /// Unless the runtime type is the one a reader instantiates for the
    /// declared type, it is written to the `class` system attribute, so this
    /// must be called before anything else is written into the node.
    pub fn convert_another_as(
        &mut self,
        value: &dyn Any,
        declared: &Type,
        writer: &mut dyn TreeWriter,
    ) -> Result<(), ConversionError> {
        let mapper = self.mapper;
        let actual = self.type_of(value)?;
        if *actual != mapper.default_implementation_of(declared)
            && let Some(class) = mapper.system_attribute(SystemAttribute::Class)
        {
            writer.add_attribute(class, &mapper.serialized_class(actual))?;
        }
        self.convert_another(value, writer)
    }

    /// Writes `value` into the open node with `converter`.
    #[inline]
    pub fn convert_with(
        &mut self,
        value: &dyn Any,
        converter: &dyn Converter,
        writer: &mut dyn TreeWriter,
    ) -> Result<(), ConversionError> {
        converter.marshal(value, writer, self)
    }

    /// Writes `value` as a child node `name` of the open node.
    pub fn write_node(
        &mut self,
        name: &str,
        value: &dyn Any,
        declared: &Type,
        writer: &mut dyn TreeWriter,
    ) -> Result<(), ConversionError> {
        self.in_node(name, writer, |context, writer| {
            context.convert_another_as(value, declared, writer)
        })
    }

    /// Writes `value` as a child node `name` with `converter`.
    pub fn write_node_with(
        &mut self,
        name: &str,
        value: &dyn Any,
        converter: &dyn Converter,
        writer: &mut dyn TreeWriter,
    ) -> Result<(), ConversionError> {
        self.in_node(name, writer, |context, writer| {
            context.convert_with(value, converter, writer)
        })
    }

    /// Writes `value` as a child node named after its runtime type.
    pub fn write_item(&mut self, value: &dyn Any, writer: &mut dyn TreeWriter) -> Result<(), ConversionError> {
        let mapper = self.mapper;
        let ty = self.type_of(value)?;
        let name = mapper.serialized_class(ty);
        self.in_node(&name, writer, |context, writer| context.convert_another(value, writer))
    }

    /// Writes `value` as the root node.
    #[inline]
    pub(crate) fn write_root(&mut self, value: &dyn Any, writer: &mut dyn TreeWriter) -> Result<(), ConversionError> {
        self.write_item(value, writer)
    }

    fn in_node(
        &mut self,
        name: &str,
        writer: &mut dyn TreeWriter,
        body: impl FnOnce(&mut Self, &mut dyn TreeWriter) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        self.path.push(name);
        let result = writer
            .start_node(name)
            .map_err(ConversionError::from)
            .and_then(|()| body(self, writer))
            .and_then(|()| writer.end_node().map_err(ConversionError::from))
            .map_err(|error| self.path.locate(error));
        self.path.pop();
        result
    }
}
