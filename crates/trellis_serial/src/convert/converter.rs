use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;

use trellis_tree::{TreeReader, TreeWriter};

use crate::ConversionError;
use crate::info::Type;
use crate::marshal::{MarshalContext, UnmarshalContext};

// -----------------------------------------------------------------------------
// Converter

/// Converts one value to one tree node and back.
///
/// When [`marshal`](Converter::marshal) is called, the node of the value
/// has already been started, and it is ended by the caller. The converter
/// writes the attributes, text and children of that node. Likewise
/// [`unmarshal`](Converter::unmarshal) is called with the reader positioned
/// on the node and must leave it there.
///
/// Converters are stateless with respect to a single call: anything needed
/// while converting lives in the context.
///
/// # Example
///
/// ```
/// use std::any::Any;
///
/// use trellis_serial::ConversionError;
/// use trellis_serial::convert::Converter;
/// use trellis_serial::info::Type;
/// use trellis_serial::marshal::{MarshalContext, UnmarshalContext};
/// use trellis_serial::tree::{TreeReader, TreeWriter};
///
/// /// A pair of numbers written as `<first>`, `<second>` children.
/// struct PairConverter;
///
/// impl Converter for PairConverter {
///     fn can_convert(&self, ty: &Type) -> bool {
///         ty.path() == Some("demo.Pair")
///     }
///
///     fn marshal(
///         &self,
///         value: &dyn Any,
///         writer: &mut dyn TreeWriter,
///         context: &mut MarshalContext<'_>,
///     ) -> Result<(), ConversionError> {
///         let &(first, second) = value
///             .downcast_ref::<(i64, i64)>()
///             .ok_or(ConversionError::UnregisteredValue)?;
///         context.write_node("first", &first, &Type::of::<i64>(), writer)?;
///         context.write_node("second", &second, &Type::of::<i64>(), writer)
///     }
///
///     fn unmarshal(
///         &self,
///         reader: &mut dyn TreeReader,
///         context: &mut UnmarshalContext<'_>,
///     ) -> Result<Box<dyn Any>, ConversionError> {
///         let mut pair = [0_i64; 2];
///         for slot in &mut pair {
///             reader.move_down()?;
///             let value = context.read_node(reader, &Type::of::<i64>())?;
///             *slot = *value.downcast::<i64>().map_err(|_| ConversionError::UnregisteredValue)?;
///             reader.move_up()?;
///         }
///         Ok(Box::new((pair[0], pair[1])))
///     }
/// }
/// ```
pub trait Converter: Any + Send + Sync {
    /// Returns `true` if values of type `ty` are handled.
    fn can_convert(&self, ty: &Type) -> bool;

    /// Writes `value` into the open node.
    fn marshal(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        context: &mut MarshalContext<'_>,
    ) -> Result<(), ConversionError>;

    /// Reads a value of [`UnmarshalContext::required_type`] from the current node.
    fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        context: &mut UnmarshalContext<'_>,
    ) -> Result<Box<dyn Any>, ConversionError>;

    /// The single value form of this converter, if it has one.
    ///
    /// Only converters returning `Some` may write attributes.
    #[inline]
    fn as_single_value(&self) -> Option<&dyn SingleValueConverter> {
        None
    }

    /// A name used in logs.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// -----------------------------------------------------------------------------
// SingleValueConverter

/// Converts one value to a text and back.
///
/// The text is used for attribute values and, through a
/// [`SingleValueConverterWrapper`], for the text of a node.
pub trait SingleValueConverter: Send + Sync {
    fn can_convert(&self, ty: &Type) -> bool;

    fn to_text(&self, value: &dyn Any) -> Result<String, ConversionError>;

    /// Parses `text` as a value of type `ty`.
    fn from_text(&self, text: &str, ty: &Type) -> Result<Box<dyn Any>, ConversionError>;
}

// -----------------------------------------------------------------------------
// SingleValueConverterWrapper

/// A [`Converter`] writing a single value as the text of its node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleValueConverterWrapper<C> {
    inner: C,
}

impl<C: SingleValueConverter> SingleValueConverterWrapper<C> {
    #[inline]
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: SingleValueConverter + 'static> Converter for SingleValueConverterWrapper<C> {
    #[inline]
    fn can_convert(&self, ty: &Type) -> bool {
        self.inner.can_convert(ty)
    }

    fn marshal(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        _context: &mut MarshalContext<'_>,
    ) -> Result<(), ConversionError> {
        let text = self.inner.to_text(value)?;
        writer.write_text(&text)?;
        Ok(())
    }

    fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        context: &mut UnmarshalContext<'_>,
    ) -> Result<Box<dyn Any>, ConversionError> {
        let ty = context.required_type()?;
        self.inner.from_text(reader.text(), ty)
    }

    #[inline]
    fn as_single_value(&self) -> Option<&dyn SingleValueConverter> {
        Some(&self.inner)
    }

    fn name(&self) -> &'static str {
        core::any::type_name::<C>()
    }
}
