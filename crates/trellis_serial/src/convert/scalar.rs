use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

use trellis_tree::{TreeReader, TreeWriter};

use crate::ConversionError;
use crate::convert::{Converter, SingleValueConverter};
use crate::info::{Type, TypeKind, Typed, VariantTable};
use crate::marshal::{MarshalContext, UnmarshalContext};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// FromStrConverter

/// Converts a `T` through its `Display` and `FromStr` implementations.
///
/// Bundled for the primitives and `String`.
///
/// ```
/// use trellis_serial::convert::{FromStrConverter, SingleValueConverter};
/// use trellis_serial::info::Type;
///
/// let converter = FromStrConverter::<f64>::new();
/// assert_eq!(converter.to_text(&2.5_f64).unwrap(), "2.5");
///
/// let value = converter.from_text("-0.125", &Type::of::<f64>()).unwrap();
/// assert_eq!(value.downcast_ref::<f64>(), Some(&-0.125));
/// assert!(converter.from_text("x", &Type::of::<f64>()).is_err());
/// ```
pub struct FromStrConverter<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> FromStrConverter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self { marker: PhantomData }
    }
}

impl<T> Default for FromStrConverter<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FromStrConverter<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FromStrConverter<T> {}

impl<T> fmt::Debug for FromStrConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(core::any::type_name::<Self>())
    }
}

impl<T: Typed + FromStr + fmt::Display> SingleValueConverter for FromStrConverter<T> {
    #[inline]
    fn can_convert(&self, ty: &Type) -> bool {
        *ty == T::ty()
    }

    fn to_text(&self, value: &dyn Any) -> Result<String, ConversionError> {
        value
            .downcast_ref::<T>()
            .map(ToString::to_string)
            .ok_or_else(|| ConversionError::mismatch(&T::ty(), None))
    }

    fn from_text(&self, text: &str, _ty: &Type) -> Result<Box<dyn Any>, ConversionError> {
        match text.parse::<T>() {
            Ok(value) => Ok(Box::new(value)),
            Err(_) => Err(ConversionError::InvalidText {
                ty: T::ty(),
                text: String::from(text),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// CharArrayConverter

/// Writes a `Vec<char>` as the text of one node instead of one child per
/// character.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharArrayConverter;

impl CharArrayConverter {
    fn handles(ty: &Type) -> bool {
        *ty == <Vec<char>>::ty()
    }
}

impl SingleValueConverter for CharArrayConverter {
    #[inline]
    fn can_convert(&self, ty: &Type) -> bool {
        Self::handles(ty)
    }

    fn to_text(&self, value: &dyn Any) -> Result<String, ConversionError> {
        let chars = value
            .downcast_ref::<Vec<char>>()
            .ok_or_else(|| ConversionError::mismatch(&<Vec<char>>::ty(), None))?;
        Ok(chars.iter().collect())
    }

    fn from_text(&self, text: &str, _ty: &Type) -> Result<Box<dyn Any>, ConversionError> {
        Ok(Box::new(text.chars().collect::<Vec<char>>()))
    }
}

impl Converter for CharArrayConverter {
    #[inline]
    fn can_convert(&self, ty: &Type) -> bool {
        Self::handles(ty)
    }

    fn marshal(
        &self,
        value: &dyn Any,
        writer: &mut dyn TreeWriter,
        _context: &mut MarshalContext<'_>,
    ) -> Result<(), ConversionError> {
        writer.write_text(&self.to_text(value)?)?;
        Ok(())
    }

    fn unmarshal(
        &self,
        reader: &mut dyn TreeReader,
        context: &mut UnmarshalContext<'_>,
    ) -> Result<Box<dyn Any>, ConversionError> {
        self.from_text(reader.text(), context.required_type()?)
    }

    #[inline]
    fn as_single_value(&self) -> Option<&dyn SingleValueConverter> {
        Some(self)
    }
}

// -----------------------------------------------------------------------------
// EnumConverter

/// Writes a unit enum variant by its name.
#[derive(Debug, Clone)]
pub struct EnumConverter {
    registry: Arc<TypeRegistry>,
}

impl EnumConverter {
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    fn variants(&self, ty: &Type) -> Result<&VariantTable, ConversionError> {
        let info = self
            .registry
            .get(ty)
            .ok_or_else(|| ConversionError::UnregisteredType(ty.clone()))?;
        info.variants()
            .ok_or_else(|| ConversionError::NoConverter(ty.clone()))
    }
}

impl SingleValueConverter for EnumConverter {
    fn can_convert(&self, ty: &Type) -> bool {
        self.registry
            .get(ty)
            .is_some_and(|info| info.kind() == TypeKind::Enum)
    }

    fn to_text(&self, value: &dyn Any) -> Result<String, ConversionError> {
        let ty = self
            .registry
            .type_of_value(value)
            .ok_or(ConversionError::UnregisteredValue)?;
        self.variants(ty)?
            .name_of(value)
            .map(String::from)
            .ok_or_else(|| ConversionError::mismatch(ty, None))
    }

    fn from_text(&self, text: &str, ty: &Type) -> Result<Box<dyn Any>, ConversionError> {
        self.variants(ty)?
            .from_name(text)
            .ok_or_else(|| ConversionError::InvalidText {
                ty: ty.clone(),
                text: String::from(text),
            })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::tree::{Node, NodeReader, NodeWriter};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light {
        Red,
        Green,
    }

    crate::impl_typed! { enum Light as "test.Light" { Red, Green } }

    fn text_of(converter: &dyn SingleValueConverter, value: &dyn Any) -> String {
        converter.to_text(value).unwrap()
    }

    #[test]
    fn primitives_and_strings() {
        assert_eq!(text_of(&FromStrConverter::<i32>::new(), &-42_i32), "-42");
        assert_eq!(text_of(&FromStrConverter::<bool>::new(), &true), "true");
        assert_eq!(text_of(&FromStrConverter::<char>::new(), &'<'), "<");
        assert_eq!(text_of(&FromStrConverter::<String>::new(), &String::from("a&b")), "a&b");

        let converter = FromStrConverter::<u8>::new();
        assert!(converter.can_convert(&Type::of::<u8>()));
        assert!(!converter.can_convert(&Type::of::<i8>()));
        assert!(converter.to_text(&1_i8).is_err());
        assert!(matches!(
            converter.from_text("256", &Type::of::<u8>()),
            Err(ConversionError::InvalidText { .. })
        ));
    }

    #[test]
    fn char_array_text() {
        let converter = CharArrayConverter;
        assert_eq!(text_of(&converter, &vec!['a', 'b', 'c']), "abc");
        assert_eq!(text_of(&converter, &Vec::<char>::new()), "");

        let back = converter.from_text("abc", &Type::of::<Vec<char>>()).unwrap();
        assert_eq!(back.downcast_ref::<Vec<char>>(), Some(&vec!['a', 'b', 'c']));
        let empty = converter.from_text("", &Type::of::<Vec<char>>()).unwrap();
        assert_eq!(empty.downcast_ref::<Vec<char>>(), Some(&Vec::new()));
    }

    #[test]
    fn char_array_keeps_markup_characters() {
        let chars: Vec<char> = "<a & \"b\">".chars().collect();
        let mut writer = NodeWriter::new();
        writer.start_node("chars").unwrap();
        writer
            .write_text(&CharArrayConverter.to_text(&chars).unwrap())
            .unwrap();
        writer.end_node().unwrap();
        let node: Node = writer.into_node().unwrap();

        let reader = NodeReader::new(&node);
        let back = CharArrayConverter
            .from_text(reader.text(), &Type::of::<Vec<char>>())
            .unwrap();
        assert_eq!(back.downcast_ref::<Vec<char>>(), Some(&chars));
    }

    #[test]
    fn enum_variants_by_name() {
        let mut registry = TypeRegistry::new();
        registry.register::<Light>();
        let converter = EnumConverter::new(Arc::new(registry));
        let light = Type::of::<Light>();

        assert!(SingleValueConverter::can_convert(&converter, &light));
        assert!(!SingleValueConverter::can_convert(&converter, &Type::of::<i32>()));
        assert_eq!(text_of(&converter, &Light::Green), "Green");

        let back = converter.from_text("Red", &light).unwrap();
        assert_eq!(back.downcast_ref::<Light>(), Some(&Light::Red));
        assert!(matches!(
            converter.from_text("Blue", &light),
            Err(ConversionError::InvalidText { .. })
        ));
        assert!(matches!(converter.to_text(&7_u64), Err(ConversionError::NoConverter(_))));
    }
}
