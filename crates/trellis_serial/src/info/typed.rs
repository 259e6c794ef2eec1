use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use crate::info::{ListAccess, Type, TypeInfo};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Typed

/// A Rust type with registered [`TypeInfo`].
///
/// Implemented for the primitives, `String`, `Vec<T>` and `Box<dyn Any>`.
/// Use [`impl_typed!`](crate::impl_typed) for your own types.
///
/// The `*_value` methods translate between a value held in a field or list
/// and the value seen by converters. They are the identity for every type
/// except `Box<dyn Any>`, whose contents are converted in its place.
pub trait Typed: Any + Sized {
    /// The descriptor of `Self`.
    fn ty() -> Type;

    fn type_info() -> TypeInfo;

    /// Registers the types `Self` is built from.
    fn register_dependencies(_registry: &mut TypeRegistry) {}

    #[inline]
    fn as_value(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_value_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn from_value(value: Box<dyn Any>) -> Result<Self, Box<dyn Any>> {
        value.downcast::<Self>().map(|value| *value)
    }
}

// -----------------------------------------------------------------------------
// Implementations

macro_rules! impl_primitive {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Typed for $ty {
                #[inline]
                fn ty() -> Type {
                    Type::from_static($name)
                }

                fn type_info() -> TypeInfo {
                    TypeInfo::primitive::<Self>()
                }
            }
        )*
    };
}

impl_primitive! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl Typed for String {
    #[inline]
    fn ty() -> Type {
        Type::from_static("string")
    }

    fn type_info() -> TypeInfo {
        TypeInfo::text::<Self>()
    }
}

impl<T: Typed> Typed for Vec<T> {
    #[inline]
    fn ty() -> Type {
        Type::array_of(T::ty())
    }

    fn type_info() -> TypeInfo {
        TypeInfo::array::<Self>(ListAccess::of_vec::<T>())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl Typed for Box<dyn Any> {
    #[inline]
    fn ty() -> Type {
        Type::ANY
    }

    fn type_info() -> TypeInfo {
        TypeInfo::abstract_type(Type::ANY)
    }

    #[inline]
    fn as_value(&self) -> &dyn Any {
        &**self
    }

    #[inline]
    fn as_value_mut(&mut self) -> &mut dyn Any {
        &mut **self
    }

    #[inline]
    fn from_value(value: Box<dyn Any>) -> Result<Self, Box<dyn Any>> {
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
