use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use core::fmt;

use crate::info::Typed;

// -----------------------------------------------------------------------------
// Type

/// Opaque, structurally comparable identifier of a runtime type.
///
/// A `Type` is either a *named* type, identified by its type path, or an
/// *array* of another `Type`. Two descriptors are equal exactly when they
/// describe the same type, and `T[]` is always distinct from `T`.
///
/// The natural name of a named type is its path, the natural name of an array
/// is the element name followed by `[]`.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
///
/// let chars = Type::of::<Vec<char>>();
/// assert!(chars.is_array());
/// assert_eq!(chars.element(), Some(&Type::of::<char>()));
/// assert_eq!(chars.to_string(), "char[]");
///
/// assert_eq!(Type::named(String::from("demo.Item")), Type::from_static("demo.Item"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Type(Repr);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Repr {
    Named(Cow<'static, str>),
    Array(Box<Type>),
}

impl Type {
    /// The universal type of a `Box<dyn Any>` slot.
    ///
    /// Every type is assignable to it, the concrete type of a value stored in
    /// such a slot is always written to the tree.
    pub const ANY: Type = Type::from_static("any");

    /// A named type with a static path.
    #[inline]
    pub const fn from_static(path: &'static str) -> Self {
        Self(Repr::Named(Cow::Borrowed(path)))
    }

    /// A named type.
    #[inline]
    pub fn named(path: impl Into<Cow<'static, str>>) -> Self {
        Self(Repr::Named(path.into()))
    }

    /// An array of `element`.
    #[inline]
    pub fn array_of(element: Type) -> Self {
        Self(Repr::Array(Box::new(element)))
    }

    /// The descriptor of a declared Rust type.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        T::ty()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.0, Repr::Array(_))
    }

    /// The element type of an array.
    #[inline]
    pub fn element(&self) -> Option<&Type> {
        match &self.0 {
            Repr::Array(element) => Some(element),
            Repr::Named(_) => None,
        }
    }

    /// The innermost non-array type and the number of array levels around it.
    pub fn innermost(&self) -> (&Type, usize) {
        let mut ty = self;
        let mut depth = 0;
        while let Some(element) = ty.element() {
            ty = element;
            depth += 1;
        }
        (ty, depth)
    }

    /// The type path of a named type.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        match &self.0 {
            Repr::Named(path) => Some(&**path),
            Repr::Array(_) => None,
        }
    }

    /// The natural name: the path, or `<element>[]` for arrays.
    pub fn name(&self) -> Cow<'static, str> {
        match &self.0 {
            Repr::Named(Cow::Borrowed(path)) => Cow::Borrowed(*path),
            Repr::Named(Cow::Owned(path)) => Cow::Owned(path.clone()),
            Repr::Array(element) => Cow::Owned(format!("{element}[]")),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Named(path) => f.write_str(path),
            Repr::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

// -----------------------------------------------------------------------------
// Tests
