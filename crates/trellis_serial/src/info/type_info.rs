use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::info::{Type, Typed};

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `bool`, `char`, integers and floats.
    Primitive,
    /// `String`.
    Text,
    /// A struct with named fields, see [`FieldInfo`].
    Struct,
    /// An enum with unit variants, see [`VariantTable`].
    Enum,
    /// A list of items, see [`ListAccess`].
    Array,
    /// A type that is never instantiated itself, only through its subtypes.
    Abstract,
    /// A type handled entirely by a user converter.
    Opaque,
}

// -----------------------------------------------------------------------------
// FieldInfo

type FieldGet = fn(&dyn Any) -> Option<&dyn Any>;
type FieldGetMut = fn(&mut dyn Any) -> Option<&mut dyn Any>;
type FieldSet = fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Box<dyn Any>>;

/// A named field of a struct and its type-erased accessors.
///
/// The accessors receive the owning struct. They return `None` (or give the
/// value back) when the owner is not of the expected type.
#[derive(Clone)]
pub struct FieldInfo {
    name: &'static str,
    ty: Type,
    get: FieldGet,
    get_mut: FieldGetMut,
    set: FieldSet,
}

impl FieldInfo {
    pub const fn new(
        name: &'static str,
        ty: Type,
        get: FieldGet,
        get_mut: FieldGetMut,
        set: FieldSet,
    ) -> Self {
        Self {
            name,
            ty,
            get,
            get_mut,
            set,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type of the field.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(owner)
    }

    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.get_mut)(owner)
    }

    /// Replaces the field value, handing `value` back if it does not fit.
    #[inline]
    pub fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        (self.set)(owner, value)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// VariantTable

/// The unit variants of an enum, by name.
#[derive(Clone)]
pub struct VariantTable {
    names: &'static [&'static str],
    name_of: fn(&dyn Any) -> Option<&'static str>,
    from_name: fn(&str) -> Option<Box<dyn Any>>,
}

impl VariantTable {
    pub const fn new(
        names: &'static [&'static str],
        name_of: fn(&dyn Any) -> Option<&'static str>,
        from_name: fn(&str) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            names,
            name_of,
            from_name,
        }
    }

    /// Variant names in declaration order.
    #[inline]
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    #[inline]
    pub fn name_of(&self, value: &dyn Any) -> Option<&'static str> {
        (self.name_of)(value)
    }

    #[inline]
    pub fn from_name(&self, name: &str) -> Option<Box<dyn Any>> {
        (self.from_name)(name)
    }
}

impl fmt::Debug for VariantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VariantTable").field(&self.names).finish()
    }
}

// -----------------------------------------------------------------------------
// ListAccess

/// Type-erased access to an array-like value.
#[derive(Clone)]
pub struct ListAccess {
    new: fn() -> Box<dyn Any>,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    push: fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Box<dyn Any>>,
}

impl ListAccess {
    pub const fn new(
        new: fn() -> Box<dyn Any>,
        items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
        push: fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Box<dyn Any>>,
    ) -> Self {
        Self { new, items, push }
    }

    /// Accessors for `Vec<T>`.
    pub const fn of_vec<T: Typed>() -> Self {
        fn new<T: Typed>() -> Box<dyn Any> {
            Box::new(Vec::<T>::new())
        }

        fn items<T: Typed>(list: &dyn Any) -> Option<Vec<&dyn Any>> {
            let list = list.downcast_ref::<Vec<T>>()?;
            Some(list.iter().map(T::as_value).collect())
        }

        fn push<T: Typed>(list: &mut dyn Any, item: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
            let Some(list) = list.downcast_mut::<Vec<T>>() else {
                return Err(item);
            };
            list.push(T::from_value(item)?);
            Ok(())
        }

        Self::new(new::<T>, items::<T>, push::<T>)
    }

    /// Creates an empty list.
    #[inline]
    pub fn create(&self) -> Box<dyn Any> {
        (self.new)()
    }

    #[inline]
    pub fn items<'a>(&self, list: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.items)(list)
    }

    /// Appends `item`, handing it back if it does not fit.
    #[inline]
    pub fn push(&self, list: &mut dyn Any, item: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        (self.push)(list, item)
    }
}

impl fmt::Debug for ListAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListAccess").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Everything the engine knows about one registered type.
///
/// # Example
///
/// ```
/// use trellis_serial::info::{Type, TypeInfo, TypeKind};
///
/// let shape = TypeInfo::abstract_type(Type::from_static("demo.Shape"))
///     .with_supertype(Type::from_static("demo.Drawable"));
///
/// assert_eq!(shape.kind(), TypeKind::Abstract);
/// assert!(shape.type_id().is_none());
/// assert!(shape.construct().is_none());
/// assert_eq!(shape.supertypes(), &[Type::from_static("demo.Drawable")]);
/// ```
#[derive(Clone)]
pub struct TypeInfo {
    ty: Type,
    type_id: Option<TypeId>,
    kind: TypeKind,
    supertypes: Vec<Type>,
    constructor: Option<fn() -> Box<dyn Any>>,
    fields: Vec<FieldInfo>,
    variants: Option<VariantTable>,
    list: Option<ListAccess>,
}

fn construct_default<T: Default + Any>() -> Box<dyn Any> {
    Box::new(T::default())
}

impl TypeInfo {
    fn of<T: Typed>(kind: TypeKind) -> Self {
        Self {
            ty: T::ty(),
            type_id: Some(TypeId::of::<T>()),
            kind,
            supertypes: Vec::new(),
            constructor: None,
            fields: Vec::new(),
            variants: None,
            list: None,
        }
    }

    pub fn primitive<T: Typed>() -> Self {
        Self::of::<T>(TypeKind::Primitive)
    }

    pub fn text<T: Typed + Default>() -> Self {
        Self::of::<T>(TypeKind::Text).with_constructor(construct_default::<T>)
    }

    /// A struct built from its default value, then field by field.
    pub fn structure<T: Typed + Default>(fields: Vec<FieldInfo>) -> Self {
        Self {
            fields,
            ..Self::of::<T>(TypeKind::Struct).with_constructor(construct_default::<T>)
        }
    }

    pub fn enumeration<T: Typed>(variants: VariantTable) -> Self {
        Self {
            variants: Some(variants),
            ..Self::of::<T>(TypeKind::Enum)
        }
    }

    pub fn array<T: Typed>(list: ListAccess) -> Self {
        let constructor = list.new;
        Self {
            list: Some(list),
            ..Self::of::<T>(TypeKind::Array).with_constructor(constructor)
        }
    }

    pub fn opaque<T: Typed>() -> Self {
        Self::of::<T>(TypeKind::Opaque)
    }

    /// A type without a Rust representation of its own.
    pub fn abstract_type(ty: Type) -> Self {
        Self {
            ty,
            type_id: None,
            kind: TypeKind::Abstract,
            supertypes: Vec::new(),
            constructor: None,
            fields: Vec::new(),
            variants: None,
            list: None,
        }
    }

    /// Declares a direct supertype.
    pub fn with_supertype(mut self, supertype: Type) -> Self {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    pub fn with_constructor(mut self, constructor: fn() -> Box<dyn Any>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The [`TypeId`] of the Rust type, `None` for abstract types.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Direct supertypes, see [`TypeRegistry::supertypes_of`](crate::registry::TypeRegistry::supertypes_of).
    #[inline]
    pub fn supertypes(&self) -> &[Type] {
        &self.supertypes
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[inline]
    pub fn variants(&self) -> Option<&VariantTable> {
        self.variants.as_ref()
    }

    #[inline]
    pub fn list(&self) -> Option<&ListAccess> {
        self.list.as_ref()
    }

    /// Returns `true` if [`construct`](Self::construct) yields a value.
    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// A new default instance.
    pub fn construct(&self) -> Option<Box<dyn Any>> {
        self.constructor.map(|constructor| constructor())
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("ty", &self.ty)
            .field("kind", &self.kind)
            .field("supertypes", &self.supertypes)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
