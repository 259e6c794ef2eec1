use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use trellis_utils::TypeIdMap;
use trellis_utils::hash::{FixedHashState, HashMap};

use crate::info::{Type, TypeInfo, Typed};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of [`TypeInfo`].
///
/// Registered types can be looked up by descriptor, by type path, by
/// [`TypeId`] or by a value. The registry is filled while a
/// [`TrellisBuilder`](crate::TrellisBuilder) is configured and is read-only
/// afterwards.
///
/// # Example
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// assert!(registry.contains(&Type::of::<String>()));
///
/// registry.register::<Vec<Vec<char>>>();
/// assert_eq!(registry.resolve_name("char[]"), Some(Type::of::<Vec<char>>()));
/// assert_eq!(registry.resolve_name("char[][][]"), None);
///
/// let value = 3_u8;
/// assert_eq!(registry.type_of_value(&value), Some(&Type::of::<u8>()));
/// ```
pub struct TypeRegistry {
    infos: HashMap<Type, TypeInfo>,
    paths: HashMap<Cow<'static, str>, Type>,
    type_ids: TypeIdMap<Type>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.infos.keys()).finish()
    }
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            infos: HashMap::with_hasher(FixedHashState),
            paths: HashMap::with_hasher(FixedHashState),
            type_ids: TypeIdMap::new(),
        }
    }

    /// Create a type registry with the primitives and `String` registered.
    ///
    /// - `bool` `char`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `String`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<u128>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<i128>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry
    }

    fn insert(&mut self, info: TypeInfo) -> bool {
        let ty = info.ty().clone();
        log::debug!("register type `{ty}` ({:?})", info.kind());

        if let Some(path) = ty.path() {
            self.paths.insert(Cow::Owned(String::from(path)), ty.clone());
        }
        if let Some(type_id) = info.type_id() {
            self.type_ids.insert(type_id, ty.clone());
        }
        self.infos.insert(ty, info).is_none()
    }

    /// Registers `T` if it has not been registered yet.
    ///
    /// This also registers the types `T` depends on, as specified by
    /// [`Typed::register_dependencies`]. Returns `false` if `T` was already
    /// present, in which case neither it nor its dependencies are touched.
    pub fn register<T: Typed>(&mut self) -> bool {
        if self.infos.contains_key(&T::ty()) {
            return false;
        }
        self.insert(T::type_info());
        T::register_dependencies(self);
        true
    }

    /// Inserts hand-built type information, replacing an existing entry.
    ///
    /// Returns `true` if the type was not registered before.
    pub fn register_info(&mut self, info: TypeInfo) -> bool {
        self.insert(info)
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register).
    ///
    /// Returns `false` when the `auto_register` feature is disabled. Repeated
    /// calls do not insert duplicates.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        for registration in inventory::iter::<crate::registry::AutoRegistration> {
            registration.apply(self);
        }
        cfg!(feature = "auto_register")
    }

    #[inline]
    pub fn contains(&self, ty: &Type) -> bool {
        self.infos.contains_key(ty)
    }

    #[inline]
    pub fn get(&self, ty: &Type) -> Option<&TypeInfo> {
        self.infos.get(ty)
    }

    /// Returns the named type registered under `path`.
    pub fn get_with_path(&self, path: &str) -> Option<&TypeInfo> {
        self.paths.get(path).and_then(|ty| self.get(ty))
    }

    /// Resolves a natural name, `[]` suffixes included, to a registered type.
    pub fn resolve_name(&self, name: &str) -> Option<Type> {
        let mut base = name;
        let mut depth = 0;
        while let Some(element) = base.strip_suffix("[]") {
            base = element;
            depth += 1;
        }

        let mut ty = self.paths.get(base)?.clone();
        for _ in 0..depth {
            ty = Type::array_of(ty);
        }
        self.contains(&ty).then_some(ty)
    }

    #[inline]
    pub fn type_of_id(&self, type_id: TypeId) -> Option<&Type> {
        self.type_ids.get(&type_id)
    }

    /// The registered type of a runtime value.
    #[inline]
    pub fn type_of_value(&self, value: &dyn Any) -> Option<&Type> {
        self.type_of_id(value.type_id())
    }

    /// All supertypes of `ty`, nearest first.
    pub fn supertypes_of(&self, ty: &Type) -> Vec<Type> {
        let mut found: Vec<Type> = Vec::new();
        let mut next = 0;
        if let Some(info) = self.get(ty) {
            found.extend(info.supertypes().iter().cloned());
        }
        while next < found.len() {
            let Some(info) = self.infos.get(&found[next]) else {
                next += 1;
                continue;
            };
            next += 1;
            for supertype in info.supertypes() {
                if supertype != ty && !found.contains(supertype) {
                    found.push(supertype.clone());
                }
            }
        }
        found
    }

    /// Returns `true` if a value of type `from` may stand where `to` is declared.
    ///
    /// Every type is assignable to itself and to [`Type::ANY`], arrays are
    /// assignable when their elements are.
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        if from == to || *to == Type::ANY {
            return true;
        }
        if let (Some(from), Some(to)) = (from.element(), to.element()) {
            return self.is_assignable(from, to);
        }
        self.supertypes_of(from).contains(to)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.infos.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::TypeRegistry;
    use crate::info::{Type, TypeInfo, TypeKind};

    #[derive(Default)]
    struct Circle {
        radius: f64,
    }

    #[derive(Default)]
    struct Canvas {
        circles: Vec<Circle>,
        title: alloc::string::String,
    }

    struct Shape;

    crate::impl_typed! { abstract Shape as "test.Shape": "test.Drawable" }
    crate::impl_typed! { struct Circle as "test.Circle": "test.Shape" { radius: f64 } }
    crate::impl_typed! { struct Canvas as "test.Canvas" { circles: Vec<Circle>, title: alloc::string::String } }

    #[test]
    fn registers_dependencies() {
        let mut registry = TypeRegistry::empty();
        assert!(registry.register::<Canvas>());
        assert!(!registry.register::<Canvas>());

        assert!(registry.contains(&Type::of::<Vec<Circle>>()));
        assert!(registry.contains(&Type::of::<Circle>()));
        assert!(registry.contains(&Type::of::<f64>()));
        assert_eq!(
            registry.get_with_path("test.Circle").map(TypeInfo::kind),
            Some(TypeKind::Struct)
        );
        assert_eq!(registry.resolve_name("test.Circle[]"), Some(Type::of::<Vec<Circle>>()));
        assert_eq!(registry.resolve_name("test.Missing"), None);
    }

    #[test]
    fn value_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register::<Circle>();
        let circle = Circle { radius: 1.0 };
        assert_eq!(registry.type_of_value(&circle), Some(&Type::of::<Circle>()));
        assert_eq!(registry.type_of_value(&Shape), None);
        assert_eq!(circle.radius, 1.0);
    }

    #[test]
    fn supertypes_are_transitive() {
        let mut registry = TypeRegistry::new();
        registry.register::<Circle>();
        registry.register::<Shape>();
        registry.register_info(TypeInfo::abstract_type(Type::from_static("test.Drawable")));

        let circle = Type::of::<Circle>();
        let shape = Type::of::<Shape>();
        let drawable = Type::from_static("test.Drawable");

        assert_eq!(registry.supertypes_of(&circle), vec![shape.clone(), drawable.clone()]);
        assert!(registry.is_assignable(&circle, &drawable));
        assert!(registry.is_assignable(&circle, &Type::ANY));
        assert!(!registry.is_assignable(&shape, &circle));
        assert!(registry.is_assignable(&Type::array_of(circle.clone()), &Type::array_of(shape)));
    }

    #[cfg(feature = "auto_register")]
    mod auto {
        use super::super::TypeRegistry;
        use crate::info::Type;

        #[derive(Default)]
        struct Beacon {
            id: u32,
        }

        crate::impl_typed! { struct Beacon as "test.Beacon" { id: u32 } }
        crate::auto_register!(Beacon);

        #[test]
        fn collects_submitted_types() {
            let mut registry = TypeRegistry::empty();
            assert!(registry.auto_register());
            assert!(registry.contains(&Type::of::<Beacon>()));
            assert!(registry.contains(&Type::of::<u32>()));
            assert_eq!(Beacon::default().id, 0);
        }
    }
}
