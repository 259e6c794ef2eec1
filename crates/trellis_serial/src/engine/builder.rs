use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::Trellis;
use crate::convert::{ArrayConverter, CharArrayConverter, EnumConverter, StructConverter};
use crate::convert::{Converter, ConverterLookup, FromStrConverter, Priority, SingleValueConverter};
use crate::info::{Type, TypeInfo, Typed};
use crate::mapper::{ArrayMapper, AttributeMapper, EnumMapper, MapperChain};
use crate::mapper::{AttributeAliasingMapper, ClassAliasingMapper, FieldAliasingMapper};
use crate::mapper::{DefaultImplementationsMapper, ElementIgnoringMapper, ImmutableTypesMapper};
use crate::mapper::{ImplicitCollectionMapper, ImplicitCollectionMapping, LocalConversionMapper};
use crate::mapper::{Mapper, SystemAttribute, SystemAttributeAliasingMapper};
use crate::marshal::UnmarshalContext;
use crate::registry::TypeRegistry;
use crate::security::{ArrayTypePermission, PrimitiveTypePermission, TypeHierarchyPermission};
use crate::security::{DenyPermission, ExplicitTypePermission, PermissionRules, TypePermission};
use crate::security::PrefixTypePermission;
#[cfg(feature = "std")]
use crate::security::{RegexTypePermission, WildcardTypePermission};

// -----------------------------------------------------------------------------
// TrellisBuilder

/// Configures a [`Trellis`].
///
/// A new builder knows the primitives and `String`, has the bundled
/// converters and permits primitives, text and arrays. Every other type
/// must be allowed explicitly before it can be read.
///
/// # Example
///
/// ```
/// use trellis_serial::{Trellis, impl_typed};
/// use trellis_serial::info::Type;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Book {
///     title: String,
///     pages: u32,
/// }
///
/// impl_typed! { struct Book as "library.Book" { title: String, pages: u32 } }
///
/// let trellis = Trellis::builder()
///     .register::<Book>()
///     .alias::<Book>("book")
///     .alias_field("name", Type::of::<Book>(), "title")
///     .allow_types_by_prefix(["library."])
///     .build();
///
/// let book = Book { title: "Dune".into(), pages: 412 };
/// let tree = trellis.to_tree(&book).unwrap();
/// assert_eq!(tree.to_string(), "<book><name>Dune</name><pages>412</pages></book>");
/// assert_eq!(trellis.from_tree_as::<Book>(&tree).unwrap(), book);
/// ```
#[must_use]
pub struct TrellisBuilder {
    registry: TypeRegistry,
    converters: ConverterLookup,
    permissions: PermissionRules,
    class_aliases: ClassAliasingMapper,
    field_aliases: FieldAliasingMapper,
    attribute_aliases: AttributeAliasingMapper,
    system_attributes: SystemAttributeAliasingMapper,
    ignoring: ElementIgnoringMapper,
    implicit: ImplicitCollectionMapper,
    defaults: DefaultImplementationsMapper,
    immutables: ImmutableTypesMapper,
    locals: LocalConversionMapper,
    attribute_fields: Vec<(Type, String)>,
    attribute_types: Vec<Type>,
    /// Custom stages, innermost first.
    stages: Vec<Box<dyn Mapper>>,
    max_depth: usize,
}

impl Default for TrellisBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrellisBuilder {
    pub fn new() -> Self {
        let mut permissions = PermissionRules::new();
        permissions.add(PrimitiveTypePermission);
        permissions.add(ArrayTypePermission);

        Self {
            registry: TypeRegistry::new(),
            converters: ConverterLookup::new(),
            permissions,
            class_aliases: ClassAliasingMapper::default(),
            field_aliases: FieldAliasingMapper::default(),
            attribute_aliases: AttributeAliasingMapper::default(),
            system_attributes: SystemAttributeAliasingMapper::default(),
            ignoring: ElementIgnoringMapper::default(),
            implicit: ImplicitCollectionMapper::default(),
            defaults: DefaultImplementationsMapper::default(),
            immutables: ImmutableTypesMapper::default(),
            locals: LocalConversionMapper::default(),
            attribute_fields: Vec::new(),
            attribute_types: Vec::new(),
            stages: Vec::new(),
            max_depth: UnmarshalContext::DEFAULT_MAX_DEPTH,
        }
    }

    // -------------------------------------------------------------------------
    // Types

    /// Registers `T` and the types it is built from.
    pub fn register<T: Typed>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Registers a hand-built [`TypeInfo`], usually of an abstract type.
    pub fn register_info(mut self, info: TypeInfo) -> Self {
        self.registry.register_info(info);
        self
    }

    /// Registers every type declared with [`auto_register!`](crate::auto_register).
    ///
    /// Does nothing without the `auto_register` feature.
    pub fn auto_register(mut self) -> Self {
        self.registry.auto_register();
        self
    }

    // -------------------------------------------------------------------------
    // Converters

    /// Adds a converter. Converters added later win among equal priorities,
    /// and every added converter is asked before a bundled one of the same
    /// priority.
    pub fn register_converter(mut self, converter: impl Converter, priority: Priority) -> Self {
        self.converters.register(converter, priority);
        self
    }

    /// Adds a converter used for exactly `ty`.
    pub fn register_converter_for_type(mut self, ty: Type, converter: impl Converter, priority: Priority) -> Self {
        self.converters.register_for_type(ty, converter, priority);
        self
    }

    pub fn register_single_value_converter<C: SingleValueConverter + 'static>(
        mut self,
        converter: C,
        priority: Priority,
    ) -> Self {
        self.converters.register_single_value(converter, priority);
        self
    }

    /// Uses `converter` for the field `field` of `owner` only.
    pub fn register_local_converter(mut self, owner: Type, field: impl Into<String>, converter: impl Converter) -> Self {
        self.locals
            .register_local_converter(owner, field, Arc::new(converter));
        self
    }

    // -------------------------------------------------------------------------
    // Names

    /// Registers `T` and names it `name` in the tree.
    pub fn alias<T: Typed>(mut self, name: impl Into<String>) -> Self {
        self.registry.register::<T>();
        self.class_aliases.add_class_alias(name, T::ty());
        self
    }

    /// Names the registered type `ty` as `name` in the tree.
    pub fn alias_type(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.class_aliases.add_class_alias(name, ty);
        self
    }

    /// Writes the member `member` of `owner` as `alias`.
    pub fn alias_field(mut self, alias: impl Into<String>, owner: Type, member: impl Into<String>) -> Self {
        self.field_aliases.add_field_alias(alias, owner, member);
        self
    }

    /// Writes the attribute `attribute` as `alias`, for every type.
    pub fn alias_attribute(mut self, alias: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.attribute_aliases.add_alias(alias, None, attribute);
        self
    }

    /// Writes the attribute `attribute` of `owner` as `alias`. Wins over an
    /// alias for every type.
    pub fn alias_attribute_for(mut self, owner: Type, alias: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.attribute_aliases.add_alias(alias, Some(owner), attribute);
        self
    }

    pub fn alias_system_attribute(mut self, attribute: SystemAttribute, name: impl Into<String>) -> Self {
        self.system_attributes.alias(attribute, name);
        self
    }

    /// Never writes `attribute`. Disabling [`SystemAttribute::Class`] loses the
    /// runtime type of values differing from their declared type.
    pub fn disable_system_attribute(mut self, attribute: SystemAttribute) -> Self {
        self.system_attributes.disable(attribute);
        self
    }

    // -------------------------------------------------------------------------
    // Layout

    /// Writes the field `field` of `owner` as an attribute.
    pub fn use_attribute_for(mut self, owner: Type, field: impl Into<String>) -> Self {
        self.attribute_fields.push((owner, field.into()));
        self
    }

    /// Writes every field holding a `ty` as an attribute.
    pub fn use_attribute_for_type(mut self, ty: Type) -> Self {
        self.attribute_types.push(ty);
        self
    }

    pub fn omit_field(mut self, owner: Type, field: impl Into<String>) -> Self {
        self.ignoring.omit_field(owner, field);
        self
    }

    pub fn ignore_unknown_element(mut self, element: impl Into<String>) -> Self {
        self.ignoring.ignore_unknown_element(element);
        self
    }

    pub fn ignore_unknown_elements(mut self) -> Self {
        self.ignoring.ignore_unknown_elements();
        self
    }

    /// Writes the items of the array field `field` directly below `owner`,
    /// each named after its type.
    pub fn implicit_collection(self, owner: Type, field: impl Into<String>, item_type: Type) -> Self {
        self.add_implicit_collection(ImplicitCollectionMapping::new(owner, field, None, item_type))
    }

    /// Like [`implicit_collection`](Self::implicit_collection) with every
    /// item named `item_name`.
    pub fn implicit_collection_named(
        self,
        owner: Type,
        field: impl Into<String>,
        item_name: impl Into<String>,
        item_type: Type,
    ) -> Self {
        let mapping = ImplicitCollectionMapping::new(owner, field, Some(item_name.into()), item_type);
        self.add_implicit_collection(mapping)
    }

    pub fn add_implicit_collection(mut self, mapping: ImplicitCollectionMapping) -> Self {
        self.implicit.add(mapping);
        self
    }

    /// Instantiates `implementation` where `declared` is expected and the
    /// tree names no type.
    pub fn add_default_implementation(mut self, implementation: Type, declared: Type) -> Self {
        self.defaults
            .add_default_implementation(implementation, declared);
        self
    }

    pub fn add_immutable_type(mut self, ty: Type) -> Self {
        self.immutables.add_immutable_type(ty);
        self
    }

    /// Wraps `stage` around the chain. The stage added last sees every query
    /// first.
    pub fn wrap_mapper(mut self, stage: impl Mapper) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Rejects trees nested deeper than `max_depth` nodes while reading.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // -------------------------------------------------------------------------
    // Permissions

    /// Adds a rule as the newest, so it is evaluated before all others.
    pub fn add_permission(mut self, permission: impl TypePermission) -> Self {
        self.permissions.add(permission);
        self
    }

    pub fn allow_types(self, types: impl IntoIterator<Item = Type>) -> Self {
        self.add_permission(ExplicitTypePermission::new(types))
    }

    /// Allows `base` and every registered type assignable to it.
    pub fn allow_type_hierarchy(self, base: Type) -> Self {
        self.add_permission(TypeHierarchyPermission::new(base))
    }

    pub fn allow_types_by_prefix<S: Into<String>>(self, prefixes: impl IntoIterator<Item = S>) -> Self {
        self.add_permission(PrefixTypePermission::new(prefixes))
    }

    /// See [`WildcardTypePermission`] for the pattern syntax.
    #[cfg(feature = "std")]
    pub fn allow_types_by_wildcard<S: Into<String>>(
        self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Result<Self, regex::Error> {
        Ok(self.add_permission(WildcardTypePermission::new(patterns)?))
    }

    /// Allows named types whose whole path matches one of `patterns`.
    #[cfg(feature = "std")]
    pub fn allow_types_by_regex<S: Into<String>>(
        self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Result<Self, regex::Error> {
        Ok(self.add_permission(RegexTypePermission::new(patterns)?))
    }

    pub fn deny_types(self, types: impl IntoIterator<Item = Type>) -> Self {
        self.add_permission(DenyPermission::new(ExplicitTypePermission::new(types)))
    }

    pub fn deny_permission(self, permission: impl TypePermission) -> Self {
        self.add_permission(DenyPermission::new(permission))
    }

    // -------------------------------------------------------------------------
    // Build

    /// Assembles the read-only [`Trellis`].
    pub fn build(self) -> Trellis {
        let registry = Arc::new(self.registry);

        let mut converters = bundled_converters(&registry);
        converters.append(self.converters);
        let converters = Arc::new(converters);

        let mut attributes = AttributeMapper::new(converters.clone());
        for (owner, field) in self.attribute_fields {
            attributes.add_attribute_for(owner, field);
        }
        for ty in self.attribute_types {
            attributes.add_attribute_type(ty);
        }

        let mut mapper = MapperChain::new(registry.clone());
        mapper.push(self.immutables);
        mapper.push(self.locals);
        mapper.push(EnumMapper::new(registry.clone()));
        mapper.push(attributes);
        mapper.push(self.defaults);
        mapper.push(ArrayMapper);
        mapper.push(self.implicit);
        mapper.push(self.system_attributes);
        mapper.push(self.attribute_aliases);
        mapper.push(self.ignoring);
        mapper.push(self.field_aliases);
        mapper.push(self.class_aliases);
        for stage in self.stages {
            mapper.wrap_boxed(stage);
        }

        log::debug!(
            "trellis built with {} types, {} converters, {} mapper stages and {} type permissions",
            registry.len(),
            converters.len(),
            mapper.len(),
            self.permissions.len(),
        );
        Trellis::from_parts(
            registry,
            Arc::new(mapper),
            converters,
            self.permissions,
            self.max_depth,
        )
    }
}

fn bundled_converters(registry: &Arc<TypeRegistry>) -> ConverterLookup {
    let mut lookup = ConverterLookup::new();
    lookup.register(StructConverter::new(registry.clone()), Priority::VERY_LOW);
    lookup.register(ArrayConverter::new(registry.clone()), Priority::LOW);

    macro_rules! from_str {
        ($($ty:ty),*) => {
            $(lookup.register_single_value(FromStrConverter::<$ty>::new(), Priority::NORMAL);)*
        };
    }
    from_str!(
        bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String
    );

    lookup.register_single_value(EnumConverter::new(registry.clone()), Priority::NORMAL);
    lookup.register(CharArrayConverter, Priority::NORMAL);
    lookup
}
