use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::convert::{Converter, SingleValueConverter};
use crate::info::Type;
use crate::mapper::{DefaultMapper, ImplicitCollectionMapping, Mapper, Next, SystemAttribute};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// MapperChain

/// An ordered list of [`Mapper`] stages ending in a [`DefaultMapper`].
///
/// Queries enter at the outermost stage. Every query is total: when no stage
/// has an override, the terminal answers with the natural name or "no
/// mapping".
///
/// The chain is assembled while configuring and shared read-only afterwards.
pub struct MapperChain {
    stages: Vec<Box<dyn Mapper>>,
    terminal: DefaultMapper,
}

impl MapperChain {
    /// A chain without stages.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            stages: Vec::new(),
            terminal: DefaultMapper::new(registry),
        }
    }

    /// Adds `stage` as the outermost stage, it sees every query first.
    pub fn wrap(&mut self, stage: impl Mapper) {
        self.wrap_boxed(Box::new(stage));
    }

    /// See [`wrap`](Self::wrap).
    pub fn wrap_boxed(&mut self, stage: Box<dyn Mapper>) {
        self.stages.insert(0, stage);
    }

    /// Adds `stage` as the innermost stage, right before the terminal.
    pub fn push(&mut self, stage: impl Mapper) {
        self.stages.push(Box::new(stage));
    }

    #[inline]
    fn next(&self) -> Next<'_> {
        Next::new(&self.stages, &self.terminal)
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        self.terminal.registry()
    }

    #[inline]
    pub fn default_mapper(&self) -> &DefaultMapper {
        &self.terminal
    }

    /// Number of stages, the terminal excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Finds the outermost stage of type `M`.
    ///
    /// ```
    /// use trellis_serial::mapper::{ClassAliasingMapper, FieldAliasingMapper, MapperChain};
    /// use trellis_serial::registry::TypeRegistry;
    ///
    /// let mut chain = MapperChain::new(TypeRegistry::new().into());
    /// chain.push(ClassAliasingMapper::default());
    ///
    /// assert!(chain.lookup_stage::<ClassAliasingMapper>().is_some());
    /// assert!(chain.lookup_stage::<FieldAliasingMapper>().is_none());
    /// ```
    pub fn lookup_stage<M: Mapper>(&self) -> Option<&M> {
        self.stages.iter().find_map(|stage| {
            let stage: &dyn Any = &**stage;
            stage.downcast_ref::<M>()
        })
    }

    // -------------------------------------------------------------------------
    // Queries

    pub fn serialized_class(&self, ty: &Type) -> Cow<'_, str> {
        self.next().serialized_class(ty)
    }

    pub fn real_class(&self, name: &str) -> Option<Type> {
        self.next().real_class(name)
    }

    pub fn serialized_member<'a>(&'a self, owner: &Type, member: &'a str) -> Cow<'a, str> {
        self.next().serialized_member(owner, member)
    }

    pub fn real_member<'a>(&'a self, owner: &Type, name: &'a str) -> Cow<'a, str> {
        self.next().real_member(owner, name)
    }

    pub fn alias_for_attribute<'a>(&'a self, scope: Option<&Type>, attribute: &'a str) -> Cow<'a, str> {
        self.next().alias_for_attribute(scope, attribute)
    }

    pub fn attribute_for_alias<'a>(&'a self, scope: Option<&Type>, alias: &'a str) -> Cow<'a, str> {
        self.next().attribute_for_alias(scope, alias)
    }

    pub fn system_attribute(&self, attribute: SystemAttribute) -> Option<&str> {
        self.next().system_attribute(attribute)
    }

    pub fn is_immutable_value_type(&self, ty: &Type) -> bool {
        self.next().is_immutable_value_type(ty)
    }

    pub fn default_implementation_of(&self, ty: &Type) -> Type {
        self.next().default_implementation_of(ty)
    }

    pub fn field_name_for_item_type_and_name(
        &self,
        owner: &Type,
        item_type: Option<&Type>,
        item_name: Option<&str>,
    ) -> Option<&str> {
        self.next()
            .field_name_for_item_type_and_name(owner, item_type, item_name)
    }

    pub fn item_type_for_item_field_name(&self, owner: &Type, item_name: &str) -> Option<Type> {
        self.next().item_type_for_item_field_name(owner, item_name)
    }

    pub fn implicit_collection_def_for_field_name(
        &self,
        owner: &Type,
        field: &str,
    ) -> Option<&ImplicitCollectionMapping> {
        self.next().implicit_collection_def_for_field_name(owner, field)
    }

    pub fn should_serialize_member(&self, owner: &Type, member: &str) -> bool {
        self.next().should_serialize_member(owner, member)
    }

    pub fn is_ignored_element(&self, owner: &Type, element: &str) -> bool {
        self.next().is_ignored_element(owner, element)
    }

    pub fn converter_from_item_type(
        &self,
        ty: &Type,
        member: Option<(&Type, &str)>,
    ) -> Option<&dyn SingleValueConverter> {
        self.next().converter_from_item_type(ty, member)
    }

    pub fn converter_from_attribute(
        &self,
        owner: Option<&Type>,
        attribute: &str,
        ty: &Type,
    ) -> Option<&dyn SingleValueConverter> {
        self.next().converter_from_attribute(owner, attribute, ty)
    }

    pub fn local_converter(&self, owner: &Type, field: &str) -> Option<&dyn Converter> {
        self.next().local_converter(owner, field)
    }
}

impl fmt::Debug for MapperChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperChain")
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}
