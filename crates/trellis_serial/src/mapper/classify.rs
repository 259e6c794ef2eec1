use alloc::string::String;
use alloc::vec::Vec;
use core::iter;

use trellis_utils::hash::{HashMap, HashSet};

use crate::info::Type;
use crate::mapper::{ImplicitCollectionMapping, Mapper, Next};

// -----------------------------------------------------------------------------
// ImmutableTypesMapper

/// Marks additional types as immutable values.
#[derive(Debug, Default)]
pub struct ImmutableTypesMapper {
    immutable: HashSet<Type>,
}

impl ImmutableTypesMapper {
    pub fn add_immutable_type(&mut self, ty: Type) {
        self.immutable.insert(ty);
    }
}

impl Mapper for ImmutableTypesMapper {
    fn is_immutable_value_type(&self, ty: &Type, next: Next<'_>) -> bool {
        self.immutable.contains(ty) || next.is_immutable_value_type(ty)
    }
}

// -----------------------------------------------------------------------------
// DefaultImplementationsMapper

/// The concrete type instantiated for a declared type.
///
/// Used when the tree does not name the type of a value, which happens for
/// values whose type equals the default implementation of the declared one.
///
/// ```
/// use trellis_serial::info::Type;
/// use trellis_serial::mapper::{DefaultImplementationsMapper, MapperChain};
/// use trellis_serial::registry::TypeRegistry;
///
/// let shape = Type::from_static("demo.Shape");
/// let circle = Type::from_static("demo.Circle");
///
/// let mut defaults = DefaultImplementationsMapper::default();
/// defaults.add_default_implementation(circle.clone(), shape.clone());
///
/// let mut chain = MapperChain::new(TypeRegistry::new().into());
/// chain.push(defaults);
/// assert_eq!(chain.default_implementation_of(&shape), circle);
/// assert_eq!(chain.default_implementation_of(&circle), circle);
/// ```
#[derive(Debug, Default)]
pub struct DefaultImplementationsMapper {
    defaults: HashMap<Type, Type>,
}

impl DefaultImplementationsMapper {
    /// Instantiates `implementation` where `declared` is expected.
    pub fn add_default_implementation(&mut self, implementation: Type, declared: Type) {
        self.defaults.insert(declared, implementation);
    }
}

impl Mapper for DefaultImplementationsMapper {
    fn default_implementation_of(&self, ty: &Type, next: Next<'_>) -> Type {
        match self.defaults.get(ty) {
            Some(implementation) => implementation.clone(),
            None => next.default_implementation_of(ty),
        }
    }
}

// -----------------------------------------------------------------------------
// ElementIgnoringMapper

/// Omitted members and unknown elements skipped while reading.
#[derive(Debug, Default)]
pub struct ElementIgnoringMapper {
    omitted: HashMap<Type, HashSet<String>>,
    ignored: HashSet<String>,
    ignore_all: bool,
}

impl ElementIgnoringMapper {
    /// Leaves `member` of `owner` out of the tree and skips it when reading.
    pub fn omit_field(&mut self, owner: Type, member: impl Into<String>) {
        self.omitted.entry(owner).or_default().insert(member.into());
    }

    /// Skips unknown elements named `element` instead of failing.
    pub fn ignore_unknown_element(&mut self, element: impl Into<String>) {
        self.ignored.insert(element.into());
    }

    /// Skips every unknown element.
    pub fn ignore_unknown_elements(&mut self) {
        self.ignore_all = true;
    }
}

impl Mapper for ElementIgnoringMapper {
    fn should_serialize_member(&self, owner: &Type, member: &str, next: Next<'_>) -> bool {
        let omitted = self
            .omitted
            .get(owner)
            .is_some_and(|members| members.contains(member));
        !omitted && next.should_serialize_member(owner, member)
    }

    fn is_ignored_element(&self, owner: &Type, element: &str, next: Next<'_>) -> bool {
        self.ignore_all || self.ignored.contains(element) || next.is_ignored_element(owner, element)
    }
}

// -----------------------------------------------------------------------------
// ImplicitCollectionMapper

/// Array fields whose items are written directly below their owner.
///
/// Mappings declared for a type also apply to its subtypes.
#[derive(Debug, Default)]
pub struct ImplicitCollectionMapper {
    by_owner: HashMap<Type, Vec<ImplicitCollectionMapping>>,
}

impl ImplicitCollectionMapper {
    /// Adds a mapping, replacing one for the same owner and field.
    pub fn add(&mut self, mapping: ImplicitCollectionMapping) {
        let mappings = self.by_owner.entry(mapping.owner().clone()).or_default();
        mappings.retain(|old| old.field_name() != mapping.field_name());
        mappings.push(mapping);
    }

    /// The mappings of `owner`, or of its nearest supertype having some.
    fn mappings_of<'a>(&'a self, owner: &Type, next: Next<'_>) -> &'a [ImplicitCollectionMapping] {
        if self.by_owner.is_empty() {
            return &[];
        }
        iter::once(owner.clone())
            .chain(next.registry().supertypes_of(owner))
            .find_map(|ty| self.by_owner.get(&ty))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Mapper for ImplicitCollectionMapper {
    fn field_name_for_item_type_and_name<'a>(
        &'a self,
        owner: &Type,
        item_type: Option<&Type>,
        item_name: Option<&str>,
        next: Next<'a>,
    ) -> Option<&'a str> {
        let registry = next.registry();
        let mut unnamed: Option<&ImplicitCollectionMapping> = None;

        for mapping in self.mappings_of(owner, next) {
            match (item_type, mapping.item_name()) {
                (_, Some(name)) if item_name == Some(name) => {
                    let accepted = item_type.is_none_or(|ty| registry.is_assignable(ty, mapping.item_type()));
                    if accepted {
                        return Some(mapping.field_name());
                    }
                }
                (Some(ty), None) if registry.is_assignable(ty, mapping.item_type()) => {
                    // The most specific item type wins.
                    let better = unnamed
                        .is_none_or(|current| registry.is_assignable(mapping.item_type(), current.item_type()));
                    if better {
                        unnamed = Some(mapping);
                    }
                }
                _ => {}
            }
        }

        match unnamed {
            Some(mapping) => Some(mapping.field_name()),
            None => next.field_name_for_item_type_and_name(owner, item_type, item_name),
        }
    }

    fn item_type_for_item_field_name(&self, owner: &Type, item_name: &str, next: Next<'_>) -> Option<Type> {
        self.mappings_of(owner, next)
            .iter()
            .find(|mapping| mapping.item_name() == Some(item_name))
            .map(|mapping| mapping.item_type().clone())
            .or_else(|| next.item_type_for_item_field_name(owner, item_name))
    }

    fn implicit_collection_def_for_field_name<'a>(
        &'a self,
        owner: &Type,
        field: &str,
        next: Next<'a>,
    ) -> Option<&'a ImplicitCollectionMapping> {
        self.mappings_of(owner, next)
            .iter()
            .find(|mapping| mapping.field_name() == field)
            .or_else(|| next.implicit_collection_def_for_field_name(owner, field))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::*;
    use crate::mapper::MapperChain;
    use crate::registry::TypeRegistry;

    #[derive(Default)]
    struct Note {
        text: String,
    }

    #[derive(Default)]
    struct Memo {
        text: String,
    }

    #[derive(Default)]
    struct Board {
        notes: Vec<Note>,
        pinned: Vec<Note>,
    }

    crate::impl_typed! { struct Note as "test.Note" { text: String } }
    crate::impl_typed! { struct Memo as "test.Memo": "test.Note" { text: String } }
    crate::impl_typed! { struct Board as "test.Board" { notes: Vec<Note>, pinned: Vec<Note> } }

    fn chain() -> MapperChain {
        let mut registry = TypeRegistry::new();
        registry.register::<Board>();
        registry.register::<Memo>();

        let board = Type::of::<Board>();
        let mut implicit = ImplicitCollectionMapper::default();
        implicit.add(ImplicitCollectionMapping::new(board.clone(), "notes", None, Type::of::<Note>()));
        implicit.add(ImplicitCollectionMapping::new(
            board,
            "pinned",
            Some(String::from("pin")),
            Type::of::<Note>(),
        ));

        let mut chain = MapperChain::new(Arc::new(registry));
        chain.push(implicit);
        chain
    }

    #[test]
    fn implicit_collection_lookups() {
        let chain = chain();
        let board = Type::of::<Board>();
        let note = Type::of::<Note>();
        let memo = Type::of::<Memo>();

        assert_eq!(chain.field_name_for_item_type_and_name(&board, Some(&note), Some("test.Note")), Some("notes"));
        assert_eq!(chain.field_name_for_item_type_and_name(&board, Some(&memo), Some("test.Memo")), Some("notes"));
        assert_eq!(chain.field_name_for_item_type_and_name(&board, Some(&note), Some("pin")), Some("pinned"));
        assert_eq!(chain.field_name_for_item_type_and_name(&board, None, Some("pin")), Some("pinned"));
        assert_eq!(chain.field_name_for_item_type_and_name(&board, None, Some("other")), None);
        assert_eq!(chain.field_name_for_item_type_and_name(&note, Some(&note), None), None);

        assert_eq!(chain.item_type_for_item_field_name(&board, "pin"), Some(note.clone()));
        assert_eq!(chain.item_type_for_item_field_name(&board, "notes"), None);

        let mapping = chain.implicit_collection_def_for_field_name(&board, "pinned").unwrap();
        assert_eq!(mapping.item_name(), Some("pin"));
        assert_eq!(mapping.item_type(), &note);
        assert!(chain.implicit_collection_def_for_field_name(&board, "missing").is_none());

        let unused = Board::default();
        assert!(unused.notes.is_empty() && unused.pinned.is_empty());
        assert!(Memo::default().text.is_empty() && Note::default().text.is_empty());
    }

    #[test]
    fn omitted_and_ignored() {
        let mut ignoring = ElementIgnoringMapper::default();
        ignoring.omit_field(Type::of::<Board>(), "pinned");
        ignoring.ignore_unknown_element("legacy");

        let mut chain = chain();
        chain.wrap(ignoring);

        let board = Type::of::<Board>();
        assert!(!chain.should_serialize_member(&board, "pinned"));
        assert!(chain.should_serialize_member(&board, "notes"));
        assert!(chain.is_ignored_element(&board, "legacy"));
        assert!(!chain.is_ignored_element(&board, "current"));
    }

    #[test]
    fn immutable_types() {
        let mut immutable = ImmutableTypesMapper::default();
        immutable.add_immutable_type(Type::of::<Note>());

        let mut chain = chain();
        assert!(chain.is_immutable_value_type(&Type::of::<u64>()));
        assert!(chain.is_immutable_value_type(&Type::of::<String>()));
        assert!(!chain.is_immutable_value_type(&Type::of::<Note>()));
        chain.wrap(immutable);
        assert!(chain.is_immutable_value_type(&Type::of::<Note>()));
        assert!(!chain.is_immutable_value_type(&Type::of::<Board>()));
    }
}
