use alloc::string::String;
use core::fmt;

use crate::info::Type;

// -----------------------------------------------------------------------------
// SystemAttribute

/// Attributes the engine writes for its own bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemAttribute {
    /// The concrete type of a value whose declared type differs.
    Class,
    /// The type declaring a member, when members of a type hierarchy collide.
    DefinedIn,
    /// The type a value resolves to after reading.
    ResolvesTo,
    /// The enum type of a value in a slot not declared as that enum.
    EnumType,
}

impl SystemAttribute {
    pub const ALL: [SystemAttribute; 4] = [
        SystemAttribute::Class,
        SystemAttribute::DefinedIn,
        SystemAttribute::ResolvesTo,
        SystemAttribute::EnumType,
    ];

    /// The attribute name used when no alias is configured.
    pub const fn default_name(self) -> &'static str {
        match self {
            SystemAttribute::Class => "class",
            SystemAttribute::DefinedIn => "defined-in",
            SystemAttribute::ResolvesTo => "resolves-to",
            SystemAttribute::EnumType => "enum-type",
        }
    }
}

impl fmt::Display for SystemAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

// -----------------------------------------------------------------------------
// ImplicitCollectionMapping

/// Binds the items of an array field directly to child nodes of its owner.
///
/// The field itself gets no node of its own. Each item is written as a child
/// of the owner, named `item_name` if one is configured, or by the serialized
/// class of the item otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitCollectionMapping {
    owner: Type,
    field_name: String,
    item_name: Option<String>,
    item_type: Type,
}

impl ImplicitCollectionMapping {
    pub fn new(
        owner: Type,
        field_name: impl Into<String>,
        item_name: Option<String>,
        item_type: Type,
    ) -> Self {
        Self {
            owner,
            field_name: field_name.into(),
            item_name,
            item_type,
        }
    }

    #[inline]
    pub fn owner(&self) -> &Type {
        &self.owner
    }

    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The element name of the items, `None` if items are named by type.
    #[inline]
    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    #[inline]
    pub fn item_type(&self) -> &Type {
        &self.item_type
    }
}
