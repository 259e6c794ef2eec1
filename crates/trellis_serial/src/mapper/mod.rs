//! The naming chain between types and members and the names in a tree.
//!
//! A [`MapperChain`] is an ordered list of [`Mapper`] stages ending in a
//! [`DefaultMapper`]. Each stage owns one concern, answers the queries it
//! has an override for and hands everything else to the [`Next`] stage.
//! Queries never fail: "no mapping" is `None` or the natural name.
//!
//! ## Stages
//!
//! The engine builds the chain below, outermost first. Custom stages are
//! wrapped around it.
//!
//! | Stage | Concern |
//! |---|---|
//! | [`ImmutableTypesMapper`] | extra immutable value types |
//! | [`LocalConversionMapper`] | converters bound to one field |
//! | [`EnumMapper`] | enum fields written as attributes |
//! | [`AttributeMapper`] | fields and types written as attributes |
//! | [`DefaultImplementationsMapper`] | declared type to concrete type |
//! | [`ArrayMapper`] | `T[]` written as `T-array` |
//! | [`ImplicitCollectionMapper`] | array items written below their owner |
//! | [`SystemAttributeAliasingMapper`] | names of the `class` and similar attributes |
//! | [`AttributeAliasingMapper`] | attribute aliases |
//! | [`ElementIgnoringMapper`] | omitted fields and ignored elements |
//! | [`FieldAliasingMapper`] | member aliases |
//! | [`ClassAliasingMapper`] | type aliases |

// -----------------------------------------------------------------------------
// Modules

mod chain;
mod classify;
mod conversion;
mod default_mapper;
mod mapping;
mod naming;
mod stage;

// -----------------------------------------------------------------------------
// Exports

pub use chain::MapperChain;
pub use default_mapper::DefaultMapper;
pub use mapping::{ImplicitCollectionMapping, SystemAttribute};
pub use stage::{Mapper, Next};

pub use classify::{DefaultImplementationsMapper, ElementIgnoringMapper};
pub use classify::{ImmutableTypesMapper, ImplicitCollectionMapper};
pub use conversion::{AttributeMapper, EnumMapper, LocalConversionMapper};
pub use naming::{ArrayMapper, ClassAliasingMapper, FieldAliasingMapper};
pub use naming::{AttributeAliasingMapper, SystemAttributeAliasingMapper};
