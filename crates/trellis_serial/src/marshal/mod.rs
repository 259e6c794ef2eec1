//! The state passed through nested converter calls.
//!
//! - [`MarshalContext`]: writes nested values, adding the `class` attribute
//!   where the runtime type of a value differs from its slot.
//! - [`UnmarshalContext`]: resolves the type of every node, consults the
//!   type gate and verifies what converters produce.
//! - [`DataHolder`]: values shared by the converters of one call.
//!
//! Both contexts record the path of the node being converted. Errors leave
//! the call wrapped in [`ConversionError::At`](crate::ConversionError::At)
//! with the path of the innermost failing node.

// -----------------------------------------------------------------------------
// Modules

mod data;
mod marshaller;
mod path;
mod unmarshaller;

// -----------------------------------------------------------------------------
// Exports

pub use data::DataHolder;
pub use marshaller::MarshalContext;
pub use unmarshaller::UnmarshalContext;

pub(crate) use path::NodePath;
