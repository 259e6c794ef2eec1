//! The [`Trellis`] engine and its builder.

mod builder;
mod trellis;

pub use builder::TrellisBuilder;
pub use trellis::Trellis;
