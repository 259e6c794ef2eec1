//! Items used by the exported macros, not part of the public API.

pub use alloc::boxed::Box;
pub use alloc::vec;

#[cfg(feature = "auto_register")]
pub use inventory;
