//! Containers shared by the trellis crates.
//!
//! - [`hash`]: `hashbrown` maps and sets keyed with a fixed-seed `foldhash` hasher,
//!   so iteration order only depends on the inserted keys.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId).
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
