//! The hierarchical representation trellis converts object graphs to and from.
//!
//! A tree is made of [`Node`]s: a name, ordered attributes, text, and ordered children.
//! Converters never touch a concrete format, they talk to a [`TreeWriter`] while
//! marshalling and to a [`TreeReader`] while unmarshalling.
//!
//! This crate ships the in-memory format: [`NodeWriter`] builds a [`Node`],
//! [`NodeReader`] walks one. Other formats (XML text, JSON, ...) implement the
//! same two traits. [`Node`] itself implements `serde`'s traits, so any serde
//! format can carry a finished tree.
//!
//! # Example
//!
//! ```
//! use trellis_tree::{NodeReader, NodeWriter, TreeReader, TreeWriter};
//!
//! let mut writer = NodeWriter::new();
//! writer.start_node("person").unwrap();
//! writer.add_attribute("id", "7").unwrap();
//! writer.start_node("name").unwrap();
//! writer.write_text("Ada").unwrap();
//! writer.end_node().unwrap();
//! writer.end_node().unwrap();
//! let node = writer.into_node().unwrap();
//!
//! let mut reader = NodeReader::new(&node);
//! assert_eq!(reader.attribute("id"), Some("7"));
//! reader.move_down().unwrap();
//! assert_eq!(reader.text(), "Ada");
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod node;
mod reader;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use error::TreeError;
pub use node::Node;
pub use reader::{NodeReader, TreeReader};
pub use writer::{NodeWriter, TreeWriter};
