#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use trellis_serial as serial;
pub use trellis_tree as tree;
pub use trellis_utils as utils;

pub use trellis_serial::{ConversionError, Trellis, TrellisBuilder, impl_typed};
