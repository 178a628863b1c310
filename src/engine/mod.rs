//! The structural text-rewriting engine.
//!
//! Everything in this module operates on the raw text of HCL-like
//! configuration, never a parsed syntax tree. The pieces layer up from a
//! balanced-brace scanner:
//!
//! - [`scanner`]: find the matching closing brace for a block, skipping
//!   braces inside strings and comments
//! - [`locator`]: resolve header-pattern matches into full block spans
//! - [`hierarchy`]: walk declared child references into a tree with path
//!   and depth metadata
//! - [`partition`]: assign every tree node to an output file by depth
//!   cutoff
//! - [`fields`]: extract nested scalar fields together with their exact
//!   source spans
//! - [`edit`]: apply many planned replacements to one buffer in a single
//!   validated pass
//!
//! The engine is pure computation over in-memory strings: no I/O, no
//! shared state between invocations. File reads and writes belong to the
//! passes in [`crate::passes`].

pub mod edit;
pub mod fields;
pub mod hierarchy;
pub mod locator;
pub mod partition;
pub mod scanner;
pub mod span;

pub use edit::{Edit, EditSet};
pub use fields::{extract_field, ExtractedField, FieldValue};
pub use hierarchy::{Hierarchy, HierarchyBuilder, HierarchyNode};
pub use locator::{Block, BlockLocator};
pub use partition::{assign_partitions, PartitionAssignment};
pub use scanner::matching_brace;
pub use span::Span;
