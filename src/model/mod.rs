//! Data model shared by the parser, the collectors and the sinks.
//!
//! Property lists are the normalized form in which every style reaches a
//! sink; list elements, table sizes and embedded data are the artifacts the
//! first pass hands to the second.

mod artifacts;
mod list;
mod property;

pub use artifacts::{Artifacts, EmbeddedData, TableSize};
pub use list::{ListElement, ListElements, ListKind, NumberFormat};
pub use property::{PropertyList, PropertyValue};
