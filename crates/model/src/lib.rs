//! model - graph document model
//!
//! Nodes, links, categories, styles and property declarations, merged by identity key.

mod graph;
mod types;
mod value;

pub use graph::{Graph, GraphError, LinkKey, Merge, Result};
pub use types::{
    Category, Condition, DataType, Group, Link, Node, PropertyDeclaration, Setter, SetterValue,
    Style, StyleTarget, CONTAINS,
};
pub use value::{Properties, PropertyValue};
