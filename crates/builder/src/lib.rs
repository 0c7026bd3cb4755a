//! builder - rule dispatch and graph assembly
//!
//! Typed rules turn arbitrary objects into graph fragments, the assembler merges them
//! into one graph, and analyses decorate the finished graph in order.

mod analyses;
mod analysis;
mod assembler;
mod dgml;
mod dispatch;
mod error;
mod options;
mod rule;

pub use analyses::{HubSizing, ReferenceMarking, HUB_SIZE, IS_REFERENCED};
pub use analysis::{run_analyses, Analysis, FnAnalysis, GraphDecorator};
pub use assembler::{build, GraphBuilder, Inputs};
pub use dgml::DgmlWriter;
pub use dispatch::dispatch;
pub use error::{BuildError, Result};
pub use options::{BuildOptions, Collision, Diagnostics};
pub use rule::{Fragment, FragmentKind, Rule, RuleSet, TypedRule};
