use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// A rule's guard or production function failed, or produced an invalid fragment
    #[error("rule '{rule}' for {element_type} failed on {object}: {source}")]
    RuleExecution {
        rule: String,
        element_type: &'static str,
        object: String,
        #[source]
        source: anyhow::Error,
    },
    /// An analysis failed while decorating the assembled graph
    #[error("analysis '{analysis}' failed on graph with {nodes} nodes and {links} links: {source}")]
    AnalysisExecution {
        analysis: String,
        nodes: usize,
        links: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("properties used without declaration: {}", .0.join(", "))]
    UndeclaredProperties(Vec<String>),
}

pub type Result<T> = std::result::Result<T, BuildError>;
