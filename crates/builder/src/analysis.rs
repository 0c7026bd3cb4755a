use crate::error::{BuildError, Result};
use crate::options::{Collision, Diagnostics};
use crate::rule::FragmentKind;
use model::{Graph, Link, LinkKey, Merge, Node, PropertyDeclaration, PropertyValue, Style};

/// Whole-graph decorator run after assembly
pub trait Analysis {
    fn name(&self) -> &str;

    /// Property declarations merged into the graph before `decorate` runs
    fn properties(&self) -> Vec<PropertyDeclaration> {
        Vec::new()
    }

    /// Styles appended to the graph before `decorate` runs
    fn styles(&self) -> Vec<Style> {
        Vec::new()
    }

    fn decorate(&self, graph: &mut GraphDecorator<'_>) -> anyhow::Result<()>;
}

/// Mutation surface handed to analyses: read elements, set properties,
/// register declarations and styles. Nothing can be removed or reordered.
pub struct GraphDecorator<'g> {
    graph: &'g mut Graph,
}

impl<'g> GraphDecorator<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        Self { graph }
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn links(&self) -> &[Link] {
        self.graph.links()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn property(&self, id: &str) -> Option<&PropertyDeclaration> {
        self.graph.property(id)
    }

    pub fn set_node_property(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> model::Result<()> {
        self.graph.set_node_property(id, name, value.into())
    }

    pub fn set_link_property(
        &mut self,
        key: &LinkKey,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> model::Result<()> {
        self.graph.set_link_property(key, name, value.into())
    }

    pub fn declare_property(&mut self, declaration: PropertyDeclaration) -> model::Result<Merge> {
        self.graph.declare_property(declaration)
    }

    pub fn add_style(&mut self, style: Style) -> model::Result<()> {
        self.graph.add_style(style)
    }
}

/// Analysis from a closure
pub struct FnAnalysis<F> {
    name: String,
    properties: Vec<PropertyDeclaration>,
    styles: Vec<Style>,
    decorate: F,
}

impl<F> FnAnalysis<F>
where
    F: Fn(&mut GraphDecorator<'_>) -> anyhow::Result<()>,
{
    pub fn new(name: impl Into<String>, decorate: F) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            styles: Vec::new(),
            decorate,
        }
    }

    pub fn with_property(mut self, declaration: PropertyDeclaration) -> Self {
        self.properties.push(declaration);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.styles.push(style);
        self
    }
}

impl<F> Analysis for FnAnalysis<F>
where
    F: Fn(&mut GraphDecorator<'_>) -> anyhow::Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Vec<PropertyDeclaration> {
        self.properties.clone()
    }

    fn styles(&self) -> Vec<Style> {
        self.styles.clone()
    }

    fn decorate(&self, graph: &mut GraphDecorator<'_>) -> anyhow::Result<()> {
        (self.decorate)(graph)
    }
}

/// Apply analyses in order; each sees the effect of the ones before it.
///
/// The analyses run on a copy, so `graph` is left untouched when any of them fails.
pub fn run_analyses(graph: &mut Graph, analyses: &[Box<dyn Analysis>]) -> Result<()> {
    let mut diagnostics = Diagnostics::default();
    let mut decorated = graph.clone();
    run_pipeline(&mut decorated, analyses, &mut diagnostics, false)?;
    *graph = decorated;
    Ok(())
}

pub(crate) fn run_pipeline(
    graph: &mut Graph,
    analyses: &[Box<dyn Analysis>],
    diagnostics: &mut Diagnostics,
    warn_on_collision: bool,
) -> Result<()> {
    for analysis in analyses {
        tracing::debug!("Running analysis '{}'", analysis.name());
        apply(graph, analysis.as_ref(), diagnostics, warn_on_collision).map_err(|source| {
            BuildError::AnalysisExecution {
                analysis: analysis.name().to_string(),
                nodes: graph.nodes().len(),
                links: graph.links().len(),
                source,
            }
        })?;
    }
    Ok(())
}

fn apply(
    graph: &mut Graph,
    analysis: &dyn Analysis,
    diagnostics: &mut Diagnostics,
    warn_on_collision: bool,
) -> anyhow::Result<()> {
    for declaration in analysis.properties() {
        let id = declaration.id.clone();
        if graph.declare_property(declaration)? == Merge::Updated {
            diagnostics.record_collision(
                Collision {
                    kind: FragmentKind::Property,
                    identity: id,
                    origin: analysis.name().to_string(),
                },
                warn_on_collision,
            );
        }
    }
    for style in analysis.styles() {
        graph.add_style(style)?;
    }
    analysis.decorate(&mut GraphDecorator::new(graph))
}
