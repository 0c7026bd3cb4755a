use crate::analysis::{run_pipeline, Analysis};
use crate::dispatch::{dispatch_with, rule_error};
use crate::error::{BuildError, Result};
use crate::options::{BuildOptions, Collision, Diagnostics};
use crate::rule::{Fragment, FragmentKind, Rule, RuleSet};
use model::{Graph, LinkKey, Merge};
use std::any::Any;

/// Ordered stream of input objects, built from one or more collections
#[derive(Default)]
pub struct Inputs<'a> {
    objects: Vec<&'a dyn Any>,
}

impl<'a> Inputs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collection; boxed elements are dispatched by their inner type
    pub fn collection<T: Any>(mut self, items: &'a [T]) -> Self {
        self.objects.extend(items.iter().map(|item| unbox(item)));
        self
    }

    /// Append a heterogeneous collection
    pub fn boxed(mut self, items: &'a [Box<dyn Any>]) -> Self {
        self.objects.extend(items.iter().map(|item| &**item));
        self
    }

    pub fn object(mut self, object: &'a dyn Any) -> Self {
        self.objects.push(object);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Any> + '_ {
        self.objects.iter().copied()
    }
}

fn unbox(item: &dyn Any) -> &dyn Any {
    if let Some(boxed) = item.downcast_ref::<Box<dyn Any>>() {
        return &**boxed;
    }
    if let Some(boxed) = item.downcast_ref::<Box<dyn Any + Send>>() {
        return &**boxed;
    }
    if let Some(boxed) = item.downcast_ref::<Box<dyn Any + Send + Sync>>() {
        return &**boxed;
    }
    item
}

/// Dispatch every input object and merge the fragments into a fresh graph (no analyses)
pub fn build(rules: &RuleSet, inputs: &Inputs<'_>) -> Result<Graph> {
    let mut diagnostics = Diagnostics::default();
    assemble(rules, inputs, &BuildOptions::default(), &mut diagnostics)
}

fn assemble(
    rules: &RuleSet,
    inputs: &Inputs<'_>,
    options: &BuildOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Graph> {
    let mut graph = Graph::new();
    let mut unmatched = 0usize;

    for object in inputs.iter() {
        let fired = dispatch_with(object, rules, |rule, fragments| {
            for fragment in fragments {
                merge(&mut graph, rule, fragment, diagnostics, options.warn_on_collision)
                    .map_err(|e| rule_error(rule, object, e.into()))?;
            }
            Ok(())
        })?;
        if fired == 0 {
            unmatched += 1;
        }
    }

    if unmatched > 0 {
        tracing::debug!("{} input objects matched no rule", unmatched);
    }
    Ok(graph)
}

fn merge(
    graph: &mut Graph,
    rule: &dyn Rule,
    fragment: Fragment,
    diagnostics: &mut Diagnostics,
    warn: bool,
) -> model::Result<()> {
    let (kind, identity, outcome) = match fragment {
        Fragment::Node(node) => {
            let id = node.id.clone();
            (FragmentKind::Node, id, graph.add_node(node)?)
        }
        Fragment::Link(link) => {
            let key = LinkKey::of(&link).to_string();
            (FragmentKind::Link, key, graph.add_link(link)?)
        }
        Fragment::Category(category) => {
            let id = category.id.clone();
            (FragmentKind::Category, id, graph.add_category(category)?)
        }
        Fragment::Style(style) => return graph.add_style(style),
    };

    if outcome == Merge::Updated {
        diagnostics.record_collision(
            Collision {
                kind,
                identity,
                origin: rule.name().to_string(),
            },
            warn,
        );
    }
    Ok(())
}

/// Rule set + analysis sequence + options: the full assemble-then-analyze pipeline
#[derive(Default)]
pub struct GraphBuilder {
    rules: RuleSet,
    analyses: Vec<Box<dyn Analysis>>,
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            analyses: Vec::new(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.add(rule);
        self
    }

    /// Analyses run in the order they are added
    pub fn with_analysis(mut self, analysis: impl Analysis + 'static) -> Self {
        self.analyses.push(Box::new(analysis));
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn analyses(&self) -> impl Iterator<Item = &str> {
        self.analyses.iter().map(|a| a.name())
    }

    pub fn build(&self, inputs: &Inputs<'_>) -> Result<Graph> {
        self.build_with_diagnostics(inputs).map(|(graph, _)| graph)
    }

    /// Build and report collisions, undeclared properties and dangling links
    pub fn build_with_diagnostics(&self, inputs: &Inputs<'_>) -> Result<(Graph, Diagnostics)> {
        let mut diagnostics = Diagnostics::default();

        let mut graph = assemble(&self.rules, inputs, &self.options, &mut diagnostics)?;
        tracing::debug!(
            "Assembled {} nodes, {} links from {} objects",
            graph.nodes().len(),
            graph.links().len(),
            inputs.len()
        );

        run_pipeline(
            &mut graph,
            &self.analyses,
            &mut diagnostics,
            self.options.warn_on_collision,
        )?;

        diagnostics.undeclared_properties = graph.undeclared_properties();
        diagnostics.dangling_links = graph
            .dangling_links()
            .into_iter()
            .map(|l| LinkKey::of(l).to_string())
            .collect();

        if self.options.require_declarations && !diagnostics.undeclared_properties.is_empty() {
            return Err(BuildError::UndeclaredProperties(diagnostics.undeclared_properties));
        }

        tracing::info!(
            "Built graph: {} nodes, {} links, {} categories, {} styles",
            graph.nodes().len(),
            graph.links().len(),
            graph.categories().len(),
            graph.styles().len()
        );
        Ok((graph, diagnostics))
    }
}
