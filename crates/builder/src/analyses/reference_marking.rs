use crate::analysis::{Analysis, GraphDecorator};
use model::{Condition, DataType, PropertyDeclaration, Style, StyleTarget};
use std::collections::HashSet;

/// Whether any non-containment link targets the node
pub const IS_REFERENCED: &str = "IsReferenced";

/// Marks nodes that nothing references and highlights them
pub struct ReferenceMarking {
    background: String,
}

impl ReferenceMarking {
    pub fn new() -> Self {
        Self {
            background: "#FFFFC0C0".to_string(),
        }
    }

    /// Background applied to unreferenced nodes
    pub fn with_background(mut self, color: &str) -> Self {
        self.background = color.to_string();
        self
    }
}

impl Default for ReferenceMarking {
    fn default() -> Self {
        Self::new()
    }
}

impl Analysis for ReferenceMarking {
    fn name(&self) -> &str {
        "reference-marking"
    }

    fn properties(&self) -> Vec<PropertyDeclaration> {
        vec![PropertyDeclaration::new(IS_REFERENCED, DataType::Boolean)
            .with_label("Is Referenced")
            .with_description("True when a non-containment link targets the node")]
    }

    fn styles(&self) -> Vec<Style> {
        vec![Style::new(StyleTarget::Node)
            .with_group_label("Referenced")
            .with_value_label("Unreferenced")
            .when(Condition::equals(IS_REFERENCED, false))
            .set("Background", self.background.as_str())]
    }

    fn decorate(&self, graph: &mut GraphDecorator<'_>) -> anyhow::Result<()> {
        let referenced: HashSet<String> = graph
            .links()
            .iter()
            .filter(|l| !l.is_containment())
            .map(|l| l.target.clone())
            .collect();

        let marks: Vec<(String, bool)> = graph
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), referenced.contains(&n.id)))
            .collect();

        for (id, is_referenced) in marks {
            graph.set_node_property(&id, IS_REFERENCED, is_referenced)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{Graph, Link, Node, CONTAINS};

    fn referenced(graph: &Graph, id: &str) -> bool {
        graph.node(id).unwrap().property(IS_REFERENCED).unwrap().as_bool().unwrap()
    }

    #[test]
    fn test_containment_links_do_not_count() {
        let mut graph = Graph::new();
        for id in ["module", "a", "b"] {
            graph.add_node(Node::new(id)).unwrap();
        }
        graph.add_link(Link::new("module", "a").with_category(CONTAINS)).unwrap();
        graph.add_link(Link::new("module", "b").with_category(CONTAINS)).unwrap();
        graph.add_link(Link::new("a", "b").with_category("Calls")).unwrap();

        ReferenceMarking::new().decorate(&mut GraphDecorator::new(&mut graph)).unwrap();

        assert!(!referenced(&graph, "module"));
        assert!(!referenced(&graph, "a"));
        assert!(referenced(&graph, "b"));
    }

    #[test]
    fn test_uncategorized_links_count() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("a")).unwrap();
        graph.add_node(Node::new("b")).unwrap();
        graph.add_link(Link::new("a", "b")).unwrap();

        ReferenceMarking::new().decorate(&mut GraphDecorator::new(&mut graph)).unwrap();
        assert!(referenced(&graph, "b"));
    }

    #[test]
    fn test_style_flags_unreferenced() {
        let styles = ReferenceMarking::new().with_background("Red").styles();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].target, StyleTarget::Node);
        assert_eq!(styles[0].conditions[0].expression(), "IsReferenced = False");
        assert_eq!(styles[0].setters[0].property, "Background");
    }
}
