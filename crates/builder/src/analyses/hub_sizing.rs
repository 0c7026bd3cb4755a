use crate::analysis::{Analysis, GraphDecorator};
use model::{DataType, PropertyDeclaration, Style, StyleTarget};
use std::collections::HashMap;

/// Size hint property set on every node
pub const HUB_SIZE: &str = "HubSize";

/// Sizes nodes by the number of incident links
///
/// A link counts once for each distinct endpoint, so a self-loop adds one.
pub struct HubSizing {
    scale: f64,
}

impl HubSizing {
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for HubSizing {
    fn default() -> Self {
        Self::new()
    }
}

impl Analysis for HubSizing {
    fn name(&self) -> &str {
        "hub-sizing"
    }

    fn properties(&self) -> Vec<PropertyDeclaration> {
        vec![PropertyDeclaration::new(HUB_SIZE, DataType::Double)
            .with_label("Hub Size")
            .with_description("Size hint proportional to the number of incident links")]
    }

    fn styles(&self) -> Vec<Style> {
        vec![Style::new(StyleTarget::Node)
            .with_group_label("Hub Size")
            .set_expression("FontSize", format!("8 + {}", HUB_SIZE))]
    }

    fn decorate(&self, graph: &mut GraphDecorator<'_>) -> anyhow::Result<()> {
        let mut degree: HashMap<&str, usize> = HashMap::new();
        for link in graph.links() {
            *degree.entry(link.source.as_str()).or_insert(0) += 1;
            if link.target != link.source {
                *degree.entry(link.target.as_str()).or_insert(0) += 1;
            }
        }

        let sizes: Vec<(String, f64)> = graph
            .nodes()
            .iter()
            .map(|n| {
                let count = degree.get(n.id.as_str()).copied().unwrap_or(0);
                (n.id.clone(), count as f64 * self.scale)
            })
            .collect();

        for (id, size) in sizes {
            graph.set_node_property(&id, HUB_SIZE, size)?;
        }
        Ok(())
    }
}
