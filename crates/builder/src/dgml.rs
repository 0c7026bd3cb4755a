use model::{Category, Graph, Link, Node, PropertyDeclaration, SetterValue, Style};
use std::io;

const NAMESPACE: &str = "http://schemas.microsoft.com/vs/2009/dgml";

/// DGML document writer
pub struct DgmlWriter {
    indent: usize,
    layout: Option<String>,
    direction: Option<String>,
}

impl DgmlWriter {
    pub fn new() -> Self {
        Self {
            indent: 2,
            layout: None,
            direction: None,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Viewer layout, e.g. `Sugiyama` or `ForceDirected`
    pub fn with_layout(mut self, layout: &str) -> Self {
        self.layout = Some(layout.to_string());
        self
    }

    /// Graph direction, e.g. `TopToBottom` or `LeftToRight`
    pub fn with_direction(mut self, direction: &str) -> Self {
        self.direction = Some(direction.to_string());
        self
    }

    /// Render the graph; groups appear as Nodes, Links, Categories, Properties, Styles
    pub fn write(&self, graph: &Graph) -> String {
        let mut lines = vec![r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string()];

        let mut root = vec![("xmlns".to_string(), NAMESPACE.to_string())];
        if let Some(layout) = &self.layout {
            root.push(("Layout".to_string(), layout.clone()));
        }
        if let Some(direction) = &self.direction {
            root.push(("GraphDirection".to_string(), direction.clone()));
        }
        lines.push(format!("<DirectedGraph{}>", Self::attributes(&root)));

        self.group(&mut lines, "Nodes", graph.nodes().iter().map(Self::node_element));
        self.group(&mut lines, "Links", graph.links().iter().map(Self::link_element));
        self.group(
            &mut lines,
            "Categories",
            graph.categories().iter().map(Self::category_element),
        );
        self.group(
            &mut lines,
            "Properties",
            graph.properties().iter().map(Self::property_element),
        );

        if !graph.styles().is_empty() {
            lines.push(format!("{}<Styles>", self.pad(1)));
            for style in graph.styles() {
                self.style_element(&mut lines, style);
            }
            lines.push(format!("{}</Styles>", self.pad(1)));
        }

        lines.push("</DirectedGraph>".to_string());
        lines.join("\n")
    }

    pub fn to_bytes(&self, graph: &Graph) -> Vec<u8> {
        self.write(graph).into_bytes()
    }

    pub fn write_to<W: io::Write>(&self, graph: &Graph, mut out: W) -> io::Result<()> {
        out.write_all(self.write(graph).as_bytes())?;
        out.write_all(b"\n")
    }

    fn group<I>(&self, lines: &mut Vec<String>, name: &str, elements: I)
    where
        I: Iterator<Item = String>,
    {
        let mut elements = elements.peekable();
        if elements.peek().is_none() {
            return;
        }
        lines.push(format!("{}<{}>", self.pad(1), name));
        for element in elements {
            lines.push(format!("{}{}", self.pad(2), element));
        }
        lines.push(format!("{}</{}>", self.pad(1), name));
    }

    fn style_element(&self, lines: &mut Vec<String>, style: &Style) {
        let mut attrs = vec![("TargetType".to_string(), style.target.as_str().to_string())];
        push_opt(&mut attrs, "GroupLabel", &style.group_label);
        push_opt(&mut attrs, "ValueLabel", &style.value_label);
        lines.push(format!("{}<Style{}>", self.pad(2), Self::attributes(&attrs)));

        for condition in &style.conditions {
            lines.push(format!(
                "{}<Condition Expression=\"{}\" />",
                self.pad(3),
                escape(&condition.expression())
            ));
        }
        for setter in &style.setters {
            let (key, value) = match &setter.value {
                SetterValue::Value(v) => ("Value", v),
                SetterValue::Expression(e) => ("Expression", e),
            };
            lines.push(format!(
                "{}<Setter Property=\"{}\" {}=\"{}\" />",
                self.pad(3),
                escape(&setter.property),
                key,
                escape(value)
            ));
        }
        lines.push(format!("{}</Style>", self.pad(2)));
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }

    #[doc(hidden)]
    pub fn node_element(node: &Node) -> String {
        let mut attrs = vec![("Id".to_string(), node.id.clone())];
        push_opt(&mut attrs, "Label", &node.label);
        push_opt(&mut attrs, "Category", &node.category);
        if let Some(group) = node.group {
            attrs.push(("Group".to_string(), group.as_str().to_string()));
        }
        attrs.extend(node.properties.iter().map(|(k, v)| (k.clone(), v.to_string())));
        format!("<Node{} />", Self::attributes(&attrs))
    }

    #[doc(hidden)]
    pub fn link_element(link: &Link) -> String {
        let mut attrs = vec![
            ("Source".to_string(), link.source.clone()),
            ("Target".to_string(), link.target.clone()),
        ];
        push_opt(&mut attrs, "Category", &link.category);
        push_opt(&mut attrs, "Label", &link.label);
        attrs.extend(link.properties.iter().map(|(k, v)| (k.clone(), v.to_string())));
        format!("<Link{} />", Self::attributes(&attrs))
    }

    #[doc(hidden)]
    pub fn category_element(category: &Category) -> String {
        let mut attrs = vec![("Id".to_string(), category.id.clone())];
        push_opt(&mut attrs, "Label", &category.label);
        push_opt(&mut attrs, "BasedOn", &category.based_on);
        attrs.extend(category.properties.iter().map(|(k, v)| (k.clone(), v.to_string())));
        format!("<Category{} />", Self::attributes(&attrs))
    }

    #[doc(hidden)]
    pub fn property_element(property: &PropertyDeclaration) -> String {
        let mut attrs = vec![
            ("Id".to_string(), property.id.clone()),
            ("DataType".to_string(), property.data_type.markup_name().to_string()),
        ];
        push_opt(&mut attrs, "Label", &property.label);
        push_opt(&mut attrs, "Description", &property.description);
        format!("<Property{} />", Self::attributes(&attrs))
    }

    fn attributes(attrs: &[(String, String)]) -> String {
        attrs
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", k, escape(v)))
            .collect()
    }
}

impl Default for DgmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_opt(attrs: &mut Vec<(String, String)>, name: &str, value: &Option<String>) {
    if let Some(v) = value {
        attrs.push((name.to_string(), v.clone()));
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
