//! End-to-end build tests: assembly, merge policy, analyses and failure semantics

use builder::{
    build, dispatch, BuildError, DgmlWriter, FnAnalysis, GraphBuilder, HubSizing, Inputs,
    ReferenceMarking, RuleSet, TypedRule, HUB_SIZE, IS_REFERENCED,
};
use model::{Category, Condition, Link, Node, PropertyValue, StyleTarget};
use std::any::Any;

#[derive(Debug)]
struct Component {
    id: &'static str,
    label: &'static str,
}

#[derive(Debug)]
struct Call {
    from: &'static str,
    to: &'static str,
}

#[derive(Debug)]
struct Unrelated;

fn components() -> Vec<Component> {
    vec![
        Component { id: "X", label: "x" },
        Component { id: "Y", label: "y" },
        Component { id: "Z", label: "z" },
    ]
}

fn calls() -> Vec<Call> {
    vec![Call { from: "X", to: "Y" }, Call { from: "Y", to: "Z" }]
}

fn component_rules() -> RuleSet {
    RuleSet::new()
        .with(TypedRule::<Component>::node("component", |c| {
            Ok(Node::new(c.id).with_label(c.label))
        }))
        .with(TypedRule::<Call>::link("call", |c| Ok(Link::new(c.from, c.to))))
}

fn size(graph: &model::Graph, id: &str) -> f64 {
    graph.node(id).unwrap().property(HUB_SIZE).unwrap().as_f64().unwrap()
}

#[test]
fn test_components_and_calls() {
    let (components, calls) = (components(), calls());
    let graph = build(
        &component_rules(),
        &Inputs::new().collection(&components).collection(&calls),
    )
    .unwrap();

    assert_eq!(graph.nodes().len(), 3);
    assert_eq!(graph.links().len(), 2);
    assert!(graph.categories().is_empty());
    assert!(graph.styles().is_empty());
}

#[test]
fn test_unmatched_object_has_no_effect() {
    let components = components();
    let stray = vec![Unrelated, Unrelated];
    assert!(dispatch(&Unrelated, &component_rules()).unwrap().is_empty());

    let with_stray = build(
        &component_rules(),
        &Inputs::new().collection(&components).collection(&stray),
    )
    .unwrap();
    let without = build(&component_rules(), &Inputs::new().collection(&components)).unwrap();
    assert_eq!(with_stray, without);
}

#[test]
fn test_last_writer_wins_keeps_first_position() {
    let rules = RuleSet::new()
        .with(TypedRule::<Component>::node("generic", |c| {
            Ok(Node::new(c.id).with_label("generic").with_category("Component"))
        }))
        .with(TypedRule::<Component>::node("specific", |c| {
            Ok(Node::new(c.id).with_label(c.label))
        }));
    let components = components();
    let graph = build(&rules, &Inputs::new().collection(&components)).unwrap();

    let ids: Vec<_> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["X", "Y", "Z"]);
    let x = graph.node("X").unwrap();
    assert_eq!(x.label.as_deref(), Some("x"));
    // absent in the later fragment, so kept
    assert_eq!(x.category.as_deref(), Some("Component"));
}

#[test]
fn test_overwrite_from_later_object_keeps_order() {
    let nodes = vec![
        Component { id: "A", label: "first" },
        Component { id: "B", label: "b" },
        Component { id: "A", label: "second" },
    ];
    let graph = build(&component_rules(), &Inputs::new().collection(&nodes)).unwrap();
    let ids: Vec<_> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert_eq!(graph.node("A").unwrap().label.as_deref(), Some("second"));
}

#[test]
fn test_build_is_deterministic() {
    let builder = GraphBuilder::new(component_rules())
        .with_analysis(HubSizing::default())
        .with_analysis(ReferenceMarking::default());
    let (components, calls) = (components(), calls());
    let inputs = Inputs::new().collection(&components).collection(&calls);

    let first = builder.build(&inputs).unwrap();
    let second = builder.build(&inputs).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    let writer = DgmlWriter::new();
    assert_eq!(writer.to_bytes(&first), writer.to_bytes(&second));
}

#[test]
fn test_multi_collection_equals_flattened() {
    let a: Vec<Box<dyn Any>> = vec![Box::new(Component { id: "X", label: "x" })];
    let b: Vec<Box<dyn Any>> = vec![Box::new(Call { from: "X", to: "Y" })];
    let flat: Vec<Box<dyn Any>> = vec![
        Box::new(Component { id: "X", label: "x" }),
        Box::new(Call { from: "X", to: "Y" }),
    ];

    let split = build(&component_rules(), &Inputs::new().boxed(&a).boxed(&b)).unwrap();
    let joined = build(&component_rules(), &Inputs::new().boxed(&flat)).unwrap();
    assert_eq!(split, joined);
}

#[test]
fn test_hub_sizing_ranks_middle_node_highest() {
    let builder = GraphBuilder::new(component_rules()).with_analysis(HubSizing::default());
    let (components, calls) = (components(), calls());
    let graph = builder
        .build(&Inputs::new().collection(&components).collection(&calls))
        .unwrap();

    assert!(size(&graph, "Y") > size(&graph, "X"));
    assert!(size(&graph, "Y") > size(&graph, "Z"));
    assert!(graph.property(HUB_SIZE).is_some());
}

#[test]
fn test_reference_marking() {
    let builder = GraphBuilder::new(component_rules()).with_analysis(ReferenceMarking::default());
    let (components, calls) = (components(), calls());
    let graph = builder
        .build(&Inputs::new().collection(&components).collection(&calls))
        .unwrap();

    let referenced = |id: &str| graph.node(id).unwrap().property(IS_REFERENCED).cloned();
    assert_eq!(referenced("X"), Some(PropertyValue::Bool(false)));
    assert_eq!(referenced("Y"), Some(PropertyValue::Bool(true)));
    assert_eq!(referenced("Z"), Some(PropertyValue::Bool(true)));

    let flag = Condition::equals(IS_REFERENCED, false);
    assert!(graph
        .styles()
        .iter()
        .any(|s| s.target == StyleTarget::Node && s.conditions.contains(&flag)));
}

#[test]
fn test_reference_analyses_declare_every_property() {
    let builder = GraphBuilder::new(component_rules())
        .with_analysis(HubSizing::default())
        .with_analysis(ReferenceMarking::default());
    let (components, calls) = (components(), calls());
    let (graph, diagnostics) = builder
        .build_with_diagnostics(&Inputs::new().collection(&components).collection(&calls))
        .unwrap();

    assert!(graph.undeclared_properties().is_empty());
    assert!(diagnostics.is_clean());
}

#[test]
fn test_failing_rule_aborts_build() {
    let rules = component_rules().with(
        TypedRule::<Component>::category("kind", |c| {
            if c.id == "Y" {
                anyhow::bail!("no category for {}", c.id);
            }
            Ok(Category::new("Component"))
        }),
    );
    let (components, calls) = (components(), calls());
    let result = GraphBuilder::new(rules)
        .with_analysis(HubSizing::default())
        .build(&Inputs::new().collection(&components).collection(&calls));

    match result {
        Err(BuildError::RuleExecution { rule, element_type, object, source }) => {
            assert_eq!(rule, "kind");
            assert!(element_type.ends_with("Component"));
            assert!(object.contains("\"Y\""));
            assert!(source.to_string().contains("no category for Y"));
        }
        other => panic!("expected rule failure, got {:?}", other.map(|g| g.nodes().len())),
    }
}

#[test]
fn test_failing_analysis_aborts_build() {
    let (components, calls) = (components(), calls());
    let result = GraphBuilder::new(component_rules())
        .with_analysis(HubSizing::default())
        .with_analysis(FnAnalysis::new("strict-check", |g| {
            anyhow::ensure!(g.nodes().len() > 10, "graph too small");
            Ok(())
        }))
        .build(&Inputs::new().collection(&components).collection(&calls));

    match result {
        Err(BuildError::AnalysisExecution { analysis, nodes, links, .. }) => {
            assert_eq!(analysis, "strict-check");
            assert_eq!((nodes, links), (3, 2));
        }
        other => panic!("expected analysis failure, got {:?}", other.map(|g| g.nodes().len())),
    }
}

#[test]
fn test_analyses_run_after_full_assembly() {
    // The analysis must see every node, including the last input object
    let (components, calls) = (components(), calls());
    let graph = GraphBuilder::new(component_rules())
        .with_analysis(FnAnalysis::new("count", |g| {
            anyhow::ensure!(g.nodes().len() == 3 && g.links().len() == 2, "partial graph");
            Ok(())
        }))
        .build(&Inputs::new().collection(&components).collection(&calls))
        .unwrap();
    assert_eq!(graph.nodes().len(), 3);
}

#[test]
fn test_dgml_output_contains_all_groups() {
    let (components, calls) = (components(), calls());
    let graph = GraphBuilder::new(component_rules())
        .with_rule(TypedRule::<Call>::category("calls", |_| Ok(Category::new("Calls"))))
        .with_analysis(HubSizing::default())
        .with_analysis(ReferenceMarking::default())
        .build(&Inputs::new().collection(&components).collection(&calls))
        .unwrap();

    let doc = DgmlWriter::new().write(&graph);
    for group in ["<Nodes>", "<Links>", "<Categories>", "<Properties>", "<Styles>"] {
        assert!(doc.contains(group), "missing {}", group);
    }
    assert!(doc.contains(r#"<Node Id="X" Label="x" HubSize="1" IsReferenced="False" />"#));
    assert!(doc.contains(r#"<Property Id="HubSize" DataType="System.Double""#));
}
