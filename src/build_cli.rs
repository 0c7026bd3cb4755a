//! build/check subcommands

use crate::config::CliConfig;
use crate::input::{self, Input};
use builder::{
    BuildOptions, DgmlWriter, Diagnostics, GraphBuilder, HubSizing, Inputs, ReferenceMarking,
};
use clap::Subcommand;
use model::Graph;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Commands {
    /// Build a DGML graph from a JSON description
    Build {
        /// Input JSON file
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the graph model as JSON instead of DGML
        #[arg(long)]
        json: bool,
        /// Fail when a property is used without declaration
        #[arg(long)]
        strict: bool,
        /// Skip hub sizing and reference marking
        #[arg(long)]
        no_analyses: bool,
        /// Hub size per incident link
        #[arg(long)]
        hub_scale: Option<f64>,
        /// Viewer layout (Sugiyama, ForceDirected, ...)
        #[arg(long)]
        layout: Option<String>,
        /// Log redefined elements as warnings
        #[arg(long)]
        warn_collisions: bool,
    },
    /// Build and report diagnostics
    Check {
        /// Input JSON file
        input: PathBuf,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cmd: Commands, config: CliConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Build {
            input,
            output,
            json,
            strict,
            no_analyses,
            hub_scale,
            layout,
            warn_collisions,
        } => {
            let config = CliConfig {
                strict: strict || config.strict,
                hub_scale: hub_scale.unwrap_or(config.hub_scale),
                analyses: config.analyses && !no_analyses,
                layout: layout.or(config.layout),
                warn_collisions: warn_collisions || config.warn_collisions,
            };
            cmd_build(&input, output.as_deref(), json, &config)
        }
        Commands::Check { input, json } => cmd_check(&input, json, &config),
    }
}

fn graph_builder(config: &CliConfig) -> GraphBuilder {
    let options = BuildOptions::new()
        .with_require_declarations(config.strict)
        .with_warn_on_collision(config.warn_collisions);
    let mut builder = GraphBuilder::new(input::rules()).with_options(options);
    if config.analyses {
        builder = builder
            .with_analysis(HubSizing::new().with_scale(config.hub_scale))
            .with_analysis(ReferenceMarking::new());
    }
    builder
}

fn build_graph(path: &Path, config: &CliConfig) -> anyhow::Result<(Graph, Diagnostics)> {
    let input = Input::load(path)?;
    tracing::info!(
        "Loaded {} components, {} calls from {}",
        input.components.len(),
        input.calls.len(),
        path.display()
    );

    let inputs = Inputs::new()
        .collection(&input.components)
        .collection(&input.calls);
    Ok(graph_builder(config).build_with_diagnostics(&inputs)?)
}

fn cmd_build(path: &Path, output: Option<&Path>, json: bool, config: &CliConfig) -> anyhow::Result<()> {
    let (graph, _) = build_graph(path, config)?;

    let rendered = if json {
        serde_json::to_string_pretty(&graph)?
    } else {
        let mut writer = DgmlWriter::new();
        if let Some(layout) = &config.layout {
            writer = writer.with_layout(layout);
        }
        writer.write(&graph)
    };

    match output {
        Some(file) => {
            std::fs::write(file, format!("{}\n", rendered))?;
            println!(
                "Saved {} nodes, {} links to: {}",
                graph.nodes().len(),
                graph.links().len(),
                file.display()
            );
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn cmd_check(path: &Path, json: bool, config: &CliConfig) -> anyhow::Result<()> {
    let (graph, diagnostics) = build_graph(path, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }

    println!(
        "{} nodes, {} links, {} categories, {} styles",
        graph.nodes().len(),
        graph.links().len(),
        graph.categories().len(),
        graph.styles().len()
    );
    if diagnostics.is_clean() {
        println!("No issues found");
        return Ok(());
    }

    if !diagnostics.undeclared_properties.is_empty() {
        println!("\nUndeclared properties:");
        for name in &diagnostics.undeclared_properties {
            println!("  {}", name);
        }
    }
    if !diagnostics.dangling_links.is_empty() {
        println!("\nLinks to missing nodes:");
        for link in &diagnostics.dangling_links {
            println!("  {}", link);
        }
    }
    if !diagnostics.collisions.is_empty() {
        println!("\nRedefined elements:");
        for c in &diagnostics.collisions {
            println!("  {:?} {} (by {})", c.kind, c.identity, c.origin);
        }
    }

    Ok(())
}
