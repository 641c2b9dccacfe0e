use super::create_output;
use anyhow::Context;
use clap::Parser;
use log::info;
use std::{
    fs,
    io::{Read, Write},
    path::PathBuf,
};
use xtools_dot::{Rule, Stylesheet, parse};

/// Rewrites attributes of a Graphviz graph according to conditional rules.
///
/// Rules are applied in passes: style file, then graph, node and edge rules.
/// In a condition `COND`, `attr=regex` pairs are joined by `&&`;
/// single quotes protect spaces and `&&`, and `''` matches every element.
/// In values, `%attr%` stands for the value of another attribute of the element.
#[derive(Debug, Parser)]
#[command(name = "dot2dot", author, version, about, long_about = None)]
pub struct DotCli {
    /// Graph to rewrite (DOT), or `-` for standard input
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub graph: PathBuf,
    /// Style file (JSON) of named rules
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub style: Option<PathBuf>,
    /// Set graph attributes
    #[arg(short = 'g', long = "style-graph", num_args = 1.., value_name = "ATTR=VAL")]
    pub graph_rules: Vec<Vec<String>>,
    /// Set attributes of the nodes satisfying COND
    #[arg(short, long, num_args = 1.., value_names = ["COND", "ATTR=VAL"])]
    pub nodes: Vec<Vec<String>>,
    /// Set attributes of the edges satisfying COND
    #[arg(short, long, num_args = 1.., value_names = ["COND", "ATTR=VAL"])]
    pub edges: Vec<Vec<String>>,
    /// Write the graph to this file instead of standard output
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl DotCli {
    /// Reads the graph, applies all rules and writes the result.
    pub fn run(&self) -> anyhow::Result<()> {
        let input = if self.graph.as_os_str() == "-" {
            info!(target: "dot2dot", "reading from standard input");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read standard input")?;
            input
        } else {
            fs::read_to_string(&self.graph)
                .with_context(|| format!("failed to read '{}'", self.graph.display()))?
        };
        let mut graph = parse(&input)
            .with_context(|| format!("failed to parse graph '{}'", self.graph.display()))?;

        if let Some(style) = &self.style {
            let stylesheet = Stylesheet::load(style)
                .with_context(|| format!("failed to load style '{}'", style.display()))?;
            graph.apply_stylesheet(&stylesheet);
        }

        let graph_rules = self
            .graph_rules
            .iter()
            .map(|group| Rule::updates_from_args(group))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid graph rule")?;
        graph.rewrite_graph(&graph_rules);

        let node_rules = self
            .nodes
            .iter()
            .map(|group| Rule::from_args(group))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid node rule")?;
        graph.rewrite_nodes(&node_rules);

        let edge_rules = self
            .edges
            .iter()
            .map(|group| Rule::from_args(group))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid edge rule")?;
        graph.rewrite_edges(&edge_rules);

        let mut out = create_output(self.output.as_deref())?;
        write!(out, "{graph}")?;
        out.flush()?;
        Ok(())
    }
}
