use crate::{
    Attributes, Endpoint, Graph, Id,
    graph::{Stmt, Subgraph},
};
use std::{
    borrow::Cow,
    fmt::{self, Write},
};

const KEYWORDS: [&str; 6] = ["strict", "graph", "digraph", "node", "edge", "subgraph"];

/// Writes the graph back in the DOT language, one statement per line.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.strict {
            f.write_str("strict ")?;
        }
        f.write_str(if self.directed { "digraph" } else { "graph" })?;
        if let Some(id) = &self.id {
            write!(f, " {}", quote(id))?;
        }
        f.write_str(" {\n")?;
        let mut writer = Writer {
            graph: self,
            written: vec![false; self.nodes.len()],
            out: &mut *f,
        };
        writer.graph_attrs(&self.attrs, 1)?;
        writer.body(&self.body, 1)?;
        f.write_str("}\n")
    }
}

struct Writer<'a, W> {
    graph: &'a Graph,
    /// Nodes whose attributes have already been written.
    written: Vec<bool>,
    out: W,
}

impl<W: Write> Writer<'_, W> {
    fn indent(&mut self, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            self.out.write_char('\t')?;
        }
        Ok(())
    }

    fn graph_attrs(&mut self, attrs: &Attributes, depth: usize) -> fmt::Result {
        if attrs.is_empty() {
            return Ok(());
        }
        self.indent(depth)?;
        self.out.write_str("graph")?;
        self.attrs(attrs)?;
        self.out.write_str(";\n")
    }

    fn attrs(&mut self, attrs: &Attributes) -> fmt::Result {
        self.out.write_str(" [")?;
        for (idx, (name, value)) in attrs.iter().enumerate() {
            if idx > 0 {
                self.out.write_str(", ")?;
            }
            write!(self.out, "{}={}", quote_str(name), quote(value))?;
        }
        self.out.write_char(']')
    }

    fn endpoint(&mut self, endpoint: &Endpoint) -> fmt::Result {
        let graph = self.graph;
        write!(self.out, "{}", quote(&graph.nodes[endpoint.node].id))?;
        for port in &endpoint.port {
            write!(self.out, ":{}", quote(port))?;
        }
        Ok(())
    }

    fn body(&mut self, body: &[Stmt], depth: usize) -> fmt::Result {
        let graph = self.graph;
        for stmt in body {
            match stmt {
                &Stmt::Node(idx, declared) => {
                    let node = &graph.nodes[idx];
                    if self.written[idx] {
                        // repeated declaration, kept for subgraph membership
                        if declared {
                            self.indent(depth)?;
                            writeln!(self.out, "{};", quote(&node.id))?;
                        }
                    } else if declared || !node.attrs.is_empty() {
                        self.written[idx] = true;
                        self.indent(depth)?;
                        write!(self.out, "{}", quote(&node.id))?;
                        if !node.attrs.is_empty() {
                            self.attrs(&node.attrs)?;
                        }
                        self.out.write_str(";\n")?;
                    }
                }
                &Stmt::Edge(idx) => {
                    let edge = &graph.edges[idx];
                    self.indent(depth)?;
                    self.endpoint(&edge.tail)?;
                    self.out
                        .write_str(if graph.directed { " -> " } else { " -- " })?;
                    self.endpoint(&edge.head)?;
                    if !edge.attrs.is_empty() {
                        self.attrs(&edge.attrs)?;
                    }
                    self.out.write_str(";\n")?;
                }
                Stmt::Defaults(target, attrs) => {
                    self.indent(depth)?;
                    self.out.write_str(target.keyword())?;
                    self.attrs(attrs)?;
                    self.out.write_str(";\n")?;
                }
                Stmt::Subgraph(subgraph) => self.subgraph(subgraph, depth)?,
            }
        }
        Ok(())
    }

    fn subgraph(&mut self, subgraph: &Subgraph, depth: usize) -> fmt::Result {
        self.indent(depth)?;
        self.out.write_str("subgraph ")?;
        if let Some(id) = &subgraph.id {
            write!(self.out, "{} ", quote(id))?;
        }
        self.out.write_str("{\n")?;
        self.graph_attrs(&subgraph.attrs, depth + 1)?;
        self.body(&subgraph.body, depth + 1)?;
        self.indent(depth)?;
        self.out.write_str("}\n")
    }
}

fn quote(id: &Id) -> Cow<'_, str> {
    if id.is_html() {
        Cow::Owned(format!("<{}>", id.as_str()))
    } else {
        quote_str(id.as_str())
    }
}

fn quote_str(text: &str) -> Cow<'_, str> {
    if is_numeral(text)
        || (is_identifier(text) && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(text)))
    {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("\"{}\"", escape(text)))
    }
}

/// Escapes quotes, and pairs up an odd run of backslashes that would otherwise
/// escape a quote, a line break or the closing quote.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut backslashes = 0;
    for c in text.chars() {
        if c == '\\' {
            backslashes += 1;
        } else {
            if backslashes % 2 == 1 && matches!(c, '"' | '\n' | '\r') {
                out.push('\\');
            }
            backslashes = 0;
            if c == '"' {
                out.push('\\');
            }
        }
        out.push(c);
    }
    if backslashes % 2 == 1 {
        out.push('\\');
    }
    out
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

fn is_numeral(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    digits(int)
        && digits(frac)
        && if unsigned.contains('.') {
            !int.is_empty() || !frac.is_empty()
        } else {
            !int.is_empty()
        }
}
