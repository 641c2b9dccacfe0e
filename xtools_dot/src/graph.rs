use crate::{
    DotError,
    parser::{AstEndpoint, AstGraph, AstStmt, AstSubgraph, AttrList, EdgeOp, NodeRef},
};
use indexmap::IndexSet;
use serde::Deserialize;
use std::{borrow::Cow, collections::HashMap, fmt};
use xtools_core::Named;

/// An identifier or attribute value of the DOT language.
///
/// Plain identifiers, numerals and quoted strings are all the same text;
/// HTML strings are kept apart since they are written back between angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id {
    text: String,
    html: bool,
}

impl Id {
    /// A textual identifier.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
        }
    }

    /// An HTML string, without the enclosing angle brackets.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: true,
        }
    }

    /// The text of the identifier.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether this is an HTML string.
    pub fn is_html(&self) -> bool {
        self.html
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Attributes of a graph element, in declaration order.
pub type Attributes = Named<Id>;

/// The kind of element a rule or an attribute statement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The root graph.
    Graph,
    /// Nodes.
    Node,
    /// Edges.
    Edge,
}

impl Target {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Target::Graph => "graph",
            Target::Node => "node",
            Target::Edge => "edge",
        }
    }
}

/// A node of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node identifier.
    pub id: Id,
    /// Explicit attributes of the node, merged over all its declarations.
    pub attrs: Attributes,
    /// `node [...]` defaults in force where the node was created.
    pub defaults: Attributes,
}

impl Node {
    /// The attributes in force: defaults overridden by explicit attributes.
    pub fn effective_attrs(&self) -> Cow<'_, Attributes> {
        effective(&self.attrs, &self.defaults)
    }
}

/// One end of an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Index of the node in [`Graph::nodes`].
    pub node: usize,
    /// Port and compass point, if any.
    pub port: Vec<Id>,
}

/// An edge of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source end.
    pub tail: Endpoint,
    /// Target end.
    pub head: Endpoint,
    /// Explicit attributes of the edge.
    pub attrs: Attributes,
    /// `edge [...]` defaults in force where the edge was created.
    pub defaults: Attributes,
}

impl Edge {
    /// The attributes in force: defaults overridden by explicit attributes.
    pub fn effective_attrs(&self) -> Cow<'_, Attributes> {
        effective(&self.attrs, &self.defaults)
    }
}

pub(crate) fn effective<'a>(attrs: &'a Attributes, defaults: &Attributes) -> Cow<'a, Attributes> {
    if defaults.is_empty() {
        return Cow::Borrowed(attrs);
    }
    let mut effective = defaults.clone();
    effective.extend(attrs.clone());
    Cow::Owned(effective)
}

/// Node and edge defaults of a graph or subgraph body, inherited by nested subgraphs.
#[derive(Debug, Clone, Default)]
struct Scope {
    node: Attributes,
    edge: Attributes,
}

/// Statements of a graph body, kept so that the graph can be written back in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    /// A node, and whether it is declared by a node statement rather than mentioned by an edge.
    Node(usize, bool),
    Edge(usize),
    Defaults(Target, Attributes),
    Subgraph(Subgraph),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Subgraph {
    pub(crate) id: Option<Id>,
    pub(crate) attrs: Attributes,
    pub(crate) body: Vec<Stmt>,
}

/// A DOT graph, normalized into unique nodes and single edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Whether the graph is strict.
    pub strict: bool,
    /// Whether the graph is a digraph.
    pub directed: bool,
    /// Name of the graph.
    pub id: Option<Id>,
    /// Attributes of the root graph.
    pub attrs: Attributes,
    /// Nodes, in order of first appearance.
    pub nodes: Vec<Node>,
    /// Edges, in order of appearance.
    pub edges: Vec<Edge>,
    pub(crate) body: Vec<Stmt>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// An empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            strict: false,
            directed,
            id: None,
            attrs: Attributes::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            body: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Finds a node by identifier.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// A printable description of an edge, such as `a -> b`.
    pub fn edge_label(&self, edge: &Edge) -> String {
        format!(
            "{} {} {}",
            self.nodes[edge.tail.node].id,
            if self.directed { "->" } else { "--" },
            self.nodes[edge.head.node].id
        )
    }

    pub(crate) fn from_ast(ast: AstGraph) -> Result<Self, DotError> {
        let mut graph = Graph::new(ast.directed);
        graph.strict = ast.strict;
        graph.id = ast.id;
        let mut attrs = Attributes::new();
        let mut mentioned = IndexSet::new();
        graph.body = graph.build_body(ast.stmts, &mut attrs, &mut mentioned, Scope::default())?;
        graph.attrs = attrs;
        Ok(graph)
    }

    fn build_body(
        &mut self,
        stmts: Vec<AstStmt>,
        attrs: &mut Attributes,
        mentioned: &mut IndexSet<usize>,
        mut scope: Scope,
    ) -> Result<Vec<Stmt>, DotError> {
        let mut body = Vec::new();
        for stmt in stmts {
            match stmt {
                AstStmt::Node(NodeRef { id, .. }, list) => {
                    let idx = self.declare(id, collect(list), &scope, &mut body);
                    mentioned.insert(idx);
                }
                AstStmt::Edge { first, rest, attrs } => {
                    let attrs = collect(attrs);
                    let mut tails = self.endpoints(first, &mut body, mentioned, &scope)?;
                    for (op, endpoint) in rest {
                        if (op == EdgeOp::Directed) != self.directed {
                            return Err(DotError::EdgeOp {
                                directed: self.directed,
                            });
                        }
                        let heads = self.endpoints(endpoint, &mut body, mentioned, &scope)?;
                        for tail in &tails {
                            for head in &heads {
                                body.push(Stmt::Edge(self.edges.len()));
                                self.edges.push(Edge {
                                    tail: tail.clone(),
                                    head: head.clone(),
                                    attrs: attrs.clone(),
                                    defaults: scope.edge.clone(),
                                });
                            }
                        }
                        tails = heads;
                    }
                }
                AstStmt::Defaults(Target::Graph, list) => {
                    for (name, value) in list {
                        attrs.insert(name.text, value);
                    }
                }
                AstStmt::Defaults(target, list) => {
                    let attrs = collect(list);
                    let defaults = match target {
                        Target::Node => &mut scope.node,
                        _ => &mut scope.edge,
                    };
                    defaults.extend(attrs.clone());
                    body.push(Stmt::Defaults(target, attrs));
                }
                AstStmt::Assign(name, value) => {
                    attrs.insert(name.text, value);
                }
                AstStmt::Subgraph(subgraph) => {
                    let subgraph = self.build_subgraph(subgraph, mentioned, &scope)?;
                    body.push(Stmt::Subgraph(subgraph));
                }
            }
        }
        Ok(body)
    }

    fn build_subgraph(
        &mut self,
        subgraph: AstSubgraph,
        mentioned: &mut IndexSet<usize>,
        scope: &Scope,
    ) -> Result<Subgraph, DotError> {
        let mut attrs = Attributes::new();
        let mut inner = IndexSet::new();
        let body = self.build_body(subgraph.stmts, &mut attrs, &mut inner, scope.clone())?;
        mentioned.extend(inner);
        Ok(Subgraph {
            id: subgraph.id,
            attrs,
            body,
        })
    }

    /// Resolves an edge endpoint into the nodes it stands for.
    fn endpoints(
        &mut self,
        endpoint: AstEndpoint,
        body: &mut Vec<Stmt>,
        mentioned: &mut IndexSet<usize>,
        scope: &Scope,
    ) -> Result<Vec<Endpoint>, DotError> {
        match endpoint {
            AstEndpoint::Node(NodeRef { id, port }) => {
                let node = self.reference(id, scope, body);
                mentioned.insert(node);
                Ok(vec![Endpoint { node, port }])
            }
            AstEndpoint::Subgraph(subgraph) => {
                let mut inner = IndexSet::new();
                let subgraph = self.build_subgraph(subgraph, &mut inner, scope)?;
                body.push(Stmt::Subgraph(subgraph));
                mentioned.extend(inner.iter().copied());
                Ok(inner
                    .into_iter()
                    .map(|node| Endpoint {
                        node,
                        port: Vec::new(),
                    })
                    .collect())
            }
        }
    }

    /// A node statement: the node is written where it is declared.
    fn declare(
        &mut self,
        id: Id,
        attrs: Attributes,
        scope: &Scope,
        body: &mut Vec<Stmt>,
    ) -> usize {
        let idx = match self.index.get(id.as_str()) {
            Some(&idx) => idx,
            None => self.create(id, scope),
        };
        for (name, value) in attrs {
            self.nodes[idx].attrs.insert(name, value);
        }
        body.push(Stmt::Node(idx, true));
        idx
    }

    /// A node mentioned by an edge, which is only written on its own when first created.
    fn reference(&mut self, id: Id, scope: &Scope, body: &mut Vec<Stmt>) -> usize {
        match self.index.get(id.as_str()) {
            Some(&idx) => idx,
            None => {
                let idx = self.create(id, scope);
                body.push(Stmt::Node(idx, false));
                idx
            }
        }
    }

    fn create(&mut self, id: Id, scope: &Scope) -> usize {
        let idx = self.nodes.len();
        self.index.insert(id.text.clone(), idx);
        self.nodes.push(Node {
            id,
            attrs: Attributes::new(),
            defaults: scope.node.clone(),
        });
        idx
    }
}

fn collect(list: AttrList) -> Attributes {
    let mut attrs = Attributes::new();
    for (name, value) in list {
        attrs.insert(name.text, value);
    }
    attrs
}
