use crate::{Attributes, Graph, Id, Rule, Stylesheet, Target, graph::effective};
use log::{debug, warn};

/// The effect of a rule set on one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// Attribute assignments, in application order.
    pub updates: Vec<(String, String)>,
    /// Attributes referenced by the templates but absent from the element.
    pub missing: Vec<String>,
}

/// Computes the updates that `rules` make to an element with attributes `attrs`.
///
/// Conditions and templates all see `attrs` as it is before any update.
pub fn rewrite(attrs: &Attributes, rules: &[Rule]) -> Rewrite {
    let mut rewrite = Rewrite::default();
    for rule in rules.iter().filter(|rule| rule.applies(attrs)) {
        for update in &rule.updates {
            let value = update.template.render(attrs, &mut rewrite.missing);
            rewrite.updates.push((update.attribute.clone(), value));
        }
    }
    rewrite
}

/// Applies `rules` to an element, warning once about each missing attribute.
///
/// Rules see the inherited `defaults` overridden by the explicit `attrs`;
/// updates go to `attrs`. Returns the number of updated attributes.
pub fn apply(
    attrs: &mut Attributes,
    defaults: &Attributes,
    rules: &[Rule],
    element: &str,
) -> usize {
    let Rewrite { updates, missing } = rewrite(&effective(attrs, defaults), rules);
    for name in missing {
        warn!(target: "rewrite", "{element} has no attribute {name}");
    }
    let count = updates.len();
    for (name, value) in updates {
        attrs.insert(name, Id::new(value));
    }
    count
}

impl Graph {
    /// Applies rules to the root graph.
    pub fn rewrite_graph(&mut self, rules: &[Rule]) {
        let element = match &self.id {
            Some(id) => format!("graph {id}"),
            None => "graph".to_owned(),
        };
        let count = apply(&mut self.attrs, &Attributes::new(), rules, &element);
        debug!(target: "rewrite", "{count} updates on {element}");
    }

    /// Applies rules to every node.
    pub fn rewrite_nodes(&mut self, rules: &[Rule]) {
        if rules.is_empty() {
            return;
        }
        let mut count = 0;
        for node in &mut self.nodes {
            let element = format!("node {}", node.id);
            count += apply(&mut node.attrs, &node.defaults, rules, &element);
        }
        debug!(target: "rewrite", "{count} updates on nodes");
    }

    /// Applies rules to every edge.
    pub fn rewrite_edges(&mut self, rules: &[Rule]) {
        if rules.is_empty() {
            return;
        }
        let mut count = 0;
        for idx in 0..self.edges.len() {
            let element = format!("edge {}", self.edge_label(&self.edges[idx]));
            let edge = &mut self.edges[idx];
            count += apply(&mut edge.attrs, &edge.defaults, rules, &element);
        }
        debug!(target: "rewrite", "{count} updates on edges");
    }

    /// Applies rules to the given kind of element.
    pub fn rewrite(&mut self, target: Target, rules: &[Rule]) {
        match target {
            Target::Graph => self.rewrite_graph(rules),
            Target::Node => self.rewrite_nodes(rules),
            Target::Edge => self.rewrite_edges(rules),
        }
    }

    /// Applies a stylesheet: graph rules, then node rules, then edge rules.
    pub fn apply_stylesheet(&mut self, stylesheet: &Stylesheet) {
        for target in [Target::Graph, Target::Node, Target::Edge] {
            self.rewrite(target, stylesheet.rules(target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, Update, parse};
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<String>>);

    impl log::Log for Capture {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.0.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static WARNINGS: Capture = Capture(Mutex::new(Vec::new()));

    fn warnings(prefix: &str) -> Vec<String> {
        let _ = log::set_logger(&WARNINGS);
        log::set_max_level(log::LevelFilter::Warn);
        WARNINGS
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Id::new(*v)))
            .collect()
    }

    fn rule(conditions: &[(&str, &str)], updates: &[(&str, &str)]) -> Rule {
        Rule {
            conditions: conditions
                .iter()
                .map(|(a, p)| Condition::full(*a, p).unwrap())
                .collect(),
            updates: updates.iter().map(|(a, v)| Update::new(*a, v)).collect(),
        }
    }

    #[test]
    fn snapshot_semantics() {
        let rules = [
            rule(&[("color", "red")], &[("color", "blue"), ("label", "%color%")]),
            // sees the original color
            rule(&[("color", "red")], &[("xlabel", "was %color%")]),
            rule(&[("color", "blue")], &[("shape", "box")]),
        ];
        let rewrite = rewrite(&attrs(&[("color", "red")]), &rules);
        assert_eq!(
            rewrite.updates,
            vec![
                ("color".to_owned(), "blue".to_owned()),
                ("label".to_owned(), "red".to_owned()),
                ("xlabel".to_owned(), "was red".to_owned()),
            ]
        );
        assert!(rewrite.missing.is_empty());
    }

    #[test]
    fn later_rule_wins() {
        let rules = [rule(&[], &[("color", "blue")]), rule(&[], &[("color", "green")])];
        let mut target = attrs(&[("color", "red")]);
        assert_eq!(apply(&mut target, &Attributes::new(), &rules, "n"), 2);
        assert_eq!(target.get("color"), Some(&Id::new("green")));
    }

    #[test]
    fn missing_references() {
        let rules = [
            rule(&[], &[("label", "%name% %name%"), ("tooltip", "%name%/%id%")]),
            rule(&[("absent", ".*")], &[("color", "%other%")]),
        ];
        let rewrite = rewrite(&Attributes::new(), &rules);
        assert_eq!(
            rewrite.updates,
            vec![
                ("label".to_owned(), " ".to_owned()),
                ("tooltip".to_owned(), "/".to_owned()),
            ]
        );
        assert_eq!(rewrite.missing, ["name", "id"]);
    }

    #[test]
    fn one_warning_per_missing_attribute() {
        let _ = warnings("");
        let rules = [
            rule(&[], &[("label", "%name% %name%"), ("tooltip", "%name%/%kind%")]),
            rule(&[], &[("xlabel", "%kind%")]),
        ];
        let mut target = attrs(&[("color", "red")]);
        apply(&mut target, &Attributes::new(), &rules, "node lonely");
        apply(&mut target, &Attributes::new(), &rules, "node lonely-again");
        assert_eq!(
            warnings("node lonely "),
            [
                "node lonely has no attribute name",
                "node lonely has no attribute kind"
            ]
        );
        assert_eq!(warnings("node lonely-again ").len(), 2);
    }

    #[test]
    fn defaults_are_visible_to_rules() {
        let mut graph =
            parse("digraph { node [shape=circle]; edge [style=bold]; s0; s1 [shape=box]; s0 -> s1 }")
                .unwrap();
        graph.rewrite_nodes(&[rule(&[("shape", "circle")], &[("color", "red")])]);
        graph.rewrite_nodes(&[rule(&[], &[("xlabel", "%shape%")])]);
        graph.rewrite_edges(&[rule(&[("style", "bold")], &[("label", "%style%!")])]);

        let s0 = graph.node("s0").unwrap();
        assert_eq!(s0.attrs.get("color"), Some(&Id::new("red")));
        assert_eq!(s0.attrs.get("xlabel"), Some(&Id::new("circle")));
        assert_eq!(s0.attrs.get("shape"), None);
        let s1 = graph.node("s1").unwrap();
        assert_eq!(s1.attrs.get("color"), None);
        assert_eq!(s1.attrs.get("xlabel"), Some(&Id::new("box")));
        assert!(warnings("node s").is_empty());
        assert_eq!(
            graph.to_string(),
            "digraph {\n\tnode [shape=circle];\n\tedge [style=bold];\n\ts0 [color=red, xlabel=circle];\n\ts1 [shape=box, xlabel=box];\n\ts0 -> s1 [label=\"bold!\"];\n}\n"
        );
    }

    #[test]
    fn graph_passes() {
        let mut graph = parse("digraph G { a [label=init]; b; a -> b [label=go] }").unwrap();
        graph.rewrite(Target::Graph, &[rule(&[], &[("rankdir", "LR")])]);
        graph.rewrite(
            Target::Node,
            &[rule(&[("label", "init")], &[("shape", "doublecircle")])],
        );
        graph.rewrite(Target::Edge, &[rule(&[], &[("xlabel", "[%label%]")])]);
        assert_eq!(
            graph.to_string(),
            "digraph G {\n\tgraph [rankdir=LR];\n\ta [label=init, shape=doublecircle];\n\tb;\n\ta -> b [label=go, xlabel=\"[go]\"];\n}\n"
        );
    }
}
