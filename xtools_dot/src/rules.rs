use crate::{Attributes, RuleError, Target, Template};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use xtools_core::{Named, load_json};

/// Requires the value of an attribute to match a regex.
#[derive(Debug, Clone)]
pub struct Condition {
    /// Attribute name.
    pub attribute: String,
    /// Anchored pattern for the value.
    pub pattern: Regex,
}

impl Condition {
    /// A condition satisfied when `pattern` matches the whole value.
    pub fn full(attribute: impl Into<String>, pattern: &str) -> Result<Self, RuleError> {
        Self::anchored(attribute.into(), &format!("^(?:{pattern})$"))
    }

    /// A condition satisfied when `pattern` matches at the start of the value.
    pub fn prefix(attribute: impl Into<String>, pattern: &str) -> Result<Self, RuleError> {
        Self::anchored(attribute.into(), &format!("^(?:{pattern})"))
    }

    fn anchored(attribute: String, pattern: &str) -> Result<Self, RuleError> {
        match Regex::new(pattern) {
            Ok(pattern) => Ok(Self { attribute, pattern }),
            Err(source) => Err(RuleError::Regex { attribute, source }),
        }
    }

    /// Whether `attrs` satisfies the condition. An absent attribute never does.
    pub fn matches(&self, attrs: &Attributes) -> bool {
        attrs
            .get(&self.attribute)
            .is_some_and(|value| self.pattern.is_match(value.as_str()))
    }
}

/// Sets an attribute to the instantiation of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Attribute to set.
    pub attribute: String,
    /// Its new value.
    pub template: Template,
}

impl Update {
    /// An update of `attribute` to `value`, with references resolved at application.
    pub fn new(attribute: impl Into<String>, value: &str) -> Self {
        Self {
            attribute: attribute.into(),
            template: Template::parse(value),
        }
    }
}

/// Updates applied to the elements satisfying all conditions.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    /// All must hold for the rule to apply.
    pub conditions: Vec<Condition>,
    /// Applied in order.
    pub updates: Vec<Update>,
}

impl Rule {
    /// Whether the rule applies to an element with attributes `attrs`.
    pub fn applies(&self, attrs: &Attributes) -> bool {
        self.conditions.iter().all(|condition| condition.matches(attrs))
    }

    /// A rule from a command-line group `COND attr=value...`.
    ///
    /// `COND` is a `&&`-separated conjunction of `attr=regex`,
    /// each regex having to match the whole value.
    pub fn from_args(args: &[String]) -> Result<Self, RuleError> {
        let (condition, updates) = args.split_first().ok_or(RuleError::MissingCondition)?;
        let mut conditions = Vec::new();
        for part in split_conjunction(condition)? {
            let part = part.replace('\'', "");
            if part.is_empty() {
                continue;
            }
            let (attribute, pattern) = split_assignment(&part)?;
            conditions.push(Condition::full(attribute, pattern)?);
        }
        let mut rule = Self::updates_from_args(updates)?;
        rule.conditions = conditions;
        Ok(rule)
    }

    /// An unconditional rule from a command-line group `attr=value...`.
    pub fn updates_from_args(args: &[String]) -> Result<Self, RuleError> {
        let updates = args
            .iter()
            .map(|arg| {
                let arg = arg.replace('\'', "");
                split_assignment(&arg).map(|(attribute, value)| Update::new(attribute, value))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            conditions: Vec::new(),
            updates,
        })
    }
}

/// Splits `attr=value` at the first `=`; neither side may be empty.
fn split_assignment(text: &str) -> Result<(&str, &str), RuleError> {
    match text.split_once('=') {
        Some((attribute, value)) if !attribute.is_empty() && !value.is_empty() => {
            Ok((attribute, value))
        }
        _ => Err(RuleError::Assignment(text.to_owned())),
    }
}

/// Splits a condition at each `&&` outside single quotes.
///
/// Quotes are kept in the parts; a space outside quotes is an error.
fn split_conjunction(text: &str) -> Result<Vec<&str>, RuleError> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\'' => quoted = !quoted,
            b'&' if !quoted && bytes.get(idx + 1) == Some(&b'&') => {
                parts.push(&text[start..idx]);
                idx += 1;
                start = idx + 1;
            }
            b' ' if !quoted => return Err(RuleError::Space(text.to_owned())),
            _ => {}
        }
        idx += 1;
    }
    if quoted {
        return Err(RuleError::Quote(text.to_owned()));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// A named rule of a style file.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    /// Elements the rule applies to.
    pub object: Target,
    /// Attribute patterns, matched at the start of the values.
    #[serde(default)]
    pub condition: Named<String>,
    /// Attribute templates.
    pub updates: Named<String>,
}

/// Rules grouped by the elements they apply to.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    /// Rules for the root graph.
    pub graph: Vec<Rule>,
    /// Rules for nodes.
    pub nodes: Vec<Rule>,
    /// Rules for edges.
    pub edges: Vec<Rule>,
}

impl Stylesheet {
    /// Reads a style file: a JSON object of named [`RuleSpec`]s.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let specs: Named<RuleSpec> = load_json(path)?;
        Self::from_specs(specs)
    }

    /// Compiles rule specifications, keeping their order within each kind of element.
    pub fn from_specs(specs: Named<RuleSpec>) -> Result<Self, RuleError> {
        let mut stylesheet = Self::default();
        for (name, spec) in specs {
            let mut rule = Rule::default();
            for (attribute, pattern) in spec.condition {
                if attribute.is_empty() || pattern.is_empty() {
                    return Err(RuleError::EmptyCondition(name));
                }
                rule.conditions.push(Condition::prefix(attribute, &pattern)?);
            }
            rule.updates = spec
                .updates
                .iter()
                .map(|(attribute, value)| Update::new(attribute, value))
                .collect();
            stylesheet.rules_mut(spec.object).push(rule);
        }
        Ok(stylesheet)
    }

    /// Rules for the given kind of element.
    pub fn rules(&self, target: Target) -> &[Rule] {
        match target {
            Target::Graph => &self.graph,
            Target::Node => &self.nodes,
            Target::Edge => &self.edges,
        }
    }

    /// Mutable rules for the given kind of element.
    pub fn rules_mut(&mut self, target: Target) -> &mut Vec<Rule> {
        match target {
            Target::Graph => &mut self.graph,
            Target::Node => &mut self.nodes,
            Target::Edge => &mut self.edges,
        }
    }
}
