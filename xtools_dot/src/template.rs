use crate::Attributes;
use regex::Regex;
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%[^%]*%").expect("reference pattern is valid"));

/// A piece of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied as is.
    Literal(String),
    /// The value of the named attribute.
    Reference(String),
}

/// An attribute value in which `%name%` stands for the value of attribute `name`
/// and `%%` for a percent sign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template(Vec<Segment>);

impl Template {
    /// Splits `text` into literal and reference segments.
    ///
    /// A `%` with no closing `%` is kept literally.
    pub fn parse(text: &str) -> Self {
        let mut template = Template::default();
        let mut last = 0;
        for found in REFERENCE.find_iter(text) {
            template.push_literal(&text[last..found.start()]);
            let name = &text[found.start() + 1..found.end() - 1];
            if name.is_empty() {
                template.push_literal("%");
            } else {
                template.0.push(Segment::Reference(name.to_owned()));
            }
            last = found.end();
        }
        template.push_literal(&text[last..]);
        template
    }

    fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(literal)) = self.0.last_mut() {
            literal.push_str(text);
        } else {
            self.0.push(Segment::Literal(text.to_owned()));
        }
    }

    /// The segments of the template.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Instantiates the template with the values in `attrs`.
    ///
    /// Absent attributes are replaced by the empty string,
    /// and their names are added to `missing` unless already there.
    pub fn render(&self, attrs: &Attributes, missing: &mut Vec<String>) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Reference(name) => match attrs.get(name) {
                    Some(value) => out.push_str(value.as_str()),
                    None => {
                        if !missing.contains(name) {
                            missing.push(name.clone());
                        }
                    }
                },
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;

    #[test]
    fn segments() {
        assert_eq!(
            Template::parse("%label% (%%) 50%").segments(),
            [
                Segment::Reference("label".into()),
                Segment::Literal(" (%) 50%".into()),
            ]
        );
        assert_eq!(
            Template::parse("red").segments(),
            [Segment::Literal("red".into())]
        );
        assert!(Template::parse("").segments().is_empty());
    }

    #[test]
    fn render() {
        let mut attrs = Attributes::new();
        attrs.insert("label".to_owned(), Id::new("s0"));
        let template = Template::parse("%label%/%xlabel%/%xlabel%");
        let mut missing = Vec::new();
        assert_eq!(template.render(&attrs, &mut missing), "s0//");
        assert_eq!(missing, ["xlabel"]);
    }
}
