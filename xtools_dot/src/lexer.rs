use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub(crate) enum Token {
    #[token("strict", ignore(ascii_case))]
    Strict,

    #[token("graph", ignore(ascii_case))]
    Graph,

    #[token("digraph", ignore(ascii_case))]
    Digraph,

    #[token("node", ignore(ascii_case))]
    Node,

    #[token("edge", ignore(ascii_case))]
    Edge,

    #[token("subgraph", ignore(ascii_case))]
    Subgraph,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=")]
    Eq,

    #[token(";")]
    Semi,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("+")]
    Plus,

    #[token("->")]
    Arrow,

    #[token("--")]
    Line,

    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[regex(r"-?(\.[0-9]+|[0-9]+(\.[0-9]*)?)", |lex| lex.slice().to_owned())]
    Numeral(String),

    #[regex(r#""([^"\\]|\\(.|\n))*""#, quoted)]
    Quoted(String),

    #[token("<", html)]
    Html(String),
}

/// Strips the quotes of a quoted string and resolves escaped quotes and line continuations.
/// Other escape sequences (`\n`, `\l`, `\\`...) belong to Graphviz and are kept verbatim.
fn quoted(lex: &mut Lexer<Token>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('\r') if chars.peek() == Some(&'\n') => {
                chars.next();
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Consumes an HTML string up to the `>` matching the opening `<`.
fn html(lex: &mut Lexer<Token>) -> Option<String> {
    let mut depth = 1usize;
    for (idx, c) in lex.remainder().char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    let content = lex.remainder()[..idx].to_owned();
                    lex.bump(idx + 1);
                    return Some(content);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Token::lexer(input).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(
            lex("DiGraph Node graphs"),
            vec![Token::Digraph, Token::Node, Token::Ident("graphs".into())]
        );
    }

    #[test]
    fn comments() {
        assert_eq!(
            lex("# line 1\na // b\n/* c\n * d */ -> e"),
            vec![
                Token::Ident("a".into()),
                Token::Arrow,
                Token::Ident("e".into())
            ]
        );
    }

    #[test]
    fn strings() {
        assert_eq!(
            lex(r#""say \"hi\"\l" -1.5 .5"#),
            vec![
                Token::Quoted(r#"say "hi"\l"#.into()),
                Token::Numeral("-1.5".into()),
                Token::Numeral(".5".into()),
            ]
        );
        assert_eq!(lex("\"a\\\nb\""), vec![Token::Quoted("ab".into())]);
    }

    #[test]
    fn html_strings() {
        assert_eq!(
            lex("<<b>bold</b>> ;"),
            vec![Token::Html("<b>bold</b>".into()), Token::Semi]
        );
        assert!(Token::lexer("<a").any(|t| t.is_err()));
    }
}
