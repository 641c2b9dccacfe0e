use crate::{DotError, Graph, Id, Target, lexer::Token};
use chumsky::{prelude::*, recursive::Recursive, select, Parser, Stream};
use logos::Logos;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AstGraph {
    pub(crate) strict: bool,
    pub(crate) directed: bool,
    pub(crate) id: Option<Id>,
    pub(crate) stmts: Vec<AstStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) id: Id,
    pub(crate) port: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AstSubgraph {
    pub(crate) id: Option<Id>,
    pub(crate) stmts: Vec<AstStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AstEndpoint {
    Node(NodeRef),
    Subgraph(AstSubgraph),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeOp {
    Directed,
    Undirected,
}

pub(crate) type AttrList = Vec<(Id, Id)>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AstStmt {
    Node(NodeRef, AttrList),
    Edge {
        first: AstEndpoint,
        rest: Vec<(EdgeOp, AstEndpoint)>,
        attrs: AttrList,
    },
    Defaults(Target, AttrList),
    Assign(Id, Id),
    Subgraph(AstSubgraph),
}

fn parser() -> impl Parser<Token, AstGraph, Error = Simple<Token>> {
    let quoted = select! { Token::Quoted(s) => s };

    let id = select! {
        Token::Ident(s) => Id::new(s),
        Token::Numeral(s) => Id::new(s),
        Token::Html(s) => Id::html(s),
    }
    .or(quoted
        .clone()
        .then(just(Token::Plus).ignore_then(quoted).repeated())
        .foldl(|mut acc, s| {
            acc.push_str(&s);
            acc
        })
        .map(Id::new));

    let attr_list = id
        .clone()
        .then_ignore(just(Token::Eq))
        .then(id.clone())
        .then_ignore(just(Token::Semi).or(just(Token::Comma)).or_not())
        .repeated()
        .delimited_by(just(Token::LBracket), just(Token::RBracket))
        .repeated()
        .at_least(1)
        .map(|lists| lists.into_iter().flatten().collect::<AttrList>());

    let node_ref = id
        .clone()
        .then(just(Token::Colon).ignore_then(id.clone()).repeated().at_most(2))
        .map(|(id, port)| NodeRef { id, port });

    let edge_op = just(Token::Arrow)
        .to(EdgeOp::Directed)
        .or(just(Token::Line).to(EdgeOp::Undirected));

    let stmts = recursive(|stmts: Recursive<'_, Token, Vec<AstStmt>, Simple<Token>>| {
        let subgraph = just(Token::Subgraph)
            .ignore_then(id.clone().or_not())
            .or_not()
            .then(stmts.delimited_by(just(Token::LBrace), just(Token::RBrace)))
            .map(|(id, stmts)| AstSubgraph {
                id: id.flatten(),
                stmts,
            });

        let endpoint = subgraph
            .clone()
            .map(AstEndpoint::Subgraph)
            .or(node_ref.clone().map(AstEndpoint::Node));

        let edge = endpoint
            .clone()
            .then(edge_op.then(endpoint).repeated().at_least(1))
            .then(attr_list.clone().or_not())
            .map(|((first, rest), attrs)| AstStmt::Edge {
                first,
                rest,
                attrs: attrs.unwrap_or_default(),
            });

        let defaults = choice((
            just(Token::Graph).to(Target::Graph),
            just(Token::Node).to(Target::Node),
            just(Token::Edge).to(Target::Edge),
        ))
        .then(attr_list.clone())
        .map(|(target, attrs)| AstStmt::Defaults(target, attrs));

        let assign = id
            .clone()
            .then_ignore(just(Token::Eq))
            .then(id.clone())
            .map(|(name, value)| AstStmt::Assign(name, value));

        let node = node_ref
            .clone()
            .then(attr_list.clone().or_not())
            .map(|(node, attrs)| AstStmt::Node(node, attrs.unwrap_or_default()));

        choice((
            defaults,
            edge,
            assign,
            subgraph.map(AstStmt::Subgraph),
            node,
        ))
        .then_ignore(just(Token::Semi).or_not())
        .repeated()
    });

    just(Token::Strict)
        .or_not()
        .then(
            just(Token::Graph)
                .to(false)
                .or(just(Token::Digraph).to(true)),
        )
        .then(id.or_not())
        .then(stmts.delimited_by(just(Token::LBrace), just(Token::RBrace)))
        .then_ignore(end())
        .map(|(((strict, directed), id), stmts)| AstGraph {
            strict: strict.is_some(),
            directed,
            id,
            stmts,
        })
}

fn line_of(input: &str, offset: usize) -> usize {
    input[..offset.min(input.len())].matches('\n').count() + 1
}

/// Parses a graph in the DOT language.
pub fn parse(input: &str) -> Result<Graph, DotError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(input).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(DotError::Lex {
                    line: line_of(input, span.start),
                    text: input[span].to_owned(),
                });
            }
        }
    }
    let end = input.len();
    let ast = parser()
        .parse(Stream::from_iter(end..end + 1, tokens.into_iter()))
        .map_err(|errs| {
            // chumsky reports at least one error on failure
            let err = &errs[0];
            DotError::Parse {
                line: line_of(input, err.span().start),
                found: err
                    .found()
                    .map_or_else(|| "end of input".to_owned(), |token| format!("{token:?}")),
            }
        })?;
    Graph::from_ast(ast)
}
