//! Textual query syntax.
//!
//! A query string is a whitespace-separated list of tokens. Single or double
//! quotes group words into one token and a backslash escapes the next
//! character. Each token is split on its first one or two colons:
//!
//! ```text
//! op:field:value    e.g. gte:rank:3
//! field:value       e.g. kind:note       (operator eq)
//! value             e.g. hello           (free text)
//! ```
//!
//! All field constraints are ANDed. Free-text tokens are joined with single
//! spaces into one fieldless `eq` constraint, ORed with that conjunction: a
//! version matches when it satisfies every field constraint or contains the
//! text.

use std::str::FromStr;

use crate::error::QueryError;
use crate::query::{Constraint, Node, Operator, Query};

impl Query {
    /// Parse user input into a query.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let mut constraints = Vec::new();
        let mut fieldless = Vec::new();

        for token in tokenize(input)? {
            let (op, field, value) = split_token(&token);
            if op.is_empty() && field.is_empty() {
                fieldless.push(value.to_string());
                continue;
            }
            let operator: Operator = op.parse()?;
            let field = (!field.is_empty()).then(|| field.to_string());
            constraints.push(Node::Constraint(Constraint::new(operator, field, value)));
        }

        let query = Query::new().and(constraints);
        if fieldless.is_empty() {
            return Ok(query);
        }
        Ok(query.or([Constraint::new(Operator::Equal, None, fieldless.join(" "))]))
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_token(token: &str) -> (&str, &str, &str) {
    let mut parts = token.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(op), Some(field), Some(value)) => (op, field, value),
        (Some(field), Some(value), None) => ("", field, value),
        (Some(value), None, None) => ("", "", value),
        _ => ("", "", ""),
    }
}

fn tokenize(input: &str) -> Result<Vec<String>, QueryError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                current.push(chars.next().unwrap_or('\\'));
                in_token = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(QueryError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{eq, gte, text, Node};

    #[test]
    fn tokenizer_respects_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"a "b c" 'd e' f\ g title:"x y""#).unwrap(),
            vec!["a", "b c", "d e", "f g", "title:x y"]
        );
        assert_eq!(tokenize("  ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#""""#).unwrap(), vec![""]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert_eq!(tokenize("\"open").unwrap_err(), QueryError::UnterminatedQuote);
    }

    #[test]
    fn field_value_defaults_to_equal() {
        let q = Query::parse("field:foo").unwrap();
        assert_eq!(q.root, Some(Node::Constraint(eq("field", "foo"))));
    }

    #[test]
    fn operator_field_value() {
        let q = Query::parse("gte:rank:3").unwrap();
        assert_eq!(q.root, Some(Node::Constraint(gte("rank", "3"))));
    }

    #[test]
    fn only_first_two_colons_split() {
        let q = Query::parse("eq:url:http://example.com").unwrap();
        assert_eq!(q.root, Some(Node::Constraint(eq("url", "http://example.com"))));
    }

    #[test]
    fn free_text_tokens_are_joined_into_one_constraint() {
        let q = Query::parse("kind:note hello  world").unwrap();
        assert_eq!(
            q.root,
            Some(Node::Or(vec![
                Node::Constraint(eq("kind", "note")),
                Node::Constraint(text("hello world")),
            ]))
        );
    }

    #[test]
    fn free_text_is_ored_with_the_field_conjunction() {
        let q = Query::parse("kind:note gte:rank:3 hello").unwrap();
        assert_eq!(
            q.root,
            Some(Node::Or(vec![
                Node::And(vec![
                    Node::Constraint(eq("kind", "note")),
                    Node::Constraint(gte("rank", "3")),
                ]),
                Node::Constraint(text("hello")),
            ]))
        );

        let q = Query::parse("hello world").unwrap();
        assert_eq!(q.root, Some(Node::Constraint(text("hello world"))));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        assert_eq!(
            Query::parse("like:title:foo").unwrap_err(),
            QueryError::UnknownOperator("like".into())
        );
    }

    #[test]
    fn empty_input_matches_everything() {
        assert_eq!(Query::parse("").unwrap(), Query::new());
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let q: Query = "field:foo".parse().unwrap();
        assert_eq!(q, Query::parse("field:foo").unwrap());
    }
}
