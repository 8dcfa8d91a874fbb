//! Boolean query language shared by the inverted-list and fuzzy set models.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or   := and ("OR" and)*
//! and  := not (["AND"] not)*      adjacent operands are an implicit AND
//! not  := "NOT" not | atom
//! atom := term | "(" or ")"
//! ```
//!
//! Operators are recognized only as the exact upper-case words `AND`, `OR`, `NOT`.
//! Parentheses and `NOT` may nest at most [`MAX_DEPTH`] levels. Runs of the same binary
//! operator are built as balanced trees, so the tree stays shallow for long flat queries.

use crate::error::QueryError;
use crate::tokenizer::Preprocessing;
use std::fmt::{self, Display};

pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Token::Term(t) => t,
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::LParen => "(",
            Token::RParen => ")",
        }
    }

    fn starts_operand(&self) -> bool {
        matches!(self, Token::Term(_) | Token::Not | Token::LParen)
    }
}

/// Expression tree over leaf terms of type `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<T = String> {
    Term(T),
    Not(Box<Expr<T>>),
    And(Box<Expr<T>>, Box<Expr<T>>),
    Or(Box<Expr<T>>, Box<Expr<T>>),
}

impl<T> Expr<T> {
    pub fn and(a: Expr<T>, b: Expr<T>) -> Self {
        Expr::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: Expr<T>, b: Expr<T>) -> Self {
        Expr::Or(Box::new(a), Box::new(b))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(a: Expr<T>) -> Self {
        Expr::Not(Box::new(a))
    }

    /// Rebuild the tree with every leaf replaced by the subtree `f` returns for it.
    pub fn expand_terms<U>(&self, f: &mut impl FnMut(&T) -> Expr<U>) -> Expr<U> {
        match self {
            Expr::Term(t) => f(t),
            Expr::Not(a) => Expr::not(a.expand_terms(f)),
            Expr::And(a, b) => {
                let a = a.expand_terms(f);
                Expr::and(a, b.expand_terms(f))
            }
            Expr::Or(a, b) => {
                let a = a.expand_terms(f);
                Expr::or(a, b.expand_terms(f))
            }
        }
    }

    /// Bottom-up evaluation: `leaf` scores terms, `and`/`or`/`not` combine child results.
    pub fn fold<R>(
        &self,
        leaf: &mut impl FnMut(&T) -> R,
        and: &mut impl FnMut(R, R) -> R,
        or: &mut impl FnMut(R, R) -> R,
        not: &mut impl FnMut(R) -> R,
    ) -> R {
        match self {
            Expr::Term(t) => leaf(t),
            Expr::Not(a) => {
                let a = a.fold(leaf, and, or, not);
                not(a)
            }
            Expr::And(a, b) => {
                let a = a.fold(leaf, and, or, not);
                let b = b.fold(leaf, and, or, not);
                and(a, b)
            }
            Expr::Or(a, b) => {
                let a = a.fold(leaf, and, or, not);
                let b = b.fold(leaf, and, or, not);
                or(a, b)
            }
        }
    }
}

impl Expr<String> {
    /// Run every literal through `preprocessing`. A literal that preprocessing removes becomes
    /// `None`, which matches nothing; one that stems into several words becomes their
    /// conjunction.
    pub fn preprocessed(&self, preprocessing: Preprocessing) -> Expr<Option<String>> {
        self.expand_terms(&mut |literal: &String| {
            let terms: Vec<Expr<Option<String>>> =
                preprocessing.apply_literal(literal).into_iter().map(|t| Expr::Term(Some(t))).collect();
            join_balanced(terms, Expr::and).unwrap_or(Expr::Term(None))
        })
    }
}

/// Combine operands left to right into a tree of logarithmic depth.
fn join_balanced<T>(mut level: Vec<Expr<T>>, join: fn(Expr<T>, Expr<T>) -> Expr<T>) -> Option<Expr<T>> {
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut operands = level.into_iter();
        while let Some(a) = operands.next() {
            next.push(match operands.next() {
                Some(b) => join(a, b),
                None => a,
            });
        }
        level = next;
    }
    level.pop()
}

impl Display for Expr<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => write!(f, "{t}"),
            Expr::Not(a) => write!(f, "NOT {a}"),
            Expr::And(a, b) => write!(f, "({a} AND {b})"),
            Expr::Or(a, b) => write!(f, "({a} OR {b})"),
        }
    }
}

fn lex(query: &str) -> Vec<(Token, usize)> {
    fn flush(word: &mut String, start: usize, out: &mut Vec<(Token, usize)>) {
        if word.is_empty() {
            return;
        }
        let token = match word.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Term(word.clone()),
        };
        out.push((token, start));
        word.clear();
    }

    let mut out = Vec::new();
    let mut word = String::new();
    let mut start = 0;
    for (i, c) in query.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            flush(&mut word, start, &mut out);
            match c {
                '(' => out.push((Token::LParen, i)),
                ')' => out.push((Token::RParen, i)),
                _ => {}
            }
        } else {
            if word.is_empty() {
                start = i;
            }
            word.push(c);
        }
    }
    flush(&mut word, start, &mut out);
    out
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn descend(&mut self, at: usize) -> Result<(), QueryError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(QueryError::TooDeep { limit: MAX_DEPTH, position: at });
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            let (_, at) = self.next().expect("peeked");
            operands.push(self.operand_of("OR", at, Self::parse_and)?);
        }
        Ok(join_balanced(operands, Expr::or).expect("at least one operand"))
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut operands = vec![self.parse_not()?];
        loop {
            match self.peek() {
                Some(Token::And) => {
                    let (_, at) = self.next().expect("peeked");
                    operands.push(self.operand_of("AND", at, Self::parse_not)?);
                }
                Some(t) if t.starts_operand() => operands.push(self.parse_not()?),
                _ => break,
            }
        }
        Ok(join_balanced(operands, Expr::and).expect("at least one operand"))
    }

    fn parse_not(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some(&Token::Not) {
            let (_, at) = self.next().expect("peeked");
            self.descend(at)?;
            let inner = self.operand_of("NOT", at, Self::parse_not)?;
            self.depth -= 1;
            return Ok(Expr::not(inner));
        }
        self.parse_atom()
    }

    /// Parse the operand of an operator, reporting the operator when the operand is absent.
    fn operand_of(
        &mut self,
        operator: &'static str,
        at: usize,
        parse: fn(&mut Self) -> Result<Expr, QueryError>,
    ) -> Result<Expr, QueryError> {
        match self.peek() {
            Some(t) if t.starts_operand() => parse(self),
            _ => Err(QueryError::MissingOperand { operator, position: at }),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, QueryError> {
        match self.next() {
            Some((Token::Term(t), _)) => Ok(Expr::Term(t)),
            Some((Token::LParen, open)) => {
                if self.peek() == Some(&Token::RParen) {
                    return Err(QueryError::EmptyGroup { position: open });
                }
                self.descend(open)?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    _ => Err(QueryError::UnclosedParen { position: open }),
                }
            }
            Some((Token::RParen, at)) => Err(QueryError::UnmatchedParen { position: at }),
            Some((t, at)) => Err(QueryError::UnexpectedToken { token: t.text().to_string(), position: at }),
            None => Err(QueryError::UnexpectedToken { token: "end of query".into(), position: self.end }),
        }
    }
}

/// Parse a boolean query. A blank query parses to `None` and matches nothing.
pub fn parse_query(query: &str) -> Result<Option<Expr>, QueryError> {
    let tokens = lex(query);
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser { tokens, pos: 0, end: query.len(), depth: 0 };
    let expr = parser.parse_or()?;
    match parser.next() {
        None => Ok(Some(expr)),
        Some((Token::RParen, at)) => Err(QueryError::UnmatchedParen { position: at }),
        Some((t, at)) => Err(QueryError::UnexpectedToken { token: t.text().to_string(), position: at }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(q: &str) -> String {
        parse_query(q).unwrap().unwrap().to_string()
    }

    #[test]
    fn precedence_not_and_or() {
        assert_eq!(parsed("a OR b AND NOT c"), "(a OR (b AND NOT c))");
        assert_eq!(parsed("NOT a AND b"), "(NOT a AND b)");
        assert_eq!(parsed("a AND b OR c AND d"), "((a AND b) OR (c AND d))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(parsed("(a OR b) AND c"), "((a OR b) AND c)");
        assert_eq!(parsed("NOT (a OR b)"), "NOT (a OR b)");
        assert_eq!(parsed("((fox))"), "fox");
    }

    #[test]
    fn adjacent_terms_are_conjunctive() {
        assert_eq!(parsed("fox dog"), "(fox AND dog)");
        assert_eq!(parsed("fox (dog OR cat)"), "(fox AND (dog OR cat))");
    }

    #[test]
    fn operators_are_case_sensitive() {
        assert_eq!(parsed("fox and dog"), "((fox AND and) AND dog)");
    }

    #[test]
    fn blank_query_is_empty() {
        assert_eq!(parse_query("   ").unwrap(), None);
    }

    #[test]
    fn malformed_queries_report_position() {
        assert_eq!(
            parse_query("fox AND").unwrap_err(),
            QueryError::MissingOperand { operator: "AND", position: 4 }
        );
        assert_eq!(
            parse_query("fox OR ) dog").unwrap_err(),
            QueryError::MissingOperand { operator: "OR", position: 4 }
        );
        assert_eq!(parse_query("NOT").unwrap_err(), QueryError::MissingOperand { operator: "NOT", position: 0 });
        assert_eq!(parse_query("(fox OR dog").unwrap_err(), QueryError::UnclosedParen { position: 0 });
        assert_eq!(parse_query("fox)").unwrap_err(), QueryError::UnmatchedParen { position: 3 });
        assert_eq!(parse_query("fox ()").unwrap_err(), QueryError::EmptyGroup { position: 4 });
        assert_eq!(
            parse_query("AND fox").unwrap_err(),
            QueryError::UnexpectedToken { token: "AND".into(), position: 0 }
        );
    }

    #[test]
    fn nesting_is_bounded() {
        let parens = format!("{}fox{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(parse_query(&parens).unwrap_err(), QueryError::TooDeep { limit: MAX_DEPTH, position: MAX_DEPTH });
        let nots = format!("{}fox", "NOT ".repeat(100_000));
        assert_eq!(parse_query(&nots).unwrap_err(), QueryError::TooDeep { limit: MAX_DEPTH, position: 4 * MAX_DEPTH });

        let deepest = format!("{}fox{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parsed(&deepest), "fox");
    }

    fn height<T>(expr: &Expr<T>) -> usize {
        expr.fold(&mut |_: &T| 1, &mut |a: usize, b: usize| 1 + a.max(b), &mut |a: usize, b: usize| 1 + a.max(b), &mut |a: usize| 1 + a)
    }

    #[test]
    fn long_flat_queries_stay_shallow() {
        let q = vec!["fox"; 100_000].join(" OR ");
        assert!(height(&parse_query(&q).unwrap().unwrap()) <= 18);
        let q = vec!["fox"; 100_000].join(" ");
        assert!(height(&parse_query(&q).unwrap().unwrap()) <= 18);
    }

    #[test]
    fn preprocessing_expands_literals() {
        let expr = parse_query("the OR foxes/dogs").unwrap().unwrap();
        let expanded = expr.preprocessed(Preprocessing::new(true, true));
        let s = |t: &str| Expr::Term(Some(t.to_string()));
        assert_eq!(expanded, Expr::or(Expr::Term(None), Expr::and(s("fox"), s("dog"))));
    }

    #[test]
    fn fold_evaluates_bottom_up() {
        let expr = parse_query("a AND NOT b OR c").unwrap().unwrap();
        let truth = |t: &String| t != "b";
        let v = expr.fold(
            &mut |t: &String| truth(t),
            &mut |a: bool, b: bool| a && b,
            &mut |a: bool, b: bool| a || b,
            &mut |a: bool| !a,
        );
        assert!(v);
    }
}
