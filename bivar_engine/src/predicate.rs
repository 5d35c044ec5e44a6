//! Predicates select the outcome pairs an event consists of.
//!
//! Any `Fn(Outcome) -> bool` closure is a predicate. Predicates that can fail are wrapped in
//! [`Fallible`], and predicates written as text (`x + y > 1`) are compiled with
//! [`CompiledPredicate::parse`].

use lalrpop_util::ParseError;
use miette::{Diagnostic, SourceSpan};
use std::str::FromStr;
use thiserror::Error;

use crate::expr::{self, Expr, ParseActionError, PredicateError, ValueType, WithRange};
use crate::grammar;
use crate::outcome::Outcome;

pub trait Predicate {
    fn evaluate(&self, outcome: Outcome) -> Result<bool, PredicateError>;
}

impl<F> Predicate for F
where
    F: Fn(Outcome) -> bool,
{
    fn evaluate(&self, outcome: Outcome) -> Result<bool, PredicateError> {
        Ok(self(outcome))
    }
}

/// Adapts a closure that may fail. Errors are propagated to the caller, never swallowed.
pub struct Fallible<F>(pub F);

impl<F> Predicate for Fallible<F>
where
    F: Fn(Outcome) -> Result<bool, PredicateError>,
{
    fn evaluate(&self, outcome: Outcome) -> Result<bool, PredicateError> {
        (self.0)(outcome)
    }
}

/// A type-checked predicate parsed from text.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    source: String,
    expr: WithRange<Expr>,
}

impl CompiledPredicate {
    pub fn parse(source: &str) -> Result<Self, CompileError> {
        let expr = grammar::PredicateParser::new()
            .parse(source)
            .map_err(|e| CompileError::Syntax(SyntaxError::from(e)))?;
        match expr::check(&expr)? {
            ValueType::Boolean => {}
            found => {
                return Err(PredicateError::NotBoolean {
                    range: expr.range.into(),
                    found,
                }
                .into())
            }
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for CompiledPredicate {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Predicate for CompiledPredicate {
    fn evaluate(&self, outcome: Outcome) -> Result<bool, PredicateError> {
        match expr::evaluate(&self.expr, outcome)? {
            expr::Value::Boolean(b) => Ok(b),
            expr::Value::Number(_) => Err(PredicateError::NotBoolean {
                range: self.expr.range.into(),
                found: ValueType::Number,
            }),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Predicate(#[from] PredicateError),
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
    #[label = "here"]
    range: SourceSpan,
    #[help]
    help: Option<String>,
}

impl SyntaxError {
    pub fn range(&self) -> SourceSpan {
        self.range
    }
}

impl<T: std::fmt::Display> From<ParseError<usize, T, ParseActionError>> for SyntaxError {
    fn from(e: ParseError<usize, T, ParseActionError>) -> Self {
        let message = e.to_string();
        match e {
            ParseError::UnrecognizedToken { token, .. } | ParseError::ExtraToken { token } => {
                Self {
                    message,
                    range: (token.0, token.2 - token.0).into(),
                    help: None,
                }
            }
            ParseError::UnrecognizedEof { location, .. }
            | ParseError::InvalidToken { location } => Self {
                message,
                range: (location, 0).into(),
                help: None,
            },
            ParseError::User {
                error: ParseActionError::InvalidNumberLiteral { range },
            } => Self {
                message,
                range,
                help: Some("Number literals must be finite.".to_string()),
            },
        }
    }
}
