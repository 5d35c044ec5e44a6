//! Syntax tree, type checking and evaluation for textual predicates such as
//! `x + y > 1 && x != 0`.

use miette::{Diagnostic, SourceSpan};
use serde::Serialize;
use thiserror::Error;

use crate::outcome::{Axis, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl From<Range> for SourceSpan {
    fn from(range: Range) -> Self {
        (range.start, range.end - range.start).into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WithRange<T> {
    pub value: T,
    #[serde(skip)]
    pub range: Range,
}

impl<T> WithRange<T> {
    pub fn new(start: usize, end: usize, value: T) -> Self {
        Self {
            value,
            range: Range { start, end },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Coordinate(Axis),
    UnaryOp {
        op: WithRange<UnaryOp>,
        operand: Box<WithRange<Expr>>,
    },
    BinaryOp {
        op: WithRange<BinaryOp>,
        left: Box<WithRange<Expr>>,
        right: Box<WithRange<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::Ne => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Ge => write!(f, ">="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ValueType {
    Number,
    Boolean,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Number => write!(f, "number"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
}

impl Value {
    fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }
}

/// Infers the type of `expr`, rejecting operators applied to the wrong kind of operand.
pub fn check(expr: &WithRange<Expr>) -> Result<ValueType, PredicateError> {
    match &expr.value {
        Expr::Number(_) | Expr::Coordinate(_) => Ok(ValueType::Number),
        Expr::Bool(_) => Ok(ValueType::Boolean),
        Expr::UnaryOp { op, operand } => {
            let expected = match op.value {
                UnaryOp::Negate => ValueType::Number,
                UnaryOp::Not => ValueType::Boolean,
            };
            expect_type(operand, check(operand)?, expected)?;
            Ok(expected)
        }
        Expr::BinaryOp { op, left, right } => {
            let left_type = check(left)?;
            let right_type = check(right)?;
            match op.value {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    expect_type(left, left_type, ValueType::Number)?;
                    expect_type(right, right_type, ValueType::Number)?;
                    Ok(ValueType::Number)
                }
                BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    expect_type(left, left_type, ValueType::Number)?;
                    expect_type(right, right_type, ValueType::Number)?;
                    Ok(ValueType::Boolean)
                }
                BinaryOp::Eq | BinaryOp::Ne => {
                    expect_type(right, right_type, left_type)?;
                    Ok(ValueType::Boolean)
                }
                BinaryOp::And | BinaryOp::Or => {
                    expect_type(left, left_type, ValueType::Boolean)?;
                    expect_type(right, right_type, ValueType::Boolean)?;
                    Ok(ValueType::Boolean)
                }
            }
        }
    }
}

fn expect_type(
    expr: &WithRange<Expr>,
    found: ValueType,
    expected: ValueType,
) -> Result<(), PredicateError> {
    if found == expected {
        Ok(())
    } else {
        Err(PredicateError::TypeMismatch {
            range: expr.range.into(),
            expected,
            found,
        })
    }
}

/// Evaluates `expr` at `outcome`.
pub fn evaluate(expr: &WithRange<Expr>, outcome: Outcome) -> Result<Value, PredicateError> {
    match &expr.value {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Boolean(*b)),
        Expr::Coordinate(axis) => Ok(Value::Number(outcome.get(*axis))),
        Expr::UnaryOp { op, operand } => match op.value {
            UnaryOp::Negate => Ok(Value::Number(-evaluate_number(operand, outcome)?)),
            UnaryOp::Not => Ok(Value::Boolean(!evaluate_bool(operand, outcome)?)),
        },
        Expr::BinaryOp { op, left, right } => match op.value {
            // Short-circuit, so that `x != 0 && 1 / x > 2` is safe.
            BinaryOp::And => Ok(Value::Boolean(
                evaluate_bool(left, outcome)? && evaluate_bool(right, outcome)?,
            )),
            BinaryOp::Or => Ok(Value::Boolean(
                evaluate_bool(left, outcome)? || evaluate_bool(right, outcome)?,
            )),
            BinaryOp::Eq | BinaryOp::Ne => {
                let equal = match (evaluate(left, outcome)?, evaluate(right, outcome)?) {
                    (Value::Number(l), Value::Number(r)) => l == r,
                    (Value::Boolean(l), Value::Boolean(r)) => l == r,
                    (l, r) => {
                        return Err(PredicateError::TypeMismatch {
                            range: right.range.into(),
                            expected: l.value_type(),
                            found: r.value_type(),
                        })
                    }
                };
                Ok(Value::Boolean(if op.value == BinaryOp::Eq {
                    equal
                } else {
                    !equal
                }))
            }
            _ => {
                let l = evaluate_number(left, outcome)?;
                let r = evaluate_number(right, outcome)?;
                Ok(match op.value {
                    BinaryOp::Add => Value::Number(l + r),
                    BinaryOp::Sub => Value::Number(l - r),
                    BinaryOp::Mul => Value::Number(l * r),
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Err(PredicateError::DivisionByZero {
                                range: right.range.into(),
                                outcome,
                            });
                        }
                        Value::Number(l / r)
                    }
                    BinaryOp::Lt => Value::Boolean(l < r),
                    BinaryOp::Le => Value::Boolean(l <= r),
                    BinaryOp::Gt => Value::Boolean(l > r),
                    BinaryOp::Ge => Value::Boolean(l >= r),
                    BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => {
                        unreachable!("handled above")
                    }
                })
            }
        },
    }
}

fn evaluate_number(expr: &WithRange<Expr>, outcome: Outcome) -> Result<f64, PredicateError> {
    match evaluate(expr, outcome)? {
        Value::Number(n) => Ok(n),
        other => Err(PredicateError::TypeMismatch {
            range: expr.range.into(),
            expected: ValueType::Number,
            found: other.value_type(),
        }),
    }
}

fn evaluate_bool(expr: &WithRange<Expr>, outcome: Outcome) -> Result<bool, PredicateError> {
    match evaluate(expr, outcome)? {
        Value::Boolean(b) => Ok(b),
        other => Err(PredicateError::TypeMismatch {
            range: expr.range.into(),
            expected: ValueType::Boolean,
            found: other.value_type(),
        }),
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum PredicateError {
    #[error("Type mismatch in predicate")]
    TypeMismatch {
        #[label = "Expected a {expected}, but this is a {found}."]
        range: SourceSpan,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Predicates must evaluate to a boolean")]
    #[diagnostic(help("Compare values with ==, !=, <, <=, > or >=."))]
    NotBoolean {
        #[label = "This is a {found}."]
        range: SourceSpan,
        found: ValueType,
    },

    #[error("Division by zero at outcome {outcome}")]
    DivisionByZero {
        #[label = "This evaluates to 0."]
        range: SourceSpan,
        outcome: Outcome,
    },

    #[error("Predicate failed: {message}")]
    Rejected { message: String },
}

/// This corresponds to inner errors in the grammar - when the LR parser succeeded,
/// but custom action code failed.
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseActionError {
    #[error("Invalid number literal")]
    #[diagnostic(help("Number literals must be finite."))]
    InvalidNumberLiteral {
        #[label = "This does not fit in a 64-bit float."]
        range: SourceSpan,
    },
}
