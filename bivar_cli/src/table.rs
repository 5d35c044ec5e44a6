//! Reading outcome tables from CSV files.
//!
//! A table has a header naming its columns: `x` and `y`, plus either `p` (probabilities) or
//! `count` (nonnegative integer weights). Other columns are ignored.

use bivar_engine::Outcome;
use malachite::Natural;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::session::SessionError;

#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Probabilities(Vec<f64>),
    Counts(Vec<Natural>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub outcomes: Vec<Outcome>,
    pub weights: Weights,
}

pub fn read_table(path: &Path) -> Result<Table, SessionError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SessionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    let headers = reader
        .headers()
        .map_err(|source| SessionError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let invalid = |line: u64, message: String| SessionError::InvalidRecord {
        path: path.to_path_buf(),
        line,
        message,
    };
    let (x_column, y_column) = match (column("x"), column("y")) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(invalid(1, "the header must name an x and a y column".to_string())),
    };
    let (weight_column, counts) = match (column("p"), column("count")) {
        (Some(p), None) => (p, false),
        (None, Some(count)) => (count, true),
        _ => {
            return Err(invalid(
                1,
                "the header must name exactly one of a p or a count column".to_string(),
            ))
        }
    };

    let mut outcomes = Vec::new();
    let mut probabilities = Vec::new();
    let mut natural_counts = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| SessionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, |position| position.line());
        let field = |index: usize| record.get(index).unwrap_or("");
        let x = parse_field::<f64>(field(x_column), "x").map_err(|m| invalid(line, m))?;
        let y = parse_field::<f64>(field(y_column), "y").map_err(|m| invalid(line, m))?;
        outcomes.push(Outcome::new(x, y));
        if counts {
            let count = parse_field::<Natural>(field(weight_column), "count")
                .map_err(|m| invalid(line, m))?;
            natural_counts.push(count);
        } else {
            let p = parse_field::<f64>(field(weight_column), "p").map_err(|m| invalid(line, m))?;
            probabilities.push(p);
        }
    }
    let weights = if counts {
        Weights::Counts(natural_counts)
    } else {
        Weights::Probabilities(probabilities)
    };
    tracing::debug!(path = %path.display(), outcomes = outcomes.len(), "read table");
    Ok(Table { outcomes, weights })
}

fn parse_field<T: FromStr>(text: &str, name: &str) -> Result<T, String> {
    text.parse()
        .map_err(|_| format!("cannot parse {} value [{}]", name, text))
}

/// Resolves `path` against `base` unless it is absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
