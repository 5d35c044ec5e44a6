use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// One point `(x, y)` in the support of a bivariate distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub x: f64,
    pub y: f64,
}

impl Outcome {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate selected by `axis`.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Outcome {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Outcome {
    fn from((x, y): (i32, i32)) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl From<Outcome> for (f64, f64) {
    fn from(outcome: Outcome) -> Self {
        (outcome.x, outcome.y)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Selects one coordinate of an outcome pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    X,
    #[default]
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" | "x" => Ok(Axis::X),
            "Y" | "y" => Ok(Axis::Y),
            _ => Err(Error::UnknownAxis {
                found: s.to_string(),
            }),
        }
    }
}

/// Returns the index of the first outcome with a NaN or infinite coordinate.
pub(crate) fn first_non_finite(outcomes: &[Outcome]) -> Option<usize> {
    outcomes.iter().position(|outcome| !outcome.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_from_str() {
        assert_eq!("X".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("Y".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!("y".parse::<Axis>().unwrap(), Axis::Y);
    }

    #[test]
    fn test_axis_rejects_unknown_token() {
        for token in ["", "Z", "xy", " X"] {
            match token.parse::<Axis>() {
                Err(Error::UnknownAxis { found }) => assert_eq!(found, token),
                other => panic!("expected UnknownAxis for {:?}, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_axis_defaults_to_second_coordinate() {
        assert_eq!(Axis::default(), Axis::Y);
    }

    #[test]
    fn test_outcome_get() {
        let outcome = Outcome::from((1, -2));
        assert_eq!(outcome.get(Axis::X), 1.0);
        assert_eq!(outcome.get(Axis::Y), -2.0);
    }

    #[test]
    fn test_first_non_finite() {
        let outcomes = vec![
            Outcome::new(0.0, 1.0),
            Outcome::new(f64::NAN, 1.0),
            Outcome::new(0.0, f64::INFINITY),
        ];
        assert_eq!(first_non_finite(&outcomes), Some(1));
        assert_eq!(first_non_finite(&outcomes[..1]), None);
    }
}
