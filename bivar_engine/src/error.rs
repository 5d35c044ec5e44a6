use miette::Diagnostic;
use rand::distributions::WeightedError;
use thiserror::Error;

use crate::expr::PredicateError;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Got {outcomes} outcomes but {probabilities} probabilities")]
    #[diagnostic(help("Every outcome pair needs exactly one probability."))]
    ShapeMismatch {
        outcomes: usize,
        probabilities: usize,
    },

    #[error("Invalid probability {value} at index {index}")]
    #[diagnostic(help("Probabilities must be finite and nonnegative."))]
    InvalidProbability { index: usize, value: f64 },

    #[error("Probabilities sum to {total}, which is not within {tolerance} of 1")]
    #[diagnostic(help("Normalize the probabilities, or raise the tolerance."))]
    UnnormalizedProbabilities { total: f64, tolerance: f64 },

    #[error("Invalid tolerance {tolerance}")]
    #[diagnostic(help("The tolerance must be finite and nonnegative."))]
    InvalidTolerance { tolerance: f64 },

    #[error("Outcome at index {index} has a non-finite coordinate")]
    InvalidOutcome { index: usize },

    #[error("Conditional distribution is degenerate")]
    #[diagnostic(help("The predicate matches no outcome with positive probability."))]
    DegenerateConditional,

    #[error("No conditional distribution was configured")]
    #[diagnostic(help("Supply a predicate at construction to query the conditional distribution."))]
    MissingConditional,

    #[error("Unrecognized CDF query")]
    #[diagnostic(help(
        "Give x and y for the joint CDF, only x or only y for a marginal CDF, or request the event probability."
    ))]
    InvalidQuery,

    #[error("Unknown axis [{found}]")]
    #[diagnostic(help("The axis must be X or Y."))]
    UnknownAxis { found: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Predicate(#[from] PredicateError),

    #[error("Cannot sample from the joint table: {0}")]
    IndexDistribution(#[from] WeightedError),
}
