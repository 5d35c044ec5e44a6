//! The joint probability table: the outcome pairs of a bivariate distribution and their masses.

use malachite::num::basic::traits::Zero;
use malachite::num::conversion::traits::RoundingFrom;
use malachite::{rounding_modes::RoundingMode, Natural, Rational};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::Error;
use crate::outcome::{first_non_finite, Outcome};
use crate::predicate::Predicate;

/// Outcome pairs with their probabilities, in the order they were supplied.
///
/// The table is immutable; it also carries the index distribution used for sampling.
#[derive(Debug, Clone)]
pub struct JointTable {
    outcomes: Vec<Outcome>,
    probabilities: Vec<f64>,
    index_distribution: WeightedIndex<f64>,
}

impl JointTable {
    /// Validates and stores a table.
    ///
    /// Fails if the lengths differ, a coordinate is not finite, a probability is negative or not
    /// finite, or the probabilities do not sum to 1 within `tolerance`.
    pub fn new(
        outcomes: Vec<Outcome>,
        probabilities: Vec<f64>,
        tolerance: f64,
    ) -> Result<Self, Error> {
        check_tolerance(tolerance)?;
        if outcomes.len() != probabilities.len() {
            return Err(Error::ShapeMismatch {
                outcomes: outcomes.len(),
                probabilities: probabilities.len(),
            });
        }
        if let Some(index) = first_non_finite(&outcomes) {
            return Err(Error::InvalidOutcome { index });
        }
        if let Some((index, &value)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(Error::InvalidProbability { index, value });
        }
        let total: f64 = probabilities.iter().fold(0.0, |acc, p| acc + p);
        if (total - 1.0).abs() > tolerance {
            return Err(Error::UnnormalizedProbabilities { total, tolerance });
        }
        if total != 1.0 {
            log::debug!("probabilities sum to {}, accepted within {}", total, tolerance);
        }
        let index_distribution = WeightedIndex::new(&probabilities)?;
        log::debug!("joint table with {} outcomes", outcomes.len());
        Ok(Self {
            outcomes,
            probabilities,
            index_distribution,
        })
    }

    /// Builds a table from integer counts. Each probability is the exact ratio of its count to
    /// the total, rounded to the nearest `f64`.
    pub fn from_counts(
        outcomes: Vec<Outcome>,
        counts: Vec<Natural>,
        tolerance: f64,
    ) -> Result<Self, Error> {
        check_tolerance(tolerance)?;
        if outcomes.len() != counts.len() {
            return Err(Error::ShapeMismatch {
                outcomes: outcomes.len(),
                probabilities: counts.len(),
            });
        }
        let total: Natural = counts.iter().sum();
        if total == Natural::ZERO {
            return Err(Error::UnnormalizedProbabilities {
                total: 0.0,
                tolerance,
            });
        }
        let probabilities = counts
            .into_iter()
            .map(|count| {
                f64::rounding_from(
                    Rational::from_naturals(count, total.clone()),
                    RoundingMode::Nearest,
                )
                .0
            })
            .collect();
        Self::new(outcomes, probabilities, tolerance)
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn iter(&self) -> impl Iterator<Item = (Outcome, f64)> + '_ {
        self.outcomes
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.probabilities.iter().fold(0.0, |acc, p| acc + p)
    }

    /// Draws `count` indices into the table, independently and with replacement.
    pub fn sample_indices<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<usize> {
        (0..count)
            .map(|_| self.index_distribution.sample(rng))
            .collect()
    }

    /// Returns the probability that `x <= x_max` and `y <= y_max`.
    pub fn cdf(&self, x_max: f64, y_max: f64) -> f64 {
        self.iter()
            .filter(|(outcome, _)| outcome.x <= x_max && outcome.y <= y_max)
            .map(|(_, p)| p)
            .fold(0.0, |acc, p| acc + p)
    }

    /// Returns the total probability of the outcomes satisfying `predicate`.
    pub fn event_probability<P>(&self, predicate: &P) -> Result<f64, Error>
    where
        P: Predicate + ?Sized,
    {
        let mut total = 0.0;
        for (outcome, p) in self.iter() {
            if predicate.evaluate(outcome)? {
                total += p;
            }
        }
        Ok(total)
    }
}

/// Fails unless `tolerance` is finite and nonnegative.
pub(crate) fn check_tolerance(tolerance: f64) -> Result<(), Error> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTolerance { tolerance })
    }
}

impl Distribution<Outcome> for JointTable {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Outcome {
        self.outcomes[self.index_distribution.sample(rng)]
    }
}
