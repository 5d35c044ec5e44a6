//! One-dimensional discrete distributions, and the marginal extractor that derives them from a
//! joint table.
//!
//! A distribution is a list of `(value, probability)` pairs. Marginals have a sorted support
//! without repeats; conditional distributions keep the table order and may repeat a value, once
//! per outcome that produced it. Every query below treats repeated values as contributing their
//! mass separately, which gives the same moments and CDF as merging them would.

use serde::Serialize;

use crate::joint::JointTable;
use crate::outcome::Axis;

/// Mean and variance of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub variance: f64,
}

impl Stats {
    pub fn std(&self) -> f64 {
        self.variance.sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscreteDistribution {
    support: Vec<f64>,
    probabilities: Vec<f64>,
}

impl DiscreteDistribution {
    /// Builds a distribution from parallel lists. The caller guarantees equal lengths.
    pub(crate) fn from_parts(support: Vec<f64>, probabilities: Vec<f64>) -> Self {
        debug_assert_eq!(
            support.len(),
            probabilities.len(),
            "support and probabilities have different lengths"
        );
        Self {
            support,
            probabilities,
        }
    }

    /// Derives the marginal distribution of `axis`: the probability of each distinct value is the
    /// total probability of the outcomes having it. The support is sorted ascending.
    pub fn marginal(joint: &JointTable, axis: Axis) -> Self {
        let mut pairs = joint
            .iter()
            .map(|(outcome, p)| (outcome.get(axis), p))
            .collect::<Vec<_>>();
        // Stable, so masses of equal values are summed in table order.
        pairs.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        let mut support: Vec<f64> = Vec::new();
        let mut probabilities: Vec<f64> = Vec::new();
        for (value, p) in pairs {
            match (support.last(), probabilities.last_mut()) {
                (Some(last), Some(mass)) if *last == value => *mass += p,
                _ => {
                    support.push(value);
                    probabilities.push(p);
                }
            }
        }
        log::debug!(
            "marginal {}: {} outcomes aggregated into {} values",
            axis,
            joint.len(),
            support.len()
        );
        Self {
            support,
            probabilities,
        }
    }

    pub fn support(&self) -> &[f64] {
        &self.support
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.support
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.support.len()
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.probabilities.iter().fold(0.0, |acc, p| acc + p)
    }

    pub fn mean(&self) -> f64 {
        self.iter()
            .map(|(value, p)| value * p)
            .fold(0.0, |acc, p| acc + p)
    }

    pub fn var(&self) -> f64 {
        let mean = self.mean();
        self.iter()
            .map(|(value, p)| p * (value - mean).powi(2))
            .fold(0.0, |acc, p| acc + p)
    }

    pub fn std(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            mean: self.mean(),
            variance: self.var(),
        }
    }

    /// Returns the probability of a value less than or equal to `value`.
    pub fn cdf(&self, value: f64) -> f64 {
        self.iter()
            .filter(|(v, _)| *v <= value)
            .map(|(_, p)| p)
            .fold(0.0, |acc, p| acc + p)
    }

    /// Returns the probability of exactly `value`.
    pub fn pmf(&self, value: f64) -> f64 {
        self.iter()
            .filter(|(v, _)| *v == value)
            .map(|(_, p)| p)
            .fold(0.0, |acc, p| acc + p)
    }

    pub fn min(&self) -> Option<f64> {
        self.support.iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    pub fn max(&self) -> Option<f64> {
        self.support.iter().copied().max_by(|a, b| a.total_cmp(b))
    }
}
