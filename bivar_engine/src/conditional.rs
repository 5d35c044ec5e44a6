//! The conditional filter.
//!
//! Unlike marginals, a conditional distribution is not aggregated: each outcome matching the
//! predicate contributes its own entry, in table order, even when two outcomes share the reported
//! coordinate. Moments and CDF values are the same either way, but the raw support is observable
//! through [`ConditionalDistribution::distribution`].

use crate::distribution::DiscreteDistribution;
use crate::error::Error;
use crate::joint::JointTable;
use crate::outcome::Axis;
use crate::predicate::Predicate;

#[derive(Debug, Clone)]
pub struct ConditionalDistribution {
    axis: Axis,
    distribution: DiscreteDistribution,
    event_probability: f64,
}

impl ConditionalDistribution {
    /// Restricts `joint` to the outcomes satisfying `predicate` and renormalizes their masses,
    /// reporting the `axis` coordinate of each.
    ///
    /// Fails with [`Error::DegenerateConditional`] if the matching outcomes carry no mass.
    pub fn derive<P>(joint: &JointTable, predicate: &P, axis: Axis) -> Result<Self, Error>
    where
        P: Predicate + ?Sized,
    {
        let mut support = Vec::new();
        let mut probabilities = Vec::new();
        for (outcome, p) in joint.iter() {
            if predicate.evaluate(outcome)? {
                support.push(outcome.get(axis));
                probabilities.push(p);
            }
        }
        let total: f64 = probabilities.iter().fold(0.0, |acc, p| acc + p);
        if total == 0.0 {
            return Err(Error::DegenerateConditional);
        }
        for p in probabilities.iter_mut() {
            *p /= total;
        }
        log::debug!(
            "conditional on {}: {} of {} outcomes match, event probability {}",
            axis,
            support.len(),
            joint.len(),
            total
        );
        Ok(Self {
            axis,
            distribution: DiscreteDistribution::from_parts(support, probabilities),
            event_probability: total,
        })
    }

    /// The coordinate this distribution reports.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn distribution(&self) -> &DiscreteDistribution {
        &self.distribution
    }

    /// The unconditional probability of the conditioning event.
    pub fn event_probability(&self) -> f64 {
        self.event_probability
    }
}
