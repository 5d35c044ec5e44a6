use malachite::Natural;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::conditional::ConditionalDistribution;
use crate::distribution::{DiscreteDistribution, Stats};
use crate::error::Error;
use crate::joint::{check_tolerance, JointTable};
use crate::outcome::{Axis, Outcome};
use crate::predicate::Predicate;

/// Default allowed deviation of the total probability from 1.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Allowed deviation of the total probability from 1.
    pub tolerance: f64,
    /// The coordinate reported by the conditional distribution.
    pub conditional_axis: Axis,
    /// Seed for sampling. Without one, the generator is seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            conditional_axis: Axis::default(),
            seed: None,
        }
    }
}

impl Options {
    /// Checks the options without building anything.
    pub fn validate(&self) -> Result<(), Error> {
        check_tolerance(self.tolerance)
    }
}

/// A discrete bivariate random variable.
///
/// Marginals, and the conditional distribution when a predicate is given, are derived once at
/// construction. Only sampling changes state afterwards.
#[derive(Debug, Clone)]
pub struct BivariateDiscrete {
    joint: JointTable,
    x: DiscreteDistribution,
    y: DiscreteDistribution,
    conditional: Option<ConditionalDistribution>,
    rng: StdRng,
}

impl BivariateDiscrete {
    /// Builds a distribution with default options and no conditioning event.
    pub fn new(outcomes: Vec<Outcome>, probabilities: Vec<f64>) -> Result<Self, Error> {
        Self::builder(outcomes, probabilities).build()
    }

    pub fn builder<'p>(outcomes: Vec<Outcome>, probabilities: Vec<f64>) -> Builder<'p> {
        Builder {
            weights: Weights::Probabilities(probabilities),
            outcomes,
            predicate: None,
            options: Options::default(),
        }
    }

    /// Like [`BivariateDiscrete::builder`], but with integer counts instead of probabilities.
    pub fn builder_from_counts<'p>(outcomes: Vec<Outcome>, counts: Vec<Natural>) -> Builder<'p> {
        Builder {
            weights: Weights::Counts(counts),
            outcomes,
            predicate: None,
            options: Options::default(),
        }
    }

    pub fn joint(&self) -> &JointTable {
        &self.joint
    }

    pub fn marginal_x(&self) -> &DiscreteDistribution {
        &self.x
    }

    pub fn marginal_y(&self) -> &DiscreteDistribution {
        &self.y
    }

    /// Returns `(mean of X, mean of Y)`.
    pub fn mean(&self) -> (f64, f64) {
        (self.x.mean(), self.y.mean())
    }

    /// Returns `(variance of X, variance of Y)`.
    pub fn var(&self) -> (f64, f64) {
        (self.x.var(), self.y.var())
    }

    pub fn std(&self) -> (f64, f64) {
        (self.x.std(), self.y.std())
    }

    pub fn stats(&self) -> (Stats, Stats) {
        (self.x.stats(), self.y.stats())
    }

    /// Cumulative probabilities, by which arguments are given:
    ///
    /// - `conditional`: the probability of the conditioning event; `x` and `y` are ignored. This
    ///   is not the CDF of the conditional distribution; see [`Self::event_probability`].
    /// - `x` and `y`: the joint CDF, `P(X <= x, Y <= y)`.
    /// - only `x` or only `y`: the marginal CDF of that coordinate.
    ///
    /// Any other combination is an [`Error::InvalidQuery`].
    pub fn cdf(&self, x: Option<f64>, y: Option<f64>, conditional: bool) -> Result<f64, Error> {
        match (x, y, conditional) {
            (_, _, true) => self.event_probability(),
            (Some(x), Some(y), false) => Ok(self.joint.cdf(x, y)),
            (None, Some(y), false) => Ok(self.y.cdf(y)),
            (Some(x), None, false) => Ok(self.x.cdf(x)),
            (None, None, false) => Err(Error::InvalidQuery),
        }
    }

    /// The unconditional probability of the event the conditional distribution is built on.
    pub fn event_probability(&self) -> Result<f64, Error> {
        Ok(self.conditional()?.event_probability())
    }

    fn conditional(&self) -> Result<&ConditionalDistribution, Error> {
        self.conditional.as_ref().ok_or(Error::MissingConditional)
    }

    /// The conditional distribution, with one entry per matching outcome in table order.
    pub fn conditional_distribution(&self) -> Option<&DiscreteDistribution> {
        self.conditional.as_ref().map(|c| c.distribution())
    }

    pub fn conditional_axis(&self) -> Option<Axis> {
        self.conditional.as_ref().map(|c| c.axis())
    }

    pub fn conditional_mean(&self) -> Result<f64, Error> {
        Ok(self.conditional()?.distribution().mean())
    }

    pub fn conditional_var(&self) -> Result<f64, Error> {
        Ok(self.conditional()?.distribution().var())
    }

    pub fn conditional_stats(&self) -> Result<Stats, Error> {
        Ok(self.conditional()?.distribution().stats())
    }

    /// Draws `size` outcome pairs from the joint distribution with the instance's generator.
    pub fn rvs(&mut self, size: usize) -> Vec<Outcome> {
        let indices = self.joint.sample_indices(&mut self.rng, size);
        self.to_outcomes(indices)
    }

    /// Draws `size` outcome pairs with a caller-supplied generator.
    pub fn rvs_with<R: Rng + ?Sized>(&self, rng: &mut R, size: usize) -> Vec<Outcome> {
        let indices = self.joint.sample_indices(rng, size);
        self.to_outcomes(indices)
    }

    fn to_outcomes(&self, indices: Vec<usize>) -> Vec<Outcome> {
        let outcomes = self.joint.outcomes();
        indices.into_iter().map(|i| outcomes[i]).collect()
    }
}

#[derive(Debug, Clone)]
enum Weights {
    Probabilities(Vec<f64>),
    Counts(Vec<Natural>),
}

/// Collects the optional parts of a [`BivariateDiscrete`] before deriving everything at once.
pub struct Builder<'p> {
    outcomes: Vec<Outcome>,
    weights: Weights,
    predicate: Option<Box<dyn Predicate + 'p>>,
    options: Options,
}

impl<'p> Builder<'p> {
    /// Conditions on the outcomes satisfying `predicate`.
    pub fn given(mut self, predicate: impl Predicate + 'p) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn conditional_axis(mut self, axis: Axis) -> Self {
        self.options.conditional_axis = axis;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<BivariateDiscrete, Error> {
        let Builder {
            outcomes,
            weights,
            predicate,
            options,
        } = self;
        let joint = match weights {
            Weights::Probabilities(probabilities) => {
                JointTable::new(outcomes, probabilities, options.tolerance)?
            }
            Weights::Counts(counts) => {
                JointTable::from_counts(outcomes, counts, options.tolerance)?
            }
        };
        let x = DiscreteDistribution::marginal(&joint, Axis::X);
        let y = DiscreteDistribution::marginal(&joint, Axis::Y);
        let conditional = match predicate {
            Some(predicate) => Some(ConditionalDistribution::derive(
                &joint,
                predicate.as_ref(),
                options.conditional_axis,
            )?),
            None => None,
        };
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(BivariateDiscrete {
            joint,
            x,
            y,
            conditional,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::CompiledPredicate;
    use approx::assert_abs_diff_eq;

    fn example_outcomes() -> Vec<Outcome> {
        vec![(0, 0).into(), (0, 1).into(), (1, 0).into(), (1, 1).into()]
    }

    fn example() -> BivariateDiscrete {
        BivariateDiscrete::new(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4]).unwrap()
    }

    fn example_given_x_is_one() -> BivariateDiscrete {
        BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .given(|o: Outcome| o.x == 1.0)
            .conditional_axis(Axis::Y)
            .build()
            .unwrap()
    }

    #[test]
    fn test_mean_var_stats() {
        let d = example();
        let (mean_x, mean_y) = d.mean();
        assert_abs_diff_eq!(mean_x, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(mean_y, 0.6, epsilon = 1e-12);
        let (var_x, var_y) = d.var();
        assert_abs_diff_eq!(var_x, 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(var_y, 0.24, epsilon = 1e-12);
        let (stats_x, stats_y) = d.stats();
        assert_eq!(stats_x.mean, mean_x);
        assert_eq!(stats_x.variance, var_x);
        assert_eq!(stats_y.mean, mean_y);
        assert_eq!(stats_y.variance, var_y);
        assert_abs_diff_eq!(d.std().1, 0.24f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_cdf_modes() {
        let d = example_given_x_is_one();
        assert_abs_diff_eq!(d.cdf(Some(0.0), Some(0.0), false).unwrap(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(d.cdf(Some(0.0), None, false).unwrap(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(d.cdf(None, Some(0.0), false).unwrap(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(d.cdf(None, None, true).unwrap(), 0.7, epsilon = 1e-12);
        // The coordinates are ignored when asking for the event probability.
        assert_abs_diff_eq!(
            d.cdf(Some(-10.0), Some(-10.0), true).unwrap(),
            0.7,
            epsilon = 1e-12
        );
        assert!(matches!(d.cdf(None, None, false), Err(Error::InvalidQuery)));
    }

    #[test]
    fn test_event_probability_requires_predicate() {
        let d = example();
        assert!(matches!(
            d.cdf(None, None, true),
            Err(Error::MissingConditional)
        ));
        assert!(matches!(
            d.conditional_mean(),
            Err(Error::MissingConditional)
        ));
        assert!(d.conditional_distribution().is_none());
        assert!(d.conditional_axis().is_none());
    }

    #[test]
    fn test_conditional_example() {
        let d = example_given_x_is_one();
        let conditional = d.conditional_distribution().unwrap();
        assert_eq!(conditional.support(), &[0.0, 1.0]);
        assert_abs_diff_eq!(conditional.probabilities()[0], 0.3 / 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(conditional.probabilities()[1], 0.4 / 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(d.conditional_mean().unwrap(), 4.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.conditional_var().unwrap(), 12.0 / 49.0, epsilon = 1e-12);
        let stats = d.conditional_stats().unwrap();
        assert_abs_diff_eq!(stats.mean, 4.0 / 7.0, epsilon = 1e-12);
        assert_eq!(d.conditional_axis(), Some(Axis::Y));
    }

    #[test]
    fn test_conditional_axis_defaults_to_y() {
        let d = BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .given(|o: Outcome| o.y == 1.0)
            .build()
            .unwrap();
        assert_eq!(d.conditional_axis(), Some(Axis::Y));
        assert_eq!(d.conditional_distribution().unwrap().support(), &[1.0, 1.0]);
    }

    #[test]
    fn test_compiled_predicate_on_x() {
        let predicate: CompiledPredicate = "y == 1".parse().unwrap();
        let d = BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .given(predicate)
            .conditional_axis("X".parse().unwrap())
            .build()
            .unwrap();
        assert_abs_diff_eq!(d.conditional_mean().unwrap(), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.event_probability().unwrap(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_predicate_fails_construction() {
        let result = BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .given(|o: Outcome| o.x + o.y > 2.0)
            .build();
        assert!(matches!(result, Err(Error::DegenerateConditional)));
    }

    #[test]
    fn test_builder_from_counts() {
        let d = BivariateDiscrete::builder_from_counts(
            example_outcomes(),
            vec![1u32, 1, 1, 1].into_iter().map(Natural::from).collect(),
        )
        .build()
        .unwrap();
        assert_eq!(d.mean(), (0.5, 0.5));
        assert_eq!(d.var(), (0.25, 0.25));
    }

    #[test]
    fn test_tolerance_option() {
        let probabilities = vec![0.1, 0.2, 0.3, 0.39];
        assert!(matches!(
            BivariateDiscrete::new(example_outcomes(), probabilities.clone()),
            Err(Error::UnnormalizedProbabilities { .. })
        ));
        assert!(
            BivariateDiscrete::builder(example_outcomes(), probabilities)
                .tolerance(0.05)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_tolerance_fails_construction() {
        let d = BivariateDiscrete::builder(vec![(0, 0).into(), (1, 1).into()], vec![2.0, 3.0])
            .tolerance(f64::NAN)
            .build();
        assert!(matches!(d, Err(Error::InvalidTolerance { .. })));
        let d = BivariateDiscrete::builder(vec![(0, 0).into(), (1, 1).into()], vec![0.5, 0.5])
            .tolerance(-1.0)
            .build();
        assert!(matches!(d, Err(Error::InvalidTolerance { .. })));

        let options = Options {
            tolerance: f64::NAN,
            ..Options::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidTolerance { .. })));
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn test_rvs_support_containment() {
        let mut d = BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .seed(1)
            .build()
            .unwrap();
        for size in [0, 1, 10, 1000] {
            let samples = d.rvs(size);
            assert_eq!(samples.len(), size);
            assert!(samples.iter().all(|s| example_outcomes().contains(s)));
        }
    }

    #[test]
    fn test_rvs_is_reproducible_with_seed() {
        let build = || {
            BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
                .seed(99)
                .build()
                .unwrap()
        };
        let (mut a, mut b) = (build(), build());
        assert_eq!(a.rvs(100), b.rvs(100));

        let mut rng = StdRng::seed_from_u64(5);
        let mut other_rng = StdRng::seed_from_u64(5);
        assert_eq!(a.rvs_with(&mut rng, 20), b.rvs_with(&mut other_rng, 20));
    }

    #[test]
    fn test_rvs_frequencies() {
        let mut d = BivariateDiscrete::builder(example_outcomes(), vec![0.1, 0.2, 0.3, 0.4])
            .seed(2024)
            .build()
            .unwrap();
        let samples = d.rvs(20_000);
        let ones = samples.iter().filter(|s| s.x == 1.0).count();
        let frequency = ones as f64 / samples.len() as f64;
        assert_abs_diff_eq!(frequency, 0.7, epsilon = 0.02);
    }

    #[test]
    fn test_options_deserialize() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());

        let options: Options =
            serde_json::from_str(r#"{"tolerance": 0.001, "conditional_axis": "X", "seed": 3}"#)
                .unwrap();
        assert_eq!(options.tolerance, 0.001);
        assert_eq!(options.conditional_axis, Axis::X);
        assert_eq!(options.seed, Some(3));

        assert!(serde_json::from_str::<Options>(r#"{"conditional_axis": "Z"}"#).is_err());
        assert!(serde_json::from_str::<Options>(r#"{"axis": "X"}"#).is_err());
    }
}
