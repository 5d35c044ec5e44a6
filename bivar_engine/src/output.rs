use serde::Serialize;
use std::fmt::Write;

use crate::bivariate::BivariateDiscrete;
use crate::distribution::{DiscreteDistribution, Stats};
use crate::outcome::Axis;

/// Renders a distribution in AnyDice's export format: a header with the name, mean, standard
/// deviation, minimum and maximum, then one `value,percent` line per support entry.
pub fn export_distribution(name: &str, distribution: &DiscreteDistribution) -> String {
    let stats = distribution.stats();
    let (min, max) = (
        distribution.min().unwrap_or(f64::NAN),
        distribution.max().unwrap_or(f64::NAN),
    );

    let mut string = String::new();
    writeln!(
        string,
        "\"{}\",{},{},{},{}",
        name,
        stats.mean,
        stats.std(),
        min,
        max
    )
    .unwrap();
    writeln!(string, "#,%").unwrap();
    for (value, prob) in distribution.iter() {
        writeln!(string, "{},{}", value, prob * 100.0).unwrap();
    }
    string
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub outcomes: usize,
    pub x: AxisSummary,
    pub y: AxisSummary,
    pub conditional: Option<ConditionalSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisSummary {
    pub stats: Stats,
    pub probabilities: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionalSummary {
    pub axis: Axis,
    pub event_probability: f64,
    pub stats: Stats,
    pub probabilities: Vec<(f64, f64)>,
}

impl AxisSummary {
    fn new(distribution: &DiscreteDistribution) -> Self {
        Self {
            stats: distribution.stats(),
            probabilities: distribution.iter().collect(),
        }
    }
}

impl From<&BivariateDiscrete> for Summary {
    fn from(d: &BivariateDiscrete) -> Self {
        let conditional = match (
            d.conditional_distribution(),
            d.conditional_axis(),
            d.event_probability(),
        ) {
            (Some(distribution), Some(axis), Ok(event_probability)) => Some(ConditionalSummary {
                axis,
                event_probability,
                stats: distribution.stats(),
                probabilities: distribution.iter().collect(),
            }),
            _ => None,
        };
        Self {
            outcomes: d.joint().len(),
            x: AxisSummary::new(d.marginal_x()),
            y: AxisSummary::new(d.marginal_y()),
            conditional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;

    fn dyadic() -> BivariateDiscrete {
        BivariateDiscrete::new(
            vec![(0, 0).into(), (0, 1).into(), (1, 0).into(), (1, 1).into()],
            vec![0.125, 0.375, 0.25, 0.25],
        )
        .unwrap()
    }

    #[test]
    fn test_export_marginal() {
        let d = dyadic();
        assert_eq!(
            export_distribution("Y", d.marginal_y()),
            "\"Y\",0.625,0.4841229182759271,0,1\n#,%\n0,37.5\n1,62.5\n"
        );
    }

    #[test]
    fn test_export_keeps_conditional_order() {
        let d = BivariateDiscrete::builder(
            vec![(1, 1).into(), (0, 0).into(), (1, 0).into()],
            vec![0.25, 0.25, 0.5],
        )
        .given(|o: Outcome| o.x == 1.0)
        .build()
        .unwrap();
        let export = export_distribution("Y | x == 1", d.conditional_distribution().unwrap());
        let lines = export.lines().skip(2).collect::<Vec<_>>();
        assert_eq!(lines, vec!["1,33.33333333333333", "0,66.66666666666666"]);
    }

    #[test]
    fn test_summary() {
        let d = BivariateDiscrete::builder(
            vec![(0, 0).into(), (0, 1).into(), (1, 0).into(), (1, 1).into()],
            vec![0.125, 0.375, 0.25, 0.25],
        )
        .given(|o: Outcome| o.y == 1.0)
        .conditional_axis(Axis::X)
        .build()
        .unwrap();
        let summary = Summary::from(&d);
        assert_eq!(summary.outcomes, 4);
        assert_eq!(summary.x.probabilities, vec![(0.0, 0.5), (1.0, 0.5)]);
        assert_eq!(summary.y.stats.mean, 0.625);
        let conditional = summary.conditional.unwrap();
        assert_eq!(conditional.axis, Axis::X);
        assert_eq!(conditional.event_probability, 0.625);
        assert_eq!(conditional.probabilities, vec![(0.0, 0.6), (1.0, 0.4)]);
        assert!(Summary::from(&dyadic()).conditional.is_none());
    }
}
