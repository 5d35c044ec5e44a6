pub mod bivariate;
pub mod conditional;
pub mod distribution;
pub mod error;
pub mod expr;
pub mod joint;
pub mod outcome;
pub mod output;
pub mod predicate;

use lalrpop_util::lalrpop_mod;
lalrpop_mod!(pub grammar);

pub use bivariate::{BivariateDiscrete, Builder, Options, DEFAULT_TOLERANCE};
pub use distribution::{DiscreteDistribution, Stats};
pub use error::Error;
pub use outcome::{Axis, Outcome};
pub use predicate::{CompiledPredicate, Fallible, Predicate};
