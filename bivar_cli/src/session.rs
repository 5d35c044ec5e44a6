//! The REPL session: the loaded table, the current options and conditioning predicate, and the
//! distribution rebuilt from them whenever one changes.

use bivar_engine::output::{export_distribution, Summary};
use bivar_engine::predicate::CompileError;
use bivar_engine::{Axis, BivariateDiscrete, CompiledPredicate, Options, Stats};
use clap::{Parser, Subcommand};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::render_diagnostic;
use crate::table::{read_table, resolve, Table, Weights};

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("Cannot read [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot read [{}]: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Invalid record on line {line} of [{}]: {message}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("No table is loaded")]
    #[diagnostic(help("Load one with `load PATH`."))]
    NoTable,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] bivar_engine::Error),

    #[error("{error}")]
    Compile {
        predicate: String,
        #[diagnostic_source]
        error: CompileError,
    },

    #[error("{error}")]
    Conditional {
        predicate: String,
        #[diagnostic_source]
        error: bivar_engine::Error,
    },

    #[error("Cannot serialize the summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Renders the error for the terminal, pointing into the predicate when it has a location.
    pub fn render(&self) -> String {
        match self {
            SessionError::Usage(e) => e.to_string(),
            SessionError::Compile { predicate, error } => {
                render_diagnostic(error, Some(predicate.as_str()))
            }
            SessionError::Conditional { predicate, error } => {
                render_diagnostic(error, Some(predicate.as_str()))
            }
            e => render_diagnostic(e, None),
        }
    }
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a CSV table with x, y and either p or count columns.
    Load { path: PathBuf },
    /// Means, variances and standard deviations of the marginals and the conditional.
    Stats,
    /// Print a marginal distribution.
    Marginal { axis: Axis },
    /// Cumulative probabilities.
    Cdf {
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        /// The probability of the conditioning event.
        #[arg(long)]
        event: bool,
    },
    /// Condition on a predicate such as `x + y > 7`.
    Given {
        #[arg(long = "on", default_value_t)]
        axis: Axis,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        predicate: Vec<String>,
    },
    /// Drop the conditioning predicate.
    Clear,
    /// Draw outcome pairs.
    Sample { count: usize },
    /// Everything as JSON.
    Summary,
    #[command(subcommand)]
    Set(Setting),
}

#[derive(Debug, Subcommand)]
enum Setting {
    Seed { value: u64 },
    Tolerance {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

pub struct Session {
    base_dir: PathBuf,
    options: Options,
    table: Option<Table>,
    predicate: Option<CompiledPredicate>,
    distribution: Option<BivariateDiscrete>,
}

impl Session {
    /// Relative table paths are resolved against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            base_dir: base_dir.into(),
            options,
            table: None,
            predicate: None,
            distribution: None,
        }
    }

    /// Runs one command line and returns what it prints.
    ///
    /// A failing command leaves the session as it was.
    pub fn execute(&mut self, line: &str) -> Result<String, SessionError> {
        let Line { command } = Line::try_parse_from(line.split_whitespace())?;
        tracing::debug!(?command, "execute");
        match command {
            Command::Load { path } => self.load(path),
            Command::Stats => self.stats(),
            Command::Marginal { axis } => {
                let d = self.distribution()?;
                let marginal = match axis {
                    Axis::X => d.marginal_x(),
                    Axis::Y => d.marginal_y(),
                };
                Ok(export_distribution(&axis.to_string(), marginal))
            }
            Command::Cdf { x, y, event } => Ok(self.distribution()?.cdf(x, y, event)?.to_string()),
            Command::Given { axis, predicate } => self.given(axis, &predicate.join(" ")),
            Command::Clear => {
                let table = self.table.as_ref().ok_or(SessionError::NoTable)?;
                self.distribution = Some(build(table, self.options, None)?);
                self.predicate = None;
                Ok(String::new())
            }
            Command::Sample { count } => {
                let d = self.distribution.as_mut().ok_or(SessionError::NoTable)?;
                Ok(d.rvs(count)
                    .iter()
                    .map(|o| format!("{}\n", o))
                    .collect())
            }
            Command::Summary => Ok(serde_json::to_string_pretty(&Summary::from(
                self.distribution()?,
            ))?),
            Command::Set(setting) => {
                let mut options = self.options;
                match setting {
                    Setting::Seed { value } => options.seed = Some(value),
                    Setting::Tolerance { value } => options.tolerance = value,
                }
                self.rebuild(options, self.predicate.clone())?;
                Ok(String::new())
            }
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn distribution(&self) -> Result<&BivariateDiscrete, SessionError> {
        self.distribution.as_ref().ok_or(SessionError::NoTable)
    }

    fn load(&mut self, path: PathBuf) -> Result<String, SessionError> {
        let full_path = resolve(&self.base_dir, &path);
        if let Err(source) = std::fs::metadata(&full_path) {
            return Err(SessionError::Io {
                path: full_path,
                source,
            });
        }
        let table = read_table(&full_path)?;
        let distribution = match &self.predicate {
            Some(predicate) => build(&table, self.options, Some(predicate)).map_err(|error| {
                SessionError::Conditional {
                    predicate: predicate.source().to_string(),
                    error,
                }
            })?,
            None => build(&table, self.options, None)?,
        };
        let count = table.outcomes.len();
        tracing::info!(path = %full_path.display(), outcomes = count, "loaded table");
        self.table = Some(table);
        self.distribution = Some(distribution);
        Ok(format!("loaded {} outcomes from {}", count, path.display()))
    }

    fn given(&mut self, axis: Axis, source: &str) -> Result<String, SessionError> {
        let predicate = CompiledPredicate::parse(source).map_err(|error| SessionError::Compile {
            predicate: source.to_string(),
            error,
        })?;
        let mut options = self.options;
        options.conditional_axis = axis;
        self.rebuild(options, Some(predicate.clone()))?;

        let d = self.distribution()?;
        let mut output = String::new();
        if let Some(conditional) = d.conditional_distribution() {
            output.push_str(&export_distribution(
                &format!("{} | {}", axis, predicate),
                conditional,
            ));
        }
        output.push_str(&format!("P({}) = {}", predicate, d.event_probability()?));
        Ok(output)
    }

    fn stats(&self) -> Result<String, SessionError> {
        let d = self.distribution()?;
        let (x, y) = d.stats();
        let mut lines = vec![stats_line("X", x), stats_line("Y", y)];
        if let (Some(predicate), Some(axis)) = (&self.predicate, d.conditional_axis()) {
            lines.push(stats_line(
                &format!("{} | {}", axis, predicate),
                d.conditional_stats()?,
            ));
        }
        Ok(lines.join("\n"))
    }

    /// Rebuilds the distribution from the loaded table, committing the new options and predicate
    /// only if that succeeds.
    fn rebuild(
        &mut self,
        options: Options,
        predicate: Option<CompiledPredicate>,
    ) -> Result<(), SessionError> {
        options.validate()?;
        let Some(table) = &self.table else {
            if predicate.is_some() {
                return Err(SessionError::NoTable);
            }
            self.options = options;
            return Ok(());
        };
        let distribution = match &predicate {
            Some(p) => build(table, options, Some(p)).map_err(|error| SessionError::Conditional {
                predicate: p.source().to_string(),
                error,
            })?,
            None => build(table, options, None)?,
        };
        self.options = options;
        self.predicate = predicate;
        self.distribution = Some(distribution);
        Ok(())
    }
}

fn build(
    table: &Table,
    options: Options,
    predicate: Option<&CompiledPredicate>,
) -> Result<BivariateDiscrete, bivar_engine::Error> {
    let outcomes = table.outcomes.clone();
    let builder = match &table.weights {
        Weights::Probabilities(p) => BivariateDiscrete::builder(outcomes, p.clone()),
        Weights::Counts(c) => BivariateDiscrete::builder_from_counts(outcomes, c.clone()),
    };
    let builder = builder.options(options);
    match predicate {
        Some(predicate) => builder.given(predicate.clone()).build(),
        None => builder.build(),
    }
}

fn stats_line(name: &str, stats: Stats) -> String {
    format!(
        "{}: mean {}, variance {}, std {}",
        name,
        stats.mean,
        stats.variance,
        stats.std()
    )
}
