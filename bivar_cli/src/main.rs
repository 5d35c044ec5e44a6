use bivar_cli::Session;
use bivar_engine::Options;
use clap::Parser;
use miette::{Context, IntoDiagnostic};
use rustyline::error::ReadlineError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bivar")]
#[command(about = "Explore a discrete bivariate distribution interactively")]
#[command(version)]
struct Cli {
    /// Table to load at startup
    table: Option<PathBuf>,

    /// JSON file with default options (tolerance, conditional_axis, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Allowed deviation of the total probability from 1
    #[arg(long)]
    tolerance: Option<f64>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("cannot read [{}]", path.display()))?;
            serde_json::from_str::<Options>(&text)
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid options in [{}]", path.display()))?
        }
        None => Options::default(),
    };
    if let Some(seed) = cli.seed {
        options.seed = Some(seed);
    }
    if let Some(tolerance) = cli.tolerance {
        options.tolerance = tolerance;
    }
    options.validate()?;
    tracing::debug!(?options, "starting");

    let base_dir = std::env::current_dir().into_diagnostic()?;
    let mut session = Session::new(base_dir, options);
    if let Some(table) = &cli.table {
        run(&mut session, &format!("load {}", table.display()));
    }

    let mut rl = rustyline::DefaultEditor::new().into_diagnostic()?;
    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).into_diagnostic(),
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let _ = rl.add_history_entry(line);
        if matches!(line, "quit" | "exit") {
            break;
        }
        run(&mut session, line);
    }
    Ok(())
}

fn run(session: &mut Session, line: &str) {
    match session.execute(line) {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => eprintln!("{}", e.render()),
    }
}
