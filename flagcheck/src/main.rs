//! JVM flag constraint checker.
//!
//! Reads `flagcheck.toml` (platform profile and flag settings), validates
//! every constrained flag in dependency order, and reports violations or
//! the corrections applied.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use flagcheck::check::{CheckOutcome, check_file};
use flagcheck::core::registry::ConstraintRegistry;
use flagcheck::core::types::Mode;
use flagcheck::exit_codes;
use flagcheck::io::config::{CONFIG_FILE, CheckConfig, load_config, write_config};
use flagcheck::logging;

#[derive(Parser)]
#[command(
    name = "flagcheck",
    version,
    about = "Validate and auto-correct JVM tuning flags"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `flagcheck.toml`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
    /// Validate the configured flags.
    Check {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
        /// Override the mode from the config file.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Print every violation as it is found.
        #[arg(short, long)]
        verbose: bool,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the constraint evaluation order.
    Order {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Strict,
    AutoCorrect,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => Mode::Strict,
            ModeArg::AutoCorrect => Mode::AutoCorrect,
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force, config } => cmd_init(&config, force),
        Command::Check {
            config,
            mode,
            verbose,
            json,
        } => cmd_check(&config, mode.map(Mode::from), verbose, json),
        Command::Order { config } => cmd_order(&config),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!(
            "flagcheck init: {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_config(path, &CheckConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_check(path: &Path, mode: Option<Mode>, verbose: bool, json: bool) -> Result<i32> {
    let outcome = check_file(path, mode, verbose)?;
    if json {
        let payload = serde_json::to_string_pretty(&outcome).context("serialize report json")?;
        println!("{payload}");
    } else {
        print_outcome(&outcome);
    }
    Ok(if outcome.is_satisfied() {
        exit_codes::OK
    } else {
        exit_codes::VIOLATED
    })
}

fn print_outcome(outcome: &CheckOutcome) {
    for diagnostic in &outcome.diagnostics {
        println!("{}", diagnostic.message);
    }
    let report = &outcome.report;
    println!(
        "{}: {} checked, {} skipped, {} corrected, {} violated",
        report.mode.label(),
        report.checked.len(),
        report.skipped.len(),
        report.corrections.len(),
        report.violations.len()
    );
    if !report.is_satisfied() {
        let flags: Vec<&str> = report
            .violations
            .iter()
            .map(|violation| violation.flag.as_str())
            .collect();
        println!("violated: {}", flags.join(", "));
    }
}

fn cmd_order(path: &Path) -> Result<i32> {
    let cfg = load_config(path)?;
    let registry = ConstraintRegistry::builtin().context("build constraint registry")?;
    for constraint in registry.evaluation_order() {
        if constraint.feature.is_available(&cfg.platform) {
            println!("{}", constraint.flag);
        } else {
            println!("{} (skipped)", constraint.flag);
        }
    }
    Ok(exit_codes::OK)
}
