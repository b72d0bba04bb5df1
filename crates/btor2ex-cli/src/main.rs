//! Command-line interface for the btor2ex bounded model checker.

use btor2ex_ir::{parse, print_program, ProofSchedule, DEFAULT_COUNTER_NAME};
use btor2ex_symbolic::{check, BmcConfig, BmcOutcome, SolverKind, DEFAULT_MAX_FREE_BITS};
use clap::Parser;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BTOR2EX_GIT_HASH"),
    " ",
    env!("BTOR2EX_GIT_DATE"),
    ", ",
    env!("BTOR2EX_BUILD_TARGET"),
    ")"
);

/// CLI error with source context for pretty printing.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read file: {message}")]
    IoError { message: String },

    #[error("parse error: {message}")]
    #[diagnostic(code(btor2ex::parse_error))]
    ParseError {
        message: String,
        #[source_code]
        src: NamedSource<Arc<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("check error: {message}")]
    #[diagnostic(code(btor2ex::check_error))]
    CheckError { message: String },
}

impl CliError {
    fn from_parse_error(e: btor2ex_ir::ParseError, source: Arc<String>, filename: &str) -> Self {
        let span = e.span();
        CliError::ParseError {
            message: e.to_string(),
            src: NamedSource::new(filename, source),
            span: (span.start, span.len()).into(),
        }
    }
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "btor2ex", version, long_version = LONG_VERSION)]
#[command(about = "BTOR2 symbolic execution engine and bounded model checker", long_about = None)]
struct Cli {
    /// Input BTOR2 file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// BMC bound
    #[arg(short, long, default_value = "3")]
    bound: usize,

    /// Solver backend: z3 (default) or exhaustive
    #[arg(long, value_name = "SOLVER")]
    solver: Option<SolverKind>,

    /// Per-query solver timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Free-bit limit of the exhaustive solver
    #[arg(long, default_value_t = DEFAULT_MAX_FREE_BITS)]
    max_free_bits: u32,

    /// Splice a proof-schedule counter with this many steps into the design
    #[arg(long, value_name = "NUMSTEPS")]
    schedule: Option<u64>,

    /// Print the design with the proof-schedule counter instead of checking it
    #[arg(long)]
    emit_schedule: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = if cli.emit_schedule {
        cmd_emit_schedule(&cli)
    } else {
        cmd_check(&cli)
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn load(file: &PathBuf) -> CliResult<Vec<btor2ex_ir::Instruction>> {
    let filename = file.display().to_string();
    let source = Arc::new(fs::read_to_string(file).map_err(|e| CliError::IoError {
        message: format!("{filename}: {e}"),
    })?);

    info!("parsing...");
    parse(&source).map_err(|e| CliError::from_parse_error(e, source.clone(), &filename))
}

fn schedule(cli: &Cli) -> ProofSchedule {
    match cli.schedule {
        Some(num_steps) => ProofSchedule::new(DEFAULT_COUNTER_NAME, num_steps),
        None => ProofSchedule::default(),
    }
}

fn cmd_emit_schedule(cli: &Cli) -> CliResult<()> {
    let program = load(&cli.file)?;
    let spliced = schedule(cli).splice(&program);
    print!("{}", print_program(&spliced));
    Ok(())
}

fn cmd_check(cli: &Cli) -> CliResult<()> {
    let mut program = load(&cli.file)?;
    if cli.schedule.is_some() {
        let sched = schedule(cli);
        info!(
            counter = sched.counter_name(),
            steps = sched.num_steps(),
            "splicing proof schedule"
        );
        program = sched.splice(&program);
    }

    let config = BmcConfig {
        depth: cli.bound,
        solver: cli.solver.unwrap_or_default(),
        timeout_ms: cli.timeout_ms,
        max_free_bits: cli.max_free_bits,
    };

    info!(bound = config.depth, solver = %config.solver, "model checking...");
    let start = Instant::now();
    let outcome = check(program, &config).map_err(|e| CliError::CheckError {
        message: e.to_string(),
    })?;
    info!(secs = start.elapsed().as_secs_f64(), "done");

    match outcome {
        BmcOutcome::Safe { .. } => println!("SAFE"),
        BmcOutcome::Unsafe { .. } => println!("UNSAFE: please see log for trace"),
        BmcOutcome::Unknown { reason, .. } => {
            println!("UNKNOWN: {reason}");
            std::process::exit(2);
        }
    }

    Ok(())
}
