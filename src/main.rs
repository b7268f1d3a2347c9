use anyhow::{Context, Result};
use calcengine::calculator::{copy_to_clipboard, evaluate_expression};
use calcengine::cli::{Repl, load_history};
use calcengine::config::Config;
use calcengine::session::{History, Session};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Evaluate arithmetic expressions, or start an interactive session.
#[derive(Parser, Debug)]
#[command(name = "calcengine", version, about)]
struct Args {
    /// Expression to evaluate. Starts an interactive session when omitted.
    expression: Vec<String>,

    /// Number of decimal places (0-10).
    #[arg(short, long)]
    precision: Option<u8>,

    /// Do not group the integer part with thousands separators.
    #[arg(long)]
    no_separator: bool,

    /// Copy each result to the clipboard.
    #[arg(long)]
    copy: bool,

    /// Path to the config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let mut settings = config.format;
    if let Some(precision) = args.precision {
        settings = settings.with_precision(precision);
    }
    if args.no_separator {
        settings = settings.with_separator(false);
    }

    if !args.expression.is_empty() {
        let text = args.expression.join(" ");
        let evaluation = evaluate_expression(&text, settings)
            .with_context(|| format!("Cannot evaluate '{}'", text.trim()))?;
        println!("{}", evaluation.formatted);
        if args.copy {
            copy_to_clipboard(&evaluation.formatted)?;
        }
        return Ok(());
    }

    let history_path = if config.history.auto_save {
        config.history.resolved_path()
    } else {
        None
    };
    let history = match &history_path {
        Some(path) => load_history(path).unwrap_or_else(|err| {
            warn!("{:#}", err);
            History::new()
        }),
        None => History::new(),
    };

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("calcengine: enter an expression, :help for commands");
    }

    let session = Session::new(settings).with_history(history);
    let mut repl = Repl::new(session)
        .with_history_path(history_path)
        .with_clipboard(args.copy);
    repl.run(stdin.lock(), &mut io::stdout().lock())
}
