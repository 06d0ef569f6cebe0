use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod embed;
mod error;
mod report;
mod version;

use config::{ColorPolicy, Config, MinifierConfig};
use report::Reporter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FWGEN_GIT_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "fwgen",
    version = VERSION,
    about = "Build-step generators for firmware headers",
    long_about = "Build-step generators for firmware headers.\n\n\
        Each run is a one-shot, idempotent rewrite of its output files. Running two \
        instances against the same outputs at once is not supported; the last writer wins."
)]
struct Cli {
    #[arg(long, global = true, help = "Project root (defaults to the current directory)")]
    root: Option<PathBuf>,
    #[arg(long, global = true, help = "Config file, relative to the root (default: fwgen.toml if present)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, help = "When to color output")]
    color: Option<ColorPolicy>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More diagnostics")]
    verbose: u8,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Fewer diagnostics")]
    quiet: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Minify, gzip and embed web assets as C byte arrays
    Embed {
        #[arg(long, help = "Minify in-process instead of running an external minifier")]
        builtin: bool,
        #[arg(long, conflicts_with = "builtin", help = "External minifier, run as `<minifier> -o <out> <in>`")]
        minifier: Option<PathBuf>,
    },
    /// Write the git tag and short hash into a version header
    Version {
        #[arg(long, help = "Header to write, relative to the root")]
        output: Option<PathBuf>,
        #[arg(long, help = "git executable")]
        git: Option<PathBuf>,
    },
}

/// Maps `-v`/`-q` counts to a filter: warnings by default, `-q` for errors
/// only, `-qq` for nothing.
fn log_filter(verbose: u8, quiet: u8) -> &'static str {
    match (verbose, quiet) {
        (_, q) if q >= 2 => "off",
        (_, 1) => "error",
        (0, _) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let mut config = Config::load(&root, cli.config.as_deref())?;
    if let Some(color) = cli.color {
        config.color = color;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, cli.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.color.enabled())
        .with_writer(std::io::stderr)
        .init();

    match &config.source {
        Some(path) => log::debug!("loaded config from {}", path.display()),
        None => log::debug!("no config file under {}, using defaults", root.display()),
    }
    let mut reporter = Reporter::stdout(config.color.enabled());

    match cli.command {
        Commands::Embed { builtin, minifier } => {
            if builtin {
                config.minifier = MinifierConfig::Builtin;
            } else if let Some(program) = minifier {
                config.minifier = MinifierConfig::External { program };
            }
            let minifier = embed::Minifier::from_config(&config);
            log::debug!("minifier: {minifier:?}");

            let reports = embed::embed_all(&config, &minifier);
            for entry in &reports {
                embed::report_entry(&mut reporter, entry);
            }
            let failed = reports.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                log::warn!("{failed} of {} assets were not embedded", reports.len());
            }
        }
        Commands::Version { output, git } => {
            if let Some(output) = output {
                config.version.header = output;
            }
            if let Some(git) = git {
                config.version.git = git;
            }
            let header = config.resolve(&config.version.header);
            version::stamp(&config, &mut reporter)
                .with_context(|| format!("cannot write version header {}", header.display()))?;
        }
    }

    Ok(())
}
