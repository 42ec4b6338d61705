//! Command-line front end.
//!
//! Reads an optimization request (JSON) from a file or stdin and writes the
//! ranked timetable options as JSON to stdout.
//!
//! ```text
//! timetable-optimize request.json --config optimizer.toml --pretty
//! cat request.json | timetable-optimize
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use timetable_optimizer::api::{self, OptimizeRequest};
use timetable_optimizer::config::OptimizerConfig;
use timetable_optimizer::{logging, Optimizer};

#[derive(Parser)]
#[command(name = "timetable-optimize")]
#[command(about = "Generate ranked timetable options from a JSON request", long_about = None)]
struct Cli {
    /// Request file. Reads stdin when omitted.
    request: Option<PathBuf>,

    /// Optimizer config (TOML)
    #[arg(short, long, env = "TIMETABLE_OPTIMIZER_CONFIG")]
    config: Option<PathBuf>,

    /// Number of options, overriding the request
    #[arg(short = 'n', long)]
    options: Option<usize>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => OptimizerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OptimizerConfig::default(),
    };

    let text = match &cli.request {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading request {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };

    let mut request: OptimizeRequest =
        serde_json::from_str(&text).context("parsing optimization request")?;
    if let Some(n) = cli.options {
        request.num_options = Some(i64::try_from(n).unwrap_or(i64::MAX));
    }

    let responses = api::handle(&request, &Optimizer::new(config))?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&responses)?
    } else {
        serde_json::to_string(&responses)?
    };
    println!("{out}");
    Ok(())
}
