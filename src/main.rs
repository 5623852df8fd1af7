use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;

use oxycheck::config::{CheckConfig, Mode, load_config};
use oxycheck::http_probe::prelude::*;
use oxycheck::source::JobSource;
use oxycheck::{pool, report};

/// Check the health of every URL in a file with a bounded pool of workers.
#[derive(Debug, Parser)]
#[command(name = "oxycheck", version, about)]
struct Cli {
    /// File with one URL per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Scheduling mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Abort on lines that are not valid URLs
    #[arg(long)]
    strict: bool,

    /// YAML configuration file (defaults to $CONFIG_FILE or ./oxycheck.yml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut CheckConfig) {
        if let Some(file) = &self.file {
            config.targets_file = file.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.strict {
            config.strict_source = true;
        }
    }
}

async fn check(cli: Cli) -> oxycheck::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    // Everything that can abort the run is validated before a worker starts.
    let pool_config = config.pool_config()?;
    let prober = HttpProber::new(&config.probe_settings())?;
    let jobs = JobSource::new(config.strict_source).read_file(&config.targets_file)?;

    let started_at = Utc::now();
    let outcome = pool::run(config.mode, pool_config, Arc::new(prober), jobs).await;

    let mut stdout = std::io::stdout().lock();
    report::render(&mut stdout, &outcome, started_at)?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match check(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
