//! net-watch command line.
//!
//! Fetches URLs through an instrumented client and inspects the observation log.

use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use net_watch::client::{
    ClientFactory, DataObserver, DataTask, HttpClient, ReqwestClientFactory, TaskError, TaskId, TaskObserver,
    TaskRequest,
};
use net_watch::config::{load_config, NetWatchConfig};
use net_watch::observability::logging::init_logging;
use net_watch::store::file::resolve_log_path;
use net_watch::store::FileLogStore;
use net_watch::{NetWatch, ObservationLog, Status};

#[derive(Parser)]
#[command(name = "net-watch")]
#[command(about = "Observe outbound HTTP requests and inspect the observation log", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the log file, overrides the configuration
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch URLs through the instrumented client
    Fetch {
        #[arg(required = true)]
        urls: Vec<Url>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print the observation log
    Logs {
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the log file location
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusFilter {
    Success,
    Failure,
}

impl StatusFilter {
    fn matches(self, status: Status) -> bool {
        matches!(
            (self, status),
            (StatusFilter::Success, Status::Success) | (StatusFilter::Failure, Status::Failure)
        )
    }
}

/// Caller-side observer: counts body bytes and reports completions.
struct FetchProgress {
    bytes: DashMap<TaskId, usize>,
    done: mpsc::UnboundedSender<(TaskId, Option<TaskError>)>,
}

impl TaskObserver for FetchProgress {
    fn did_complete(&self, task: &DataTask, error: Option<&TaskError>) {
        let _ = self.done.send((task.task_identifier(), error.cloned()));
    }

    fn as_data_observer(&self) -> Option<&dyn DataObserver> {
        Some(self)
    }
}

impl DataObserver for FetchProgress {
    fn did_receive_data(&self, task: &DataTask, data: &Bytes) {
        *self.bytes.entry(task.task_identifier()).or_default() += data.len();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NetWatchConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.directory = Some(dir);
    }

    init_logging(&config.observability);

    match cli.command {
        Commands::Fetch { urls, timeout_secs } => {
            fetch(&config, urls, Duration::from_secs(timeout_secs)).await?;
        }
        Commands::Logs { status, json } => {
            print_logs(&config, status, json)?;
        }
        Commands::Path => {
            println!("{}", resolve_log_path(&config.storage)?.display());
        }
    }

    Ok(())
}

async fn fetch(config: &NetWatchConfig, urls: Vec<Url>, timeout: Duration) -> Result<(), Box<dyn std::error::Error>> {
    if NetWatch::configure(config).is_none() {
        eprintln!("warning: observation unavailable, requests will not be logged");
    }

    let http = reqwest::Client::builder().timeout(timeout).build()?;
    let factory = NetWatch::instrument(ReqwestClientFactory::current(http));

    let (done, mut completions) = mpsc::unbounded_channel();
    let progress = Arc::new(FetchProgress {
        bytes: DashMap::new(),
        done,
    });
    let client = factory.build(Some(progress.clone() as Arc<dyn TaskObserver>));

    let mut pending: HashMap<TaskId, Url> = HashMap::new();
    for url in urls {
        let task = client.data_task(TaskRequest::get(url.clone()));
        pending.insert(task.task_identifier(), url);
        client.resume(&task);
    }

    while !pending.is_empty() {
        let Some((task_id, error)) = completions.recv().await else {
            break;
        };
        let Some(url) = pending.remove(&task_id) else {
            continue;
        };
        let bytes = progress.bytes.get(&task_id).map(|b| *b).unwrap_or(0);
        match error {
            None => println!("OK    {url} ({bytes} bytes)"),
            Some(e) => println!("FAIL  {url}: {e}"),
        }
    }

    Ok(())
}

fn print_logs(config: &NetWatchConfig, status: Option<StatusFilter>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileLogStore::from_config(&config.storage)?;
    let records: Vec<_> = store
        .get_all()?
        .into_iter()
        .filter(|r| status.map_or(true, |s| s.matches(r.status())))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No observations in {}", store.path().display());
    }
    for record in &records {
        println!(
            "{:<8} {:>7} ms  {} -> {}",
            record.status().as_str(),
            record.duration_millis(),
            record.initial_url(),
            record.final_url()
        );
    }
    Ok(())
}
