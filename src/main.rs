use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

use newsroom::api::{self, SnapshotSource};
use newsroom::vector::SentenceEncoder;
use newsroom::{logging, pipeline, PipelineConfig};

#[derive(Parser)]
#[clap(name = "newsroom", about = "Fetch, cluster and serve regional news")]
struct Cli {
    #[clap(flatten)]
    overrides: Overrides,

    #[clap(subcommand)]
    command: Commands,
}

/// Settings that take precedence over the environment.
#[derive(Args)]
struct Overrides {
    /// Raw snapshot location
    #[clap(long, global = true)]
    raw_path: Option<PathBuf>,

    /// Processed snapshot location
    #[clap(long, global = true)]
    processed_path: Option<PathBuf>,

    /// Number of topic clusters
    #[clap(long, global = true)]
    clusters: Option<usize>,

    /// Seed for centroid initialization
    #[clap(long, global = true)]
    seed: Option<u64>,

    /// Number of k-means initialization attempts
    #[clap(long, global = true)]
    n_init: Option<usize>,

    /// Encoder model repository id
    #[clap(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all regional feeds and write the raw snapshot
    Fetch,

    /// Embed and cluster the raw snapshot, writing the processed snapshot
    Process,

    /// Fetch, then process
    Run,

    /// Serve the processed snapshot over HTTP
    Serve {
        /// Address to bind
        #[clap(long)]
        addr: Option<SocketAddr>,

        /// Serve from this mirror URL instead of the local file
        #[clap(long)]
        mirror: Option<String>,
    },
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(path) = self.raw_path {
            config.raw_snapshot_path = path;
        }
        if let Some(path) = self.processed_path {
            config.processed_snapshot_path = path;
        }
        if let Some(k) = self.clusters {
            config.clustering.k = k;
        }
        if let Some(seed) = self.seed {
            config.clustering.seed = seed;
        }
        if let Some(n_init) = self.n_init {
            config.clustering.n_init = n_init;
        }
        if let Some(model) = self.model {
            config.encoder.model = model;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env()?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    let outcome = match cli.command {
        Commands::Fetch => pipeline::ingest(&config).await.map(|_| ()),
        Commands::Process => process(&config).await,
        Commands::Run => match pipeline::ingest(&config).await {
            Ok(_) => process(&config).await,
            Err(e) => Err(e),
        },
        Commands::Serve { addr, mirror } => {
            let addr = addr.unwrap_or(config.api_addr);
            let source = match mirror.or(config.mirror_url.clone()) {
                Some(url) => SnapshotSource::Remote(url),
                None => SnapshotSource::Local(config.processed_snapshot_path.clone()),
            };
            api::serve(addr, source).await
        }
    };

    if let Err(e) = &outcome {
        error!("Run aborted: {:#}", e);
    }
    outcome
}

async fn process(config: &PipelineConfig) -> Result<()> {
    let raw = pipeline::load_corpus(config)?;

    info!("Loading encoder {}", config.encoder.model);
    let encoder = SentenceEncoder::load(&config.encoder).await?;

    // CPU-bound inference
    let config = config.clone();
    tokio::task::spawn_blocking(move || pipeline::cluster_corpus(&config, &raw, &encoder))
        .await??;
    Ok(())
}
