use async_trait::async_trait;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tether_core::impls::MemoryBroker;
use tether_core::ports::Broker;
use tether_core::{BoxError, Handler, JobOptions, JobQueueBuilder, Task, WorkerGroup, observability};

mod settings;

use settings::{Backend, Settings};

#[derive(Parser, Debug)]
#[clap(version, about)]
/// Enqueue a demo job, run it on a local worker group and print its result
struct Args {
    /// debug-level logging unless RUST_LOG is set
    #[arg(short = 'v')]
    verbose: bool,

    /// path to a TOML config file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Greet {
    name: String,
}

impl Task for Greet {
    const TYPE: &'static str = "demo.greet.v1";
    type Output = String;
}

struct GreetHandler;

#[async_trait]
impl Handler<Greet> for GreetHandler {
    async fn handle(&self, task: Greet) -> Result<String, BoxError> {
        Ok(format!("Hello, {}!", task.name))
    }
}

async fn open_broker(settings: &Settings) -> anyhow::Result<Arc<dyn Broker>> {
    match settings.broker.backend {
        Backend::Memory => Ok(Arc::new(MemoryBroker::new())),
        #[cfg(feature = "redis")]
        Backend::Redis => {
            let url = settings
                .broker
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("broker.url is required for the redis backend"))?;
            Ok(Arc::new(tether_core::impls::RedisBroker::connect(url).await?))
        }
        #[cfg(not(feature = "redis"))]
        Backend::Redis => anyhow::bail!("built without the `redis` feature"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.verbose {
        observability::init_with_default("debug");
    } else {
        observability::init();
    }

    let settings = Settings::load(args.config.as_deref())?;
    info!(?settings, "settings loaded");

    let queue = JobQueueBuilder::new(settings.queue.name.clone())
        .broker(open_broker(&settings).await?)
        .register::<Greet, _>(GreetHandler)?
        .build()?;

    let workers = WorkerGroup::spawn(settings.queue.workers, queue.clone());

    let options = JobOptions::new()
        .with_description("demo")
        .with_job_timeout(Duration::from_secs(30))
        .with_ttl(Duration::from_secs(3600));
    let job = queue
        .enqueue(&Greet { name: "World".into() }, options)
        .await?;
    info!(job_id = %job.id(), "job enqueued");

    let timeout = Duration::from_millis(settings.queue.result_timeout_ms);
    let greeting: String = job.wait_for_result(timeout).await?;
    println!("{greeting}");

    info!(
        job_id = %job.id(),
        status = %job.status().await,
        worker = ?job.worker_id().await?,
        "job finished"
    );

    job.delete().await?;
    workers.shutdown_and_join().await;
    Ok(())
}
