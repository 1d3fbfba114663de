mod config;
mod k8s;
mod logging;
mod report;
mod restart;
mod retry;

use crate::config::Config;
use crate::k8s::ClusterSession;
use crate::report::Reporter;
use anyhow::Result;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env_args();
    logging::init(config.debug())?;

    let kubeconfig = config.kubeconfig_path();
    let session = ClusterSession::connect(kubeconfig.as_deref()).await?;

    let mut reporter = Reporter::stdout();
    let outcomes =
        restart::restart_matching_pods(&session, &config.backoff(), &mut reporter).await?;
    let failed: Vec<_> = outcomes
        .iter()
        .filter(|outcome| outcome.is_failed())
        .map(|outcome| outcome.pod())
        .collect();
    debug!(pods = outcomes.len(), ?failed, "Pass finished");
    info!("Done");

    Ok(())
}
