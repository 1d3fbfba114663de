use crate::k8s::{is_conflict, is_controller_managed, pod_key, set_restarted_at, PodStore};
use crate::report::{PodOutcome, Reporter};
use crate::retry::{retry, Backoff};
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use tracing::{debug, info, warn};

/// Pods whose name contains this are restarted.
pub const MATCH_SUBSTRING: &str = "database";

#[derive(Debug, thiserror::Error)]
pub enum RestartError {
    #[error("failed to get pod {name}: {source}")]
    Fetch {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to update pod {name}: {source}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}

impl RestartError {
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Fetch { .. } => false,
            Self::Update { source, .. } => is_conflict(source),
        }
    }
}

pub fn is_restart_candidate(pod_name: &str) -> bool {
    pod_name.contains(MATCH_SUBSTRING)
}

/// Lists every pod and restarts the matching ones one at a time.
///
/// Only a failed listing or an unwritable report aborts the pass; per-pod
/// failures are reported and returned as [`PodOutcome::Failed`].
#[tracing::instrument(skip_all)]
pub async fn restart_matching_pods<S, W>(
    store: &S,
    backoff: &Backoff,
    reporter: &mut Reporter<W>,
) -> Result<Vec<PodOutcome>>
where
    S: PodStore,
    W: Write,
{
    reporter.listing()?;
    let pods = store
        .list_all()
        .await
        .context("Failed listing pods in all namespaces")?;
    info!("Found {} pods", pods.len());

    let mut outcomes = Vec::with_capacity(pods.len());
    for pod in &pods {
        let (namespace, name) = pod_key(pod);

        let outcome = if is_restart_candidate(&name) {
            reporter.redeploying(&namespace, &name)?;
            match restart_pod(store, &namespace, &name, backoff).await {
                Ok(()) => PodOutcome::Restarted { namespace, name },
                Err(error) => {
                    warn!(%namespace, %name, "Restart failed: {}", error);
                    PodOutcome::Failed {
                        namespace,
                        name,
                        error,
                    }
                }
            }
        } else {
            debug!(%namespace, %name, "Name does not match");
            PodOutcome::NoMatch { namespace, name }
        };

        reporter.outcome(&outcome)?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Stamps the restart annotation on the latest copy of the pod, retrying the
/// whole read-modify-write when the update conflicts.
async fn restart_pod<S: PodStore>(
    store: &S,
    namespace: &str,
    name: &str,
    backoff: &Backoff,
) -> Result<(), RestartError> {
    retry(backoff, RestartError::is_conflict, move || async move {
        let mut pod = store
            .get(namespace, name)
            .await
            .map_err(|source| RestartError::Fetch {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source,
            })?;

        if !is_controller_managed(&pod) {
            warn!(%namespace, %name, "Pod has no controller, the annotation alone will not restart it");
        }
        set_restarted_at(&mut pod, Utc::now());

        store
            .replace(&pod)
            .await
            .map_err(|source| RestartError::Update {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source,
            })?;
        debug!(%namespace, %name, "Annotation updated");
        Ok::<_, RestartError>(())
    })
    .await
}
