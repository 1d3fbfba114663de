use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, ResourceExt};
use std::path::Path;
use tracing::{debug, info};

use super::pods::PodStore;

/// Authenticated handle to the cluster's API server.
#[derive(Clone)]
pub struct ClusterSession {
    client: Client,
}

impl ClusterSession {
    /// Connects using the given kubeconfig file, or infers the configuration
    /// (in-cluster service account, default kubeconfig) when no path is given.
    #[tracing::instrument(err)]
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                debug!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed reading kubeconfig {}", path.display()))?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .with_context(|| {
                        format!("Failed loading client config from {}", path.display())
                    })?
            }
            None => kube::Config::infer()
                .await
                .context("Failed inferring client config")?,
        };
        info!("Connecting to {}", config.cluster_url);
        let client = Client::try_from(config).context("Failed creating Kubernetes client")?;
        Ok(Self { client })
    }

    fn pods_in(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl PodStore for ClusterSession {
    async fn list_all(&self) -> kube::Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        Ok(pods.list(&ListParams::default()).await?.items)
    }

    async fn get(&self, namespace: &str, name: &str) -> kube::Result<Pod> {
        self.pods_in(namespace).get(name).await
    }

    async fn replace(&self, pod: &Pod) -> kube::Result<Pod> {
        let namespace = pod.namespace().unwrap_or_default();
        self.pods_in(&namespace)
            .replace(&pod.name_any(), &PostParams::default(), pod)
            .await
    }
}
