//! kube-rs backed cluster session

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use std::path::Path;
use tracing::{debug, info};

use super::{PodSource, RateLimiter};
use crate::config::SessionConfig;
use crate::error::{RelocatorError, Result};

/// Authenticated, rate-limited connection to a cluster
#[derive(Clone)]
pub struct ClusterSession {
    client: Client,
    limiter: RateLimiter,
    api_server: String,
}

impl ClusterSession {
    /// Build a session from a kubeconfig path or a master URL
    ///
    /// The kubeconfig wins when both are set. Missing both is a
    /// configuration error.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        config.validate()?;

        let kube_config = match (&config.kubeconfig, &config.master_url) {
            (Some(path), _) if !path.as_os_str().is_empty() => from_kubeconfig(path).await?,
            (_, Some(url)) => from_master_url(url)?,
            _ => {
                return Err(RelocatorError::Configuration(
                    "must specify master URL or kubeconfig".to_string(),
                ))
            }
        };

        let api_server = kube_config.cluster_url.to_string();
        let client = Client::try_from(kube_config).map_err(|e| {
            RelocatorError::Configuration(format!("Failed to create Kubernetes client: {}", e))
        })?;

        info!(
            api_server = %api_server,
            qps = config.qps,
            burst = config.burst,
            "Cluster session ready"
        );

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.qps, config.burst),
            api_server,
        })
    }

    /// Wrap an existing client
    pub fn from_client(client: Client, limiter: RateLimiter, api_server: impl Into<String>) -> Self {
        Self {
            client,
            limiter,
            api_server: api_server.into(),
        }
    }

    /// Get the API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Get the inner kube-rs client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

async fn from_kubeconfig(path: &Path) -> Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        RelocatorError::Configuration(format!(
            "Failed to read kubeconfig from {}: {}",
            path.display(),
            e
        ))
    })?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            RelocatorError::Configuration(format!("Failed to create Kubernetes config: {}", e))
        })
}

/// In-cluster credentials are reused when present, with the server overridden
fn from_master_url(url: &str) -> Result<Config> {
    let cluster_url: http::Uri = url.parse().map_err(|e| {
        RelocatorError::Configuration(format!("Invalid master URL {}: {}", url, e))
    })?;

    match Config::incluster() {
        Ok(mut config) => {
            config.cluster_url = cluster_url;
            Ok(config)
        }
        Err(e) => {
            debug!(error = %e, "No in-cluster credentials, connecting anonymously");
            Ok(Config::new(cluster_url))
        }
    }
}

fn pod_target(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

#[async_trait]
impl PodSource for ClusterSession {
    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        self.limiter.acquire().await;

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        match pods.get(name).await {
            Ok(pod) => Ok(pod),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                Err(RelocatorError::PodNotFound(pod_target(namespace, name)))
            }
            Err(source) => Err(RelocatorError::Client {
                target: pod_target(namespace, name),
                source,
            }),
        }
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>> {
        self.limiter.acquire().await;

        let pods: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let list = pods
            .list(&ListParams::default())
            .await
            .map_err(|source| RelocatorError::Client {
                target: format!("pods in {}", namespace.unwrap_or("all namespaces")),
                source,
            })?;

        debug!(count = list.items.len(), "Listed pods");
        Ok(list.items)
    }
}
