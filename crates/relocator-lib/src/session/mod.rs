//! Cluster access for the relocator
//!
//! This module provides:
//! - The `PodSource` trait, the only seam through which the core reads pods
//! - `ClusterSession`, a kube-rs backed implementation built from a master
//!   URL or a kubeconfig file
//! - A token-bucket rate limiter shared by all clones of a session

mod client;
mod rate_limit;


pub use client::ClusterSession;
pub use rate_limit::RateLimiter;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;

use crate::error::Result;

/// Read access to pods in a cluster
#[async_trait]
pub trait PodSource: Send + Sync {
    /// Fetch a single pod by namespace and name
    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod>;

    /// List pods in one namespace, or across all namespaces when `None`
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>>;
}
