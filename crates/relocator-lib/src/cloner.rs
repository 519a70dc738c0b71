//! Pod descriptor cloning
//!
//! Builds a creatable copy of a running pod. The copy never carries
//! server-assigned identity, runtime status or a node binding, so the
//! scheduler is free to place it anywhere.

use k8s_openapi::api::core::v1::{Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::RelocatorError;

/// Suffix appended to the name of a duplicated pod
const DUPLICATE_NAME_SUFFIX: &str = "-1";

/// Which object-metadata fields survive into the clone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClonePolicy {
    /// Copy all metadata, then clear every server-assigned field
    #[default]
    Conservative,
    /// Copy only an allow-list of metadata fields
    Selective,
}

impl fmt::Display for ClonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClonePolicy::Conservative => write!(f, "conservative"),
            ClonePolicy::Selective => write!(f, "selective"),
        }
    }
}

impl FromStr for ClonePolicy {
    type Err = RelocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(ClonePolicy::Conservative),
            "selective" => Ok(ClonePolicy::Selective),
            other => Err(RelocatorError::Validation(format!(
                "unknown clone policy '{}', expected conservative or selective",
                other
            ))),
        }
    }
}

/// Build a creatable descriptor from `source` under the given policy
///
/// The source is not modified. Status is never copied.
pub fn clone_pod(source: &Pod, policy: ClonePolicy) -> Pod {
    let metadata = match policy {
        ClonePolicy::Conservative => conservative_metadata(&source.metadata),
        ClonePolicy::Selective => selective_metadata(&source.metadata),
    };

    tracing::debug!(
        pod = source.metadata.name.as_deref().unwrap_or_default(),
        policy = %policy,
        "Cloned pod descriptor"
    );

    Pod {
        metadata,
        spec: source.spec.as_ref().map(unbound_spec),
        status: None,
    }
}

/// Conservative clone with labels and owner references emptied
///
/// Used when the duplicate must inherit neither the identity nor the
/// governance of its origin.
pub fn strip_identity(source: &Pod) -> Pod {
    let mut pod = clone_pod(source, ClonePolicy::Conservative);
    pod.metadata.labels = Some(BTreeMap::new());
    pod.metadata.owner_references = Some(Vec::new());
    pod
}

/// Derive a human-readable name for a duplicate pod
///
/// Not collision resistant: the same input always yields the same name.
pub fn gen_new_pod_name(name: &str) -> String {
    format!("{}{}", name, DUPLICATE_NAME_SUFFIX)
}

/// Replace the pod's labels wholesale
pub fn set_labels(pod: &mut Pod, labels: BTreeMap<String, String>) {
    pod.metadata.labels = Some(labels);
}

fn conservative_metadata(source: &ObjectMeta) -> ObjectMeta {
    let mut metadata = source.clone();
    metadata.self_link = None;
    metadata.resource_version = None;
    metadata.generation = None;
    metadata.creation_timestamp = None;
    metadata.deletion_timestamp = None;
    metadata.deletion_grace_period_seconds = None;
    metadata
}

// The v1.28 API no longer defines initializers or clusterName, so the
// allow-list stops at finalizers.
fn selective_metadata(source: &ObjectMeta) -> ObjectMeta {
    ObjectMeta {
        name: source.name.clone(),
        generate_name: source.generate_name.clone(),
        namespace: source.namespace.clone(),
        uid: source.uid.clone(),
        labels: source.labels.clone(),
        annotations: source.annotations.clone(),
        owner_references: source.owner_references.clone(),
        finalizers: source.finalizers.clone(),
        ..ObjectMeta::default()
    }
}

fn unbound_spec(source: &PodSpec) -> PodSpec {
    PodSpec {
        hostname: None,
        subdomain: None,
        node_name: None,
        ..source.clone()
    }
}
