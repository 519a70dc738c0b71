//! Core data models for pod relocation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controlling workload of a pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerRef {
    pub kind: String,
    pub name: String,
}

impl ControllerRef {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Pod expected to be running on a given node after relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    pub namespace: String,
    pub pod_name: String,
    pub node_name: String,
}

impl MigrationTarget {
    pub fn new(
        namespace: impl Into<String>,
        pod_name: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod_name: pod_name.into(),
            node_name: node_name.into(),
        }
    }

    /// Composite pod identifier, `namespace/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.pod_name)
    }
}

/// Result of applying a limit patch to a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOutcome {
    /// At least one limit was added or changed
    Changed,
    /// The container already carried every requested value
    Unchanged,
}

impl PatchOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, PatchOutcome::Changed)
    }
}
