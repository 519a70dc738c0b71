//! Post-relocation health checks
//!
//! A relocation is healthy once the pod is `Running` on the node it was
//! moved to. The check is a single observation; polling and backoff are
//! left to the caller.

use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

use crate::error::{HealthFailure, RelocatorError, Result};
use crate::models::MigrationTarget;
use crate::session::PodSource;

/// Pod phase that counts as healthy
pub const RUNNING_PHASE: &str = "Running";

/// Phase reported when the pod has no status yet
const UNKNOWN_PHASE: &str = "Unknown";

/// Check an already fetched pod against the expected node
pub fn evaluate_placement(pod: &Pod, expected_node: &str) -> std::result::Result<(), HealthFailure> {
    let phase = pod
        .status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .unwrap_or(UNKNOWN_PHASE);
    if phase != RUNNING_PHASE {
        return Err(HealthFailure::NotRunning {
            phase: phase.to_string(),
        });
    }

    let node = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.node_name.as_deref())
        .unwrap_or_default();
    if node != expected_node {
        return Err(HealthFailure::WrongNode {
            actual: node.to_string(),
            expected: expected_node.to_string(),
        });
    }

    Ok(())
}

/// Fetch the pod and verify it is running on the target node
pub async fn check_pod_move_health<S>(source: &S, target: &MigrationTarget) -> Result<()>
where
    S: PodSource + ?Sized,
{
    let id = target.id();
    let health_error = |reason| RelocatorError::MigrationHealth {
        pod: id.clone(),
        reason,
    };

    let pod = source
        .fetch_pod(&target.namespace, &target.pod_name)
        .await
        .map_err(|e| health_error(HealthFailure::Fetch(Box::new(e))))?;

    evaluate_placement(&pod, &target.node_name).map_err(health_error)?;

    debug!(pod = %id, node = %target.node_name, "Pod is running on expected node");
    Ok(())
}
