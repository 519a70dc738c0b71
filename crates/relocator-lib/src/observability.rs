//! Structured logging for relocation activity
//!
//! The core functions return errors instead of logging them. Callers that
//! want an audit trail hand results to `StructuredLogger`, which emits one
//! `tracing` event per operation with consistent field names.

use tracing::{info, warn};

use crate::cloner::ClonePolicy;
use crate::error::RelocatorError;
use crate::models::{ControllerRef, MigrationTarget, PatchOutcome};
use crate::resources::ResourceList;

/// Structured logger for relocation events
#[derive(Clone)]
pub struct StructuredLogger {
    actor: String,
}

impl StructuredLogger {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    /// Log a descriptor clone
    pub fn log_clone(&self, namespace: &str, pod_name: &str, new_name: &str, policy: ClonePolicy) {
        info!(
            event = "pod_cloned",
            actor = %self.actor,
            namespace = %namespace,
            pod_name = %pod_name,
            new_name = %new_name,
            policy = %policy,
            "Built creatable pod descriptor"
        );
    }

    /// Log the outcome of owner resolution
    pub fn log_owner(&self, namespace: &str, pod_name: &str, owner: Option<&ControllerRef>) {
        match owner {
            Some(owner) => info!(
                event = "owner_resolved",
                actor = %self.actor,
                namespace = %namespace,
                pod_name = %pod_name,
                owner_kind = %owner.kind,
                owner_name = %owner.name,
                "Resolved pod controller"
            ),
            None => info!(
                event = "owner_resolved",
                actor = %self.actor,
                namespace = %namespace,
                pod_name = %pod_name,
                "Pod has no controller"
            ),
        }
    }

    /// Log a relocation health check
    pub fn log_health_check(&self, target: &MigrationTarget, result: &Result<(), RelocatorError>) {
        match result {
            Ok(()) => info!(
                event = "migration_health",
                actor = %self.actor,
                pod = %target.id(),
                node = %target.node_name,
                healthy = true,
                "Pod is running on target node"
            ),
            Err(e) => warn!(
                event = "migration_health",
                actor = %self.actor,
                pod = %target.id(),
                node = %target.node_name,
                healthy = false,
                error = %e,
                "Pod failed migration health check"
            ),
        }
    }

    /// Log a container limit patch
    pub fn log_resize(
        &self,
        namespace: &str,
        pod_name: &str,
        container_index: usize,
        patch: &ResourceList,
        outcome: PatchOutcome,
    ) {
        let cpu = patch.get("cpu").map(|q| q.0.as_str()).unwrap_or("-");
        let memory = patch.get("memory").map(|q| q.0.as_str()).unwrap_or("-");

        info!(
            event = "container_resized",
            actor = %self.actor,
            namespace = %namespace,
            pod_name = %pod_name,
            container_index = container_index,
            cpu_limit = %cpu,
            memory_limit = %memory,
            changed = outcome.is_changed(),
            "Computed container limit patch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("relocator-cli");
        assert_eq!(logger.actor, "relocator-cli");
    }

    #[test]
    fn test_logging_without_subscriber_is_inert() {
        let logger = StructuredLogger::new("test");
        let target = MigrationTarget::new("prod", "web", "node-7");
        logger.log_health_check(&target, &Ok(()));
        logger.log_owner("prod", "web", None);
        logger.log_resize("prod", "web", 0, &ResourceList::new(), PatchOutcome::Unchanged);
    }
}
