//! Controller resolution for pods
//!
//! Owner references are authoritative. Clusters that predate them recorded
//! the parent only in the `kubernetes.io/created-by` annotation, so that is
//! consulted when no controller reference exists.

use k8s_openapi::api::core::v1::{ObjectReference, Pod};
use serde::Deserialize;
use tracing::debug;

use crate::error::{RelocatorError, Result};
use crate::models::ControllerRef;

/// Legacy annotation holding a JSON-serialized parent reference
pub const CREATED_BY_ANNOTATION: &str = "kubernetes.io/created-by";

#[derive(Debug, Default, Deserialize)]
struct SerializedReference {
    #[serde(default)]
    reference: ObjectReference,
}

/// Resolve the controlling workload of a pod
///
/// Returns `Ok(None)` when the pod has neither a controller owner reference
/// nor the legacy annotation. A present but malformed annotation is an error.
pub fn resolve_owner(pod: &Pod) -> Result<Option<ControllerRef>> {
    let metadata = &pod.metadata;

    // a reference without the controller flag is not the controller
    let controller = metadata
        .owner_references
        .iter()
        .flatten()
        .find(|owner| owner.controller.unwrap_or(false));
    if let Some(owner) = controller {
        return Ok(Some(ControllerRef::new(&owner.kind, &owner.name)));
    }

    debug!(
        namespace = metadata.namespace.as_deref().unwrap_or_default(),
        pod = metadata.name.as_deref().unwrap_or_default(),
        "Cannot find pod parent by owner references"
    );

    let Some(raw) = metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(CREATED_BY_ANNOTATION))
    else {
        debug!(
            namespace = metadata.namespace.as_deref().unwrap_or_default(),
            pod = metadata.name.as_deref().unwrap_or_default(),
            "Cannot find pod parent by annotations"
        );
        return Ok(None);
    };

    let parsed: SerializedReference =
        serde_json::from_str(raw).map_err(|source| RelocatorError::Decode {
            raw: raw.clone(),
            source,
        })?;

    Ok(Some(ControllerRef::new(
        parsed.reference.kind.unwrap_or_default(),
        parsed.reference.name.unwrap_or_default(),
    )))
}
