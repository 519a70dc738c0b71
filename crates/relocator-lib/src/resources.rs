//! Container resource limit patching
//!
//! A resize request arrives as a CPU limit in millicores and a memory limit
//! in mebibytes. It is first normalized into a sparse resource list, then
//! overlaid onto one container's current limits. Applying the same patch
//! twice leaves the container unchanged the second time.

use k8s_openapi::api::core::v1::{Pod, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{RelocatorError, Result};
use crate::models::PatchOutcome;
use crate::quantity::{cpu_millis, memory_mebibytes, same_quantity};

/// Resource name to quantity, as in a container's limits
pub type ResourceList = BTreeMap<String, Quantity>;

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_MEMORY: &str = "memory";

/// Build a patch from raw limits; values `<= 0` are left out
///
/// At least one of the two limits must be set.
pub fn parse_input_limit(cpu_limit: i64, mem_limit: i64) -> Result<ResourceList> {
    if cpu_limit <= 0 && mem_limit <= 0 {
        return Err(RelocatorError::Validation(format!(
            "cpuLimit=[{}], memLimit=[{}]: at least one limit must be positive",
            cpu_limit, mem_limit
        )));
    }

    let mut result = ResourceList::new();
    if cpu_limit > 0 {
        result.insert(RESOURCE_CPU.to_string(), cpu_millis(cpu_limit));
    }
    if mem_limit > 0 {
        result.insert(RESOURCE_MEMORY.to_string(), memory_mebibytes(mem_limit));
    }

    debug!(?result, "Parsed input limits");
    Ok(result)
}

/// Overlay `patch` onto the limits of `pod.spec.containers[index]`
///
/// Keys missing from the patch keep their current value. When every patched
/// value already matches, the container is not touched.
pub fn update_limit(pod: &mut Pod, patch: &ResourceList, index: usize) -> Result<PatchOutcome> {
    let pod_name = pod.metadata.name.clone().unwrap_or_default();
    let container = pod
        .spec
        .as_mut()
        .and_then(|spec| spec.containers.get_mut(index))
        .ok_or_else(|| RelocatorError::ContainerNotFound {
            index,
            pod: pod_name.clone(),
        })?;

    let current = container
        .resources
        .as_ref()
        .and_then(|resources| resources.limits.as_ref());
    let mut result: ResourceList = current.cloned().unwrap_or_default();
    let mut changed = false;

    for (name, value) in patch {
        let differs = result
            .get(name)
            .map_or(true, |old| !same_quantity(old, value));
        if differs {
            debug!(pod = %pod_name, resource = %name, value = %value.0, "Updating container limit");
            result.insert(name.clone(), value.clone());
            changed = true;
        }
    }

    if !changed {
        debug!(pod = %pod_name, "Nothing changed in container limits");
        return Ok(PatchOutcome::Unchanged);
    }

    container
        .resources
        .get_or_insert_with(ResourceRequirements::default)
        .limits = Some(result);
    Ok(PatchOutcome::Changed)
}

/// Normalize raw limits and apply them to one container
pub fn resize_container(
    pod: &mut Pod,
    cpu_limit: i64,
    mem_limit: i64,
    index: usize,
) -> Result<PatchOutcome> {
    let patch = parse_input_limit(cpu_limit, mem_limit)?;
    update_limit(pod, &patch, index)
}
