//! Integration tests for a relocation driven end to end
//!
//! An in-memory pod store stands in for the cluster: the "scheduler" binds
//! each submitted descriptor to a node and marks it running.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodStatus, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use relocator_lib::{
    check_pod_move_health, clone_pod, gen_new_pod_name, resize_container, resolve_owner,
    set_labels, strip_identity, ClonePolicy, ControllerRef, HealthFailure, MigrationTarget,
    PatchOutcome, PodSource, RelocatorError, Result,
};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct InMemoryCluster {
    pods: Mutex<Vec<Pod>>,
}

impl InMemoryCluster {
    fn insert(&self, pod: Pod) {
        self.pods.lock().unwrap().push(pod);
    }

    /// Accept a creatable descriptor and place it on `node`
    fn schedule(&self, mut pod: Pod, node: &str, phase: &str) {
        assert!(pod.metadata.resource_version.is_none(), "server fields must be cleared");
        assert!(pod.status.is_none(), "status must not be submitted");

        let spec = pod.spec.get_or_insert_with(PodSpec::default);
        assert!(spec.node_name.is_none(), "descriptor must not be bound");
        spec.node_name = Some(node.to_string());

        pod.metadata.resource_version = Some("1".to_string());
        pod.status = Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        });
        self.insert(pod);
    }
}

#[async_trait]
impl PodSource for InMemoryCluster {
    async fn fetch_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        self.pods
            .lock()
            .unwrap()
            .iter()
            .find(|p| {
                p.metadata.namespace.as_deref() == Some(namespace)
                    && p.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| RelocatorError::PodNotFound(format!("{}/{}", namespace, name)))
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>> {
        Ok(self
            .pods
            .lock()
            .unwrap()
            .iter()
            .filter(|p| namespace.map_or(true, |ns| p.metadata.namespace.as_deref() == Some(ns)))
            .cloned()
            .collect())
    }
}

fn running_pod(name: &str, node: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("shop".to_string()),
            uid: Some(format!("{}-uid", name)),
            resource_version: Some("90210".to_string()),
            generation: Some(1),
            labels: Some(BTreeMap::from([("app".to_string(), "cart".to_string())])),
            owner_references: Some(vec![OwnerReference {
                api_version: "apps/v1".to_string(),
                kind: "ReplicaSet".to_string(),
                name: "cart-7c9d".to_string(),
                uid: "rs-uid".to_string(),
                controller: Some(true),
                ..Default::default()
            }]),
            ..Default::default()
        },
        spec: Some(PodSpec {
            node_name: Some(node.to_string()),
            hostname: Some(name.to_string()),
            containers: vec![Container {
                name: "cart".to_string(),
                image: Some("shop/cart:2.4".to_string()),
                resources: Some(ResourceRequirements {
                    limits: Some(BTreeMap::from([(
                        "cpu".to_string(),
                        Quantity("500m".to_string()),
                    )])),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some("Running".to_string()),
            host_ip: Some("10.1.0.4".to_string()),
            ..Default::default()
        }),
    }
}

#[tokio::test]
async fn test_relocate_pod_to_new_node() {
    let cluster = InMemoryCluster::default();
    cluster.insert(running_pod("cart-0", "node-1"));

    let live = cluster.fetch_pod("shop", "cart-0").await.unwrap();
    assert_eq!(
        resolve_owner(&live).unwrap(),
        Some(ControllerRef::new("ReplicaSet", "cart-7c9d"))
    );

    let mut clone = clone_pod(&live, ClonePolicy::Conservative);
    let new_name = gen_new_pod_name("cart-0");
    clone.metadata.name = Some(new_name.clone());
    cluster.schedule(clone, "node-2", "Running");

    let target = MigrationTarget::new("shop", new_name.as_str(), "node-2");
    check_pod_move_health(&cluster, &target).await.unwrap();

    // the original is untouched and still on its node
    let original = cluster.fetch_pod("shop", "cart-0").await.unwrap();
    assert_eq!(original, live);
    assert_eq!(cluster.list_pods(Some("shop")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_relocation_landing_on_wrong_node_fails_health_check() {
    let cluster = InMemoryCluster::default();
    let live = running_pod("cart-0", "node-1");

    let mut clone = clone_pod(&live, ClonePolicy::Selective);
    clone.metadata.name = Some(gen_new_pod_name("cart-0"));
    cluster.schedule(clone, "node-3", "Running");

    let target = MigrationTarget::new("shop", "cart-0-1", "node-2");
    let err = check_pod_move_health(&cluster, &target).await.unwrap_err();
    assert!(matches!(
        err,
        RelocatorError::MigrationHealth {
            reason: HealthFailure::WrongNode { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_anonymized_duplicate_is_ungoverned() {
    let cluster = InMemoryCluster::default();
    let live = running_pod("cart-0", "node-1");

    let mut duplicate = strip_identity(&live);
    duplicate.metadata.name = Some(gen_new_pod_name("cart-0"));
    assert_eq!(resolve_owner(&duplicate).unwrap(), None);

    set_labels(
        &mut duplicate,
        BTreeMap::from([("debug-copy".to_string(), "true".to_string())]),
    );
    cluster.schedule(duplicate, "node-4", "Pending");

    let target = MigrationTarget::new("shop", "cart-0-1", "node-4");
    let err = check_pod_move_health(&cluster, &target).await.unwrap_err();
    assert!(err.to_string().contains("Pending"));

    let stored = cluster.fetch_pod("shop", "cart-0-1").await.unwrap();
    let labels = stored.metadata.labels.unwrap();
    assert_eq!(labels.len(), 1);
    assert!(labels.contains_key("debug-copy"));
}

#[tokio::test]
async fn test_resize_fetched_pod() {
    let cluster = InMemoryCluster::default();
    cluster.insert(running_pod("cart-0", "node-1"));

    let mut pod = cluster.fetch_pod("shop", "cart-0").await.unwrap();
    assert_eq!(resize_container(&mut pod, 500, 0, 0).unwrap(), PatchOutcome::Unchanged);
    assert_eq!(resize_container(&mut pod, 750, 256, 0).unwrap(), PatchOutcome::Changed);
    assert_eq!(resize_container(&mut pod, 750, 256, 0).unwrap(), PatchOutcome::Unchanged);

    let err = resize_container(&mut pod, 750, 256, 1).unwrap_err();
    assert!(err.is_validation());
}
