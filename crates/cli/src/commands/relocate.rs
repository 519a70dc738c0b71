//! Relocation-related CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use relocator_lib::{
    check_pod_move_health, gen_new_pod_name, resolve_owner, strip_identity, ClonePolicy,
    MigrationTarget, PodSource, StructuredLogger,
};
use serde::Serialize;

use crate::output::{print_error, print_info, print_json, print_success, OutputFormat};

/// How the clone command builds its copy
#[derive(Debug, Clone, Copy)]
pub struct CloneOptions {
    pub policy: ClonePolicy,
    pub anonymize: bool,
    pub rename: bool,
}

#[derive(Serialize)]
struct OwnerOutput<'a> {
    namespace: &'a str,
    pod: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize)]
struct VerifyOutput {
    pod: String,
    node: String,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Print a creatable copy of a pod as JSON
///
/// Output is always JSON, ready to pipe into
/// `kubectl create -f -`.
pub async fn clone_pod<S: PodSource>(
    source: &S,
    logger: &StructuredLogger,
    namespace: &str,
    pod_name: &str,
    options: CloneOptions,
) -> Result<()> {
    let live = source.fetch_pod(namespace, pod_name).await?;

    let (mut copy, policy) = if options.anonymize {
        (strip_identity(&live), ClonePolicy::Conservative)
    } else {
        (relocator_lib::clone_pod(&live, options.policy), options.policy)
    };
    if options.rename {
        copy.metadata.name = Some(gen_new_pod_name(pod_name));
    }

    let new_name = copy.metadata.name.clone().unwrap_or_default();
    logger.log_clone(namespace, pod_name, &new_name, policy);

    print_json(&copy).context("Failed to serialize pod descriptor")
}

/// Show the controller that owns a pod
pub async fn show_owner<S: PodSource>(
    source: &S,
    logger: &StructuredLogger,
    namespace: &str,
    pod_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let pod = source.fetch_pod(namespace, pod_name).await?;
    let owner = resolve_owner(&pod)?;
    logger.log_owner(namespace, pod_name, owner.as_ref());

    match format {
        OutputFormat::Json => print_json(&OwnerOutput {
            namespace,
            pod: pod_name,
            kind: owner.as_ref().map(|o| o.kind.clone()),
            name: owner.as_ref().map(|o| o.name.clone()),
        })?,
        OutputFormat::Table => match owner {
            Some(owner) => {
                println!("{}", "Pod Owner".bold());
                println!("{}", "=".repeat(40));
                println!("Pod:   {}/{}", namespace, pod_name.cyan());
                println!("Kind:  {}", owner.kind.cyan());
                println!("Name:  {}", owner.name.cyan());
            }
            None => print_info(&format!("Pod {}/{} has no controller", namespace, pod_name)),
        },
    }

    Ok(())
}

/// Verify a relocated pod; fails the command when the check fails
pub async fn verify_move<S: PodSource>(
    source: &S,
    logger: &StructuredLogger,
    namespace: &str,
    pod_name: &str,
    node: &str,
    format: OutputFormat,
) -> Result<()> {
    let target = MigrationTarget::new(namespace, pod_name, node);
    let result = check_pod_move_health(source, &target).await;
    logger.log_health_check(&target, &result);

    match format {
        OutputFormat::Json => print_json(&VerifyOutput {
            pod: target.id(),
            node: target.node_name.clone(),
            healthy: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        })?,
        OutputFormat::Table => match &result {
            Ok(()) => print_success(&format!("Pod {} is running on {}", target.id(), node)),
            Err(e) => print_error(&e.to_string()),
        },
    }

    result.map_err(Into::into)
}
