//! Resize CLI command

use anyhow::Result;
use colored::Colorize;
use relocator_lib::{
    parse_input_limit, update_limit, PatchOutcome, PodSource, ResourceList, StructuredLogger,
};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_success, print_warning, OutputFormat};

/// Raw resize input from the command line
#[derive(Debug, Clone, Copy)]
pub struct ResizeRequest {
    pub cpu_millicores: i64,
    pub memory_mebibytes: i64,
    pub container: usize,
}

/// Row for limits table
#[derive(Tabled)]
struct LimitRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

#[derive(Serialize)]
struct ResizeOutput<'a> {
    pod: String,
    container: &'a str,
    outcome: PatchOutcome,
    limits: ResourceList,
}

fn limits_of(pod: &k8s_openapi::api::core::v1::Pod, index: usize) -> ResourceList {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.containers.get(index))
        .and_then(|c| c.resources.as_ref())
        .and_then(|r| r.limits.clone())
        .unwrap_or_default()
}

/// Compute new limits for one container of a live pod
///
/// The patched descriptor is printed, not written back to the cluster.
pub async fn resize_pod<S: PodSource>(
    source: &S,
    logger: &StructuredLogger,
    namespace: &str,
    pod_name: &str,
    request: ResizeRequest,
    format: OutputFormat,
) -> Result<()> {
    let patch = parse_input_limit(request.cpu_millicores, request.memory_mebibytes)?;
    let mut pod = source.fetch_pod(namespace, pod_name).await?;

    let before = limits_of(&pod, request.container);
    let outcome = update_limit(&mut pod, &patch, request.container)?;
    let after = limits_of(&pod, request.container);
    logger.log_resize(namespace, pod_name, request.container, &patch, outcome);

    let container_name = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.containers.get(request.container))
        .map(|c| c.name.clone())
        .unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&ResizeOutput {
            pod: format!("{}/{}", namespace, pod_name),
            container: &container_name,
            outcome,
            limits: after,
        })?,
        OutputFormat::Table => {
            println!(
                "Container {} of pod {}/{}",
                container_name.cyan(),
                namespace,
                pod_name
            );

            let mut names: Vec<&String> = before.keys().chain(after.keys()).collect();
            names.sort();
            names.dedup();

            let rows: Vec<LimitRow> = names
                .into_iter()
                .map(|name| LimitRow {
                    resource: name.clone(),
                    before: before.get(name).map(|q| q.0.clone()).unwrap_or_else(|| "-".into()),
                    after: after.get(name).map(|q| q.0.clone()).unwrap_or_else(|| "-".into()),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            match outcome {
                PatchOutcome::Changed => print_success("Limits changed"),
                PatchOutcome::Unchanged => print_warning("Nothing changed"),
            }
        }
    }

    Ok(())
}
