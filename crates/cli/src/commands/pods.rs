//! Pod listing for diagnostics

use anyhow::Result;
use k8s_openapi::api::core::v1::Pod;
use relocator_lib::PodSource;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_phase, format_age, print_json, print_warning, OutputFormat};

/// Row for pods table
#[derive(Tabled, Serialize)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Host IP")]
    host_ip: String,
    #[tabled(rename = "Age")]
    age: String,
}

fn pod_row(pod: &Pod, now: chrono::DateTime<chrono::Utc>) -> PodRow {
    let status = pod.status.as_ref();
    PodRow {
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        name: pod.metadata.name.clone().unwrap_or_default(),
        phase: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        node: pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default(),
        host_ip: status.and_then(|s| s.host_ip.clone()).unwrap_or_default(),
        age: format_age(pod.metadata.creation_timestamp.as_ref(), now),
    }
}

/// List pods in a namespace, or in all namespaces
pub async fn list_pods<S: PodSource>(
    source: &S,
    namespace: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let pods = source.list_pods(namespace).await?;
    let now = chrono::Utc::now();
    let rows: Vec<PodRow> = pods.iter().map(|pod| pod_row(pod, now)).collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            if rows.is_empty() {
                print_warning("No pods found");
                return Ok(());
            }

            let total = rows.len();
            let rows: Vec<PodRow> = rows
                .into_iter()
                .map(|row| PodRow {
                    phase: color_phase(&row.phase),
                    ..row
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nThere are {} pods in the cluster", total);
        }
    }

    Ok(())
}
