//! Pod Relocator CLI
//!
//! A command-line tool for cloning, verifying and resizing pods
//! in a Kubernetes cluster.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{pods, relocate, resize};
use relocator_lib::{ClonePolicy, ClusterSession, StructuredLogger};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pod Relocator CLI
#[derive(Parser)]
#[command(name = "relocator")]
#[command(author, version, about = "CLI for Pod Relocator: clone, verify and resize running pods", long_about = None)]
pub struct Cli {
    /// Kubernetes API server URL (can also be set via RELOCATOR_MASTER_URL env var)
    #[arg(long, env = "RELOCATOR_MASTER_URL")]
    pub master: Option<String>,

    /// Path to kubeconfig file; takes precedence over --master
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Path to a config file (defaults to ~/.config/relocator/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List pods with their phase and node
    Pods {
        /// Filter by namespace (all namespaces if not specified)
        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Print a creatable, unbound copy of a pod
    Clone {
        /// Pod namespace
        namespace: String,

        /// Pod name
        pod: String,

        /// Metadata copy policy (conservative, selective)
        #[arg(long, default_value = "conservative")]
        policy: ClonePolicy,

        /// Drop labels and owner references from the copy (conservative only)
        #[arg(long, conflicts_with = "policy")]
        anonymize: bool,

        /// Give the copy a derived name
        #[arg(long)]
        rename: bool,
    },

    /// Show the controller that owns a pod
    Owner {
        /// Pod namespace
        namespace: String,

        /// Pod name
        pod: String,
    },

    /// Check that a relocated pod is running on the expected node
    Verify {
        /// Pod namespace
        namespace: String,

        /// Pod name
        pod: String,

        /// Node the pod should be running on
        node: String,
    },

    /// Compute new container limits for a pod
    Resize {
        /// Pod namespace
        namespace: String,

        /// Pod name
        pod: String,

        /// CPU limit in millicores (0 leaves it unchanged)
        #[arg(long, default_value_t = 0)]
        cpu: i64,

        /// Memory limit in MiB (0 leaves it unchanged)
        #[arg(long, default_value_t = 0)]
        memory: i64,

        /// Index of the container to resize
        #[arg(long, default_value_t = 0)]
        container: usize,
    },
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    // Resolve session settings: config file, then environment, then flags
    let session_config = config::session_config(
        cli.config.as_deref(),
        cli.master.as_deref(),
        cli.kubeconfig.as_deref(),
    )?;
    let session = ClusterSession::connect(&session_config)
        .await
        .context("Failed to connect to cluster")?;
    let logger = StructuredLogger::new("relocator-cli");

    // Execute command
    match cli.command {
        Commands::Pods { namespace } => {
            pods::list_pods(&session, namespace.as_deref(), cli.format).await?;
        }
        Commands::Clone {
            namespace,
            pod,
            policy,
            anonymize,
            rename,
        } => {
            let options = relocate::CloneOptions {
                policy,
                anonymize,
                rename,
            };
            relocate::clone_pod(&session, &logger, &namespace, &pod, options).await?;
        }
        Commands::Owner { namespace, pod } => {
            relocate::show_owner(&session, &logger, &namespace, &pod, cli.format).await?;
        }
        Commands::Verify {
            namespace,
            pod,
            node,
        } => {
            relocate::verify_move(&session, &logger, &namespace, &pod, &node, cli.format).await?;
        }
        Commands::Resize {
            namespace,
            pod,
            cpu,
            memory,
            container,
        } => {
            let request = resize::ResizeRequest {
                cpu_millicores: cpu,
                memory_mebibytes: memory,
                container,
            };
            resize::resize_pod(&session, &logger, &namespace, &pod, request, cli.format).await?;
        }
    }

    Ok(())
}
