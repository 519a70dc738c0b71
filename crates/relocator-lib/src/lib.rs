//! Library for relocating and resizing running pods
//!
//! This crate provides the core functionality for:
//! - Cloning a live pod into a creatable, unbound descriptor
//! - Resolving the controller that owns a pod
//! - Verifying that a relocated pod is running on its target node
//! - Patching container resource limits idempotently
//! - Cluster session bootstrap with client-side rate limiting

pub mod cloner;
pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod owner;
pub mod quantity;
pub mod resources;
pub mod session;

pub use cloner::{clone_pod, gen_new_pod_name, set_labels, strip_identity, ClonePolicy};
pub use crate::config::SessionConfig;
pub use error::{HealthFailure, RelocatorError, Result};
pub use health::{check_pod_move_health, evaluate_placement};
pub use models::*;
pub use observability::StructuredLogger;
pub use owner::{resolve_owner, CREATED_BY_ANNOTATION};
pub use resources::{parse_input_limit, resize_container, update_limit, ResourceList};
pub use session::{ClusterSession, PodSource, RateLimiter};
