//! Application layer - Use case services.
//!
//! Each service is a thin orchestrator over the `ports` traits:
//! - `resolver`: descendant discovery from one snapshot
//! - `tree_killer`: best-effort forceful kill of a whole tree
//! - `negotiator`: console event plus cooperative shutdown request
//! - `group`: spawn-time process group setup

mod group;
mod negotiator;
mod resolver;
mod tree_killer;

pub use group::configure_process_group;
pub use negotiator::ShutdownNegotiator;
pub use resolver::{descendants_of, resolve_descendants};
pub use tree_killer::kill_tree;
