//! Agent roles and the runner that drives them
//!
//! Information Hiding:
//! - Roles are plain data; handoff targets stored as ids
//! - Tool-call loop hidden inside [`Runner`]
//! - Support and catalog role sets built by factory functions

pub mod builder;
pub mod catalog;
pub mod registry;
pub mod role;
pub mod runner;
pub mod support;

pub use builder::AgentBuilder;
pub use catalog::{Catalog, CatalogAgent};
pub use registry::AgentRegistry;
pub use role::{handoff_tool_name, AgentId, AgentRole};
pub use runner::{HandoffMode, RoleExit, RoleRun, Runner, ToolCallRecord};
