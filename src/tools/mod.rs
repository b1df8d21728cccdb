//! Tools module - capabilities exposed to the agents
//!
//! Calculator and Wikipedia tools serve the sub-agents; the delegation and
//! profile tools serve the orchestrator.

pub mod calculator;
pub mod delegate;
pub mod profile;
pub mod registry;
pub mod wiki;

pub use registry::{ToolContext, ToolHandler, ToolRegistry, ToolScope, ToolSpec};
