//! Agent module - orchestration and conversation management
//!
//! Contains the agentic loop shared by the orchestrator and the two
//! specialist sub-agents, plus the conversation and session memory it runs on.

pub mod conversation;
pub mod loop_state;
pub mod memory;
pub mod orchestrator;
pub mod runner;
pub mod sub_agent;

pub use conversation::Conversation;
pub use loop_state::{AgentLoopState, LoopState};
pub use memory::SessionMemory;
pub use orchestrator::{orchestrator_prompt, Orchestrator};
pub use runner::{AgenticLoop, LoopOutcome, EMPTY_RESPONSE_FALLBACK};
pub use sub_agent::{SubAgent, SubAgentBuilder, SubAgentKind};
