//! Tool-calling agent.
//!
//! The registry holds the tools available in one run; the session drives the
//! conversation with the model, executing requested tools in order and
//! feeding their results back until the model answers.

mod registry;
mod session;

pub use registry::{unknown_tool_message, Tool, ToolRegistry};
pub use session::{
    apply_limit, Session, SessionConfig, SessionObserver, SessionOutcome, SessionState,
    ToolCallRecord,
};
