//! Agentic question answering over municipal council records.
//!
//! An [`Agent`] alternates between asking a reasoning model what to do next
//! and running the tool it picks, then writes a cited answer from what the
//! tools returned. Progress is reported as an ordered [`AgentStream`]:
//!
//! ```text
//! thought / tool_call / tool_observation ...  sources  final_answer_chunk ...  done
//! ```
//!
//! # Example
//! ```no_run
//! use council_agent::{Agent, Question, ToolContext};
//! use council_core::{AgentSettings, RetrievalSettings, SystemClock};
//! use council_llm::OllamaClient;
//! use council_retrieval::{EmbeddingGateway, MemoryStore};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::from_path(Path::new("council.json"))?);
//! let context = ToolContext::new(
//!     store,
//!     EmbeddingGateway::disabled(),
//!     Arc::new(SystemClock),
//!     RetrievalSettings::default(),
//! );
//! let agent = Agent::new(
//!     Arc::new(OllamaClient::new()),
//!     "llama3.2",
//!     context,
//!     AgentSettings::default(),
//! )?;
//!
//! let answer = agent.answer(Question::new("What happened at the last meeting?")).await?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod evidence;
pub mod history;
pub mod orchestrator;
pub mod protocol;
pub mod synthesis;
pub mod tools;

#[cfg(test)]
mod tests;

pub use events::{collect_answer, AgentEvent, AgentStream, CollectedAnswer};
pub use evidence::{normalize, SourceRecord, SourceSet, SourceType};
pub use history::{History, TruncationLimits};
pub use orchestrator::{Agent, Question};
pub use protocol::{parse_step, Action, AgentStep, ProtocolError, ToolInvocation};
pub use tools::{Tool, ToolContext, ToolOutput, ToolRegistry};
