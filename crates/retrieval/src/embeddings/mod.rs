//! Embedding Gateway and providers.
//!
//! Vector-dependent code never talks to a provider directly. It asks the
//! [`EmbeddingGateway`], which answers with a vector or `None` when the
//! embedding service is unavailable. That `None` is the single switch between
//! hybrid and keyword-only retrieval.

pub mod gateway;
pub mod provider;
pub mod providers;

pub use gateway::EmbeddingGateway;
pub use provider::{create_provider, EmbeddingProvider};
