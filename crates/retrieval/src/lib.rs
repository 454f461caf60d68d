//! Council records retrieval.
//!
//! - Domain records and the [`CouncilStore`] query seam
//! - The [`EmbeddingGateway`] and embedding providers
//! - Reciprocal Rank Fusion and per-type hybrid search
//! - The cross-type [`HybridSearcher`] with its [`MeetingDateCache`]

pub mod cache;
pub mod embeddings;
pub mod search;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

#[cfg(test)]
mod tests;

pub use cache::MeetingDateCache;
pub use embeddings::{EmbeddingGateway, EmbeddingProvider};
pub use search::{HybridSearcher, ResultFilters, SearchResult};
pub use store::{CouncilStore, MemoryStore, SearchKind, SearchRecord};
pub use types::*;
