//! Tools the reasoning model can call.
//!
//! A tool never fails past its own boundary: [`Tool::call`] turns any
//! internal error into a [`ToolOutput::Message`] so one bad lookup cannot
//! abort the loop.

pub mod agenda;
pub mod args;
pub mod date;
pub mod matters;
pub mod meetings;
pub mod motions;
pub mod output;
pub mod records;
pub mod segments;
pub mod statements;
pub mod votes;

pub use output::ToolOutput;

use async_trait::async_trait;
use chrono::NaiveDate;
use council_core::{AppResult, Clock, RetrievalSettings};
use council_retrieval::{
    CouncilStore, EmbeddingGateway, HybridSearcher, MeetingDateCache, Person,
};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::warn;

/// Everything a tool may touch.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub store: Arc<dyn CouncilStore>,
    pub gateway: EmbeddingGateway,
    pub searcher: HybridSearcher,
    pub clock: Arc<dyn Clock>,
    pub settings: RetrievalSettings,
}

impl ToolContext {
    pub fn new(
        store: Arc<dyn CouncilStore>,
        gateway: EmbeddingGateway,
        clock: Arc<dyn Clock>,
        settings: RetrievalSettings,
    ) -> Self {
        let cache = Arc::new(MeetingDateCache::from_settings(clock.clone(), &settings));
        let searcher = HybridSearcher::new(store.clone(), gateway.clone(), cache, settings.clone());

        Self {
            store,
            gateway,
            searcher,
            clock,
            settings,
        }
    }

    /// Resolve a person by exact id, then by partial name.
    pub async fn resolve_person(&self, name_or_id: &str) -> AppResult<Option<Person>> {
        if let Some(person) = self.store.get_person(name_or_id).await? {
            return Ok(Some(person));
        }
        Ok(self.store.find_people(name_or_id).await?.into_iter().next())
    }

    /// Dates for the given meeting ids in one lookup.
    pub async fn meeting_dates<'a, I>(&self, meeting_ids: I) -> AppResult<HashMap<String, NaiveDate>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: Vec<String> = meeting_ids
            .into_iter()
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(self
            .store
            .meetings_by_ids(&ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m.meeting_date))
            .collect())
    }
}

/// A named adapter over retrieval or a direct lookup.
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Signature and behaviour, written for the reasoning model.
    fn description(&self) -> &'static str;

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput>;

    /// Run the tool, degrading any failure to a descriptive message.
    async fn call(&self, ctx: &ToolContext, args: &Map<String, Value>) -> ToolOutput {
        match self.run(ctx, args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = self.name(), "Tool failed: {}", e);
                ToolOutput::message(format!("{} failed: {}", self.name(), e))
            }
        }
    }
}

/// Tools by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in tool.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(date::CurrentDate));
        registry.register(Arc::new(meetings::ListRecentMeetings));
        registry.register(Arc::new(statements::StatementsByPerson));
        registry.register(Arc::new(votes::VotingHistoryTool));
        registry.register(Arc::new(motions::SearchMotions));
        registry.register(Arc::new(segments::SearchSegments));
        registry.register(Arc::new(matters::SearchMatters));
        registry.register(Arc::new(agenda::SearchAgendaItems));
        registry.register(Arc::new(records::SearchCouncilRecords));
        registry
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Bullet list for the step prompt.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}", t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
