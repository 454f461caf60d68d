//! Ask command handler.
//!
//! Runs the research loop and renders its event stream.

use super::context::tool_context;
use anyhow::Context;
use clap::Args;
use council_agent::{Agent, AgentEvent, Question, SourceRecord};
use council_core::config::AppConfig;
use council_llm::create_client;
use futures::StreamExt;
use std::io::Write;

/// Ask a question about council records
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// The question asked just before this one, for follow-ups
    #[arg(long)]
    pub previous: Option<String>,

    /// Maximum reasoning steps before answering
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Print every event as one JSON object per line
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, mut config: AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if let Some(max_steps) = self.max_steps {
            config.agent.max_steps = max_steps;
        }
        config.validate()?;

        let endpoint = config
            .get_provider_config(&config.provider)
            .and_then(|pc| pc.endpoint().map(str::to_string));
        let api_key = config.resolve_api_key(&config.provider);
        let llm = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
            .map_err(anyhow::Error::msg)
            .context("Failed to create reasoning client")?;

        let context = tool_context(&config).await?;
        let agent = Agent::new(llm, config.model.clone(), context, config.agent.clone())?
            .with_workspace_prompts(&config.workspace)?;

        let mut question = Question::new(self.question.clone());
        if let Some(previous) = &self.previous {
            question = question.with_previous(previous.clone());
        }

        let mut stream = agent.ask(question);
        let mut sources: Vec<SourceRecord> = Vec::new();
        let mut stdout = std::io::stdout();

        while let Some(event) = stream.next().await {
            let event = event?;

            if self.json {
                writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
                continue;
            }

            match event {
                AgentEvent::Thought { content } => eprintln!("• {}", content),
                AgentEvent::ToolCall { tool, args } => eprintln!("  → {} {}", tool, args),
                AgentEvent::ToolObservation { summary, .. } => eprintln!("  ← {}", summary),
                AgentEvent::Sources { sources: found } => sources = found,
                AgentEvent::FinalAnswerChunk { content } => {
                    write!(stdout, "{}", content)?;
                    stdout.flush().ok();
                }
                AgentEvent::Done => {
                    writeln!(stdout)?;
                    print_sources(&mut stdout, &sources)?;
                }
            }
        }

        Ok(())
    }
}

fn print_sources(out: &mut impl Write, sources: &[SourceRecord]) -> std::io::Result<()> {
    if sources.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nSources:")?;
    for (i, source) in sources.iter().enumerate() {
        writeln!(out, "{}", source.citation_line(i + 1))?;
    }
    Ok(())
}
