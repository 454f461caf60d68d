use super::args::{optional_date, optional_usize};
use super::output::MeetingHit;
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 20;

/// Most recent meetings held on or before a date (today by default).
#[derive(Debug)]
pub struct ListRecentMeetings;

#[async_trait]
impl Tool for ListRecentMeetings {
    fn name(&self) -> &'static str {
        "list_recent_meetings"
    }

    fn description(&self) -> &'static str {
        "list_recent_meetings(limit?, before_date?): the most recent meetings held on or before before_date (default today), newest first, with date, title and type. Use it to find \"the last meeting\"."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let limit = optional_usize(args, "limit")
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        let before = optional_date(args, "before_date")?.unwrap_or_else(|| ctx.clock.today());

        let meetings = ctx
            .store
            .recent_meetings(Some(before), limit)
            .await?
            .into_iter()
            .map(|m| MeetingHit {
                meeting_id: m.id,
                title: m.title,
                meeting_date: m.meeting_date,
                meeting_type: m.meeting_type,
            })
            .collect();

        Ok(ToolOutput::Meetings { meetings })
    }
}
