use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};

/// Today's date from the injected clock.
#[derive(Debug)]
pub struct CurrentDate;

#[async_trait]
impl Tool for CurrentDate {
    fn name(&self) -> &'static str {
        "get_current_date"
    }

    fn description(&self) -> &'static str {
        "get_current_date(): today's date. Call this first whenever the question uses relative time such as \"last meeting\", \"this year\" or \"recently\"."
    }

    async fn run(&self, ctx: &ToolContext, _args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let today = ctx.clock.today();
        Ok(ToolOutput::CurrentDate {
            date: today,
            weekday: today.format("%A").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{fixture_context, today};

    #[tokio::test]
    async fn test_reports_clock_date() {
        let output = CurrentDate
            .call(&fixture_context(true), &Map::new())
            .await;
        assert_eq!(
            output,
            ToolOutput::CurrentDate {
                date: today(),
                weekday: "Monday".to_string(),
            }
        );
    }
}
