use crate::clients::LlmClient;
use crate::error::ReviewResult;
use crate::models::Cell;
use crate::parser::{merge_task_text, TASK_SEPARATOR};
use crate::services::{ReviewOptions, TaskReviewer};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 整体评审：把整个任务拼成一段文本，一次调用
pub struct FullTaskReviewer {
    client: Arc<dyn LlmClient>,
    options: ReviewOptions,
}

impl FullTaskReviewer {
    pub fn new(client: Arc<dyn LlmClient>, options: ReviewOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl TaskReviewer for FullTaskReviewer {
    async fn review(
        &self,
        cells: &[Cell],
        max_score: Option<u32>,
        prompt: Option<&str>,
    ) -> ReviewResult<String> {
        let max_score = self.options.max_score(max_score);
        let prompt = self.options.prompt(prompt, max_score);

        let solved_task = merge_task_text(cells, TASK_SEPARATOR);
        debug!(
            "整体评审 ({}): {} 个单元格, 满分 {}",
            self.client.name(),
            cells.len(),
            max_score
        );

        self.client.call(&prompt, &solved_task, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompts;
    use crate::services::testing::ScriptedClient;

    #[tokio::test]
    async fn test_single_call_with_merged_text() {
        let client = Arc::new(ScriptedClient::new("primary", &["Оценка: 8"]));
        let reviewer = FullTaskReviewer::new(client.clone(), ReviewOptions::default());

        let cells = vec![Cell::markdown("условие"), Cell::code("x = 1")];
        let verdict = reviewer.review(&cells, Some(8), None).await.unwrap();

        assert_eq!(verdict, "Оценка: 8");
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user_message, "условие\n\n\nx = 1");
        assert_eq!(calls[0].prompt, prompts::advanced_prompt(8));
        assert!(calls[0].context.is_empty());
    }

    #[tokio::test]
    async fn test_default_score_is_ten() {
        let client = Arc::new(ScriptedClient::new("primary", &[]));
        let reviewer = FullTaskReviewer::new(client.clone(), ReviewOptions::default());

        reviewer.review(&[Cell::code("x")], None, None).await.unwrap();

        assert_eq!(client.calls()[0].prompt, prompts::advanced_prompt(10));
    }
}
