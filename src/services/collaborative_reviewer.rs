use crate::clients::{ChatMessage, LlmClient};
use crate::error::{ReviewError, ReviewResult};
use crate::models::Cell;
use crate::parser::{merge_task_text, TASK_SEPARATOR};
use crate::services::prompts::aggregation_prompt;
use crate::services::{ReviewOptions, TaskReviewer};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// 默认评审轮数
pub const DEFAULT_ITERATIONS: usize = 2;

/// 协作评审
///
/// 主、副两个客户端轮流评审（偶数轮主客户端，奇数轮副客户端），
/// 每轮都能看到之前的全部结论和上一轮的反馈，最后由汇总客户端给出结论
pub struct CollaborativeTaskReviewer {
    primary_client: Arc<dyn LlmClient>,
    secondary_client: Arc<dyn LlmClient>,
    final_client: Arc<dyn LlmClient>,
    iterations: usize,
    options: ReviewOptions,
}

impl CollaborativeTaskReviewer {
    /// 汇总客户端默认为主客户端
    pub fn new(
        primary_client: Arc<dyn LlmClient>,
        secondary_client: Arc<dyn LlmClient>,
        options: ReviewOptions,
    ) -> Self {
        Self {
            final_client: primary_client.clone(),
            primary_client,
            secondary_client,
            iterations: DEFAULT_ITERATIONS,
            options,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_final_client(mut self, final_client: Arc<dyn LlmClient>) -> Self {
        self.final_client = final_client;
        self
    }

    fn client_for(&self, iteration: usize) -> &Arc<dyn LlmClient> {
        if iteration % 2 == 1 {
            &self.secondary_client
        } else {
            &self.primary_client
        }
    }
}

#[async_trait]
impl TaskReviewer for CollaborativeTaskReviewer {
    async fn review(
        &self,
        cells: &[Cell],
        max_score: Option<u32>,
        prompt: Option<&str>,
    ) -> ReviewResult<String> {
        if cells.is_empty() {
            return Err(ReviewError::NoCells);
        }

        let solved_task = merge_task_text(cells, TASK_SEPARATOR);
        let max_score = self.options.max_score(max_score);
        let prompt = self.options.prompt(prompt, max_score);

        let mut history: Vec<ChatMessage> = Vec::new();
        let mut last_feedback: Option<String> = None;

        for i in 0..self.iterations {
            let client = self.client_for(i);
            let entry = match &last_feedback {
                Some(feedback) => format!("Feedback: {feedback}\n\n{solved_task}"),
                None => solved_task.clone(),
            };

            let mut context = history.clone();
            context.push(ChatMessage::user(entry));

            debug!("协作评审第 {}/{} 轮 ({})", i + 1, self.iterations, client.name());
            let response = client.call(&prompt, &solved_task, &context).await?;

            history.push(ChatMessage::assistant(response.as_str()));
            last_feedback = Some(response);
        }

        info!(
            "🤝 协作评审完成 {} 轮，由 {} 汇总",
            self.iterations,
            self.final_client.name()
        );

        self.final_client
            .call(
                &aggregation_prompt(max_score, self.iterations),
                &solved_task,
                &history,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::ScriptedClient;

    #[tokio::test]
    async fn test_alternates_clients_and_aggregates() {
        let primary = Arc::new(ScriptedClient::new("primary", &["p1", "итог"]));
        let secondary = Arc::new(ScriptedClient::new("secondary", &["s1"]));
        let reviewer = CollaborativeTaskReviewer::new(
            primary.clone(),
            secondary.clone(),
            ReviewOptions::default(),
        );

        let cells = vec![Cell::code("x = 1")];
        let verdict = reviewer.review(&cells, Some(5), None).await.unwrap();

        assert_eq!(verdict, "итог");

        let primary_calls = primary.calls();
        let secondary_calls = secondary.calls();
        assert_eq!(primary_calls.len(), 2);
        assert_eq!(secondary_calls.len(), 1);

        assert_eq!(primary_calls[0].context, vec![ChatMessage::user("x = 1")]);
        assert_eq!(
            secondary_calls[0].context,
            vec![
                ChatMessage::assistant("p1"),
                ChatMessage::user("Feedback: p1\n\nx = 1"),
            ]
        );

        let aggregation = &primary_calls[1];
        assert_eq!(aggregation.prompt, aggregation_prompt(5, 2));
        assert_eq!(
            aggregation.context,
            vec![ChatMessage::assistant("p1"), ChatMessage::assistant("s1")]
        );
    }

    #[tokio::test]
    async fn test_final_client_override() {
        let primary = Arc::new(ScriptedClient::new("primary", &[]));
        let judge = Arc::new(ScriptedClient::new("judge", &["решение"]));
        let reviewer =
            CollaborativeTaskReviewer::new(primary.clone(), primary.clone(), ReviewOptions::default())
                .with_iterations(1)
                .with_final_client(judge.clone());

        let verdict = reviewer.review(&[Cell::code("y")], None, None).await.unwrap();

        assert_eq!(verdict, "решение");
        assert_eq!(primary.calls().len(), 1);
        assert_eq!(judge.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cells_rejected() {
        let primary = Arc::new(ScriptedClient::new("primary", &[]));
        let reviewer =
            CollaborativeTaskReviewer::new(primary.clone(), primary, ReviewOptions::default());

        let err = reviewer.review(&[], None, None).await.unwrap_err();
        assert!(matches!(err, ReviewError::NoCells));
    }
}
