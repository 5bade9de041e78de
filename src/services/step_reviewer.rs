use crate::clients::{ChatMessage, LlmClient};
use crate::error::ReviewResult;
use crate::models::Cell;
use crate::services::{ReviewOptions, TaskReviewer};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 逐题评审
///
/// 单元格按（问题，回答）两两配对依次发送，对话历史在各对之间累积；
/// 末尾落单的单元格不参与评审
///
/// 当前这一对只作为用户消息发送一次，不会同时出现在 `context` 中
pub struct StepByStepTaskReviewer {
    client: Arc<dyn LlmClient>,
    options: ReviewOptions,
}

impl StepByStepTaskReviewer {
    pub fn new(client: Arc<dyn LlmClient>, options: ReviewOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl TaskReviewer for StepByStepTaskReviewer {
    async fn review(
        &self,
        cells: &[Cell],
        max_score: Option<u32>,
        prompt: Option<&str>,
    ) -> ReviewResult<String> {
        let max_score = self.options.max_score(max_score);
        let prompt = self.options.prompt(prompt, max_score);

        let mut context: Vec<ChatMessage> = Vec::new();
        let mut output = String::new();

        for (i, pair) in cells.chunks_exact(2).enumerate() {
            let (question, answer) = (&pair[0], &pair[1]);
            let merged_cell = format!("{} \n {}", question.text, answer.text);

            debug!("逐题评审 ({}): 第 {} 对", self.client.name(), i + 1);
            let response = self.client.call(&prompt, &merged_cell, &context).await?;

            context.push(ChatMessage::user(merged_cell));
            context.push(ChatMessage::assistant(response.as_str()));

            output.push_str(&format!("\nВердикт по вопросу {}:\n{}\n", i + 1, response));
        }

        Ok(output)
    }
}
