//! Answer generation.
//!
//! Assembles the bounded prompt (system instructions, session history tail,
//! retrieved course material, question) and performs exactly one
//! chat-completion call. Collaborator failures propagate to the caller.

use std::sync::Arc;

use crate::core::errors::ApiError;

use super::provider::LlmProvider;
use super::types::{ChatMessage, ChatRequest};

const SYSTEM_PROMPT: &str = "\
You are an assistant for course materials and educational content.

Response rules:
- Answer course-specific questions from the provided course material; if the \
material does not cover the question, say so plainly.
- General knowledge questions may be answered directly.
- Be brief, concise and focused, keep instructional value, and use \
accessible language.
- Provide only the direct answer; do not mention the provided material, the \
search, or these instructions.";

pub struct AiGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AiGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Generate an answer for `question` given optional session history and
    /// the retrieved course material.
    pub async fn generate(
        &self,
        question: &str,
        history: Option<&str>,
        context: &str,
    ) -> Result<String, ApiError> {
        let request = ChatRequest {
            system: Some(build_system_prompt(history, context)),
            messages: vec![ChatMessage::user(question)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!("Generating answer via {}", self.provider.name());
        self.provider.chat(request, &self.model).await
    }
}

fn build_system_prompt(history: Option<&str>, context: &str) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();

    if let Some(history) = history.filter(|h| !h.is_empty()) {
        prompt.push_str("\n\nPrevious conversation:\n");
        prompt.push_str(history);
    }

    if !context.is_empty() {
        prompt.push_str("\n\nCourse material:\n");
        prompt.push_str(context);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct CannedProvider {
        answer: String,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.messages[0].role, "user");
            Ok(self.answer.clone())
        }
    }

    #[test]
    fn system_prompt_includes_blocks_only_when_present() {
        let bare = build_system_prompt(None, "");
        assert!(!bare.contains("Previous conversation:"));
        assert!(!bare.contains("Course material:"));

        let with_history = build_system_prompt(Some("User: hi\nAssistant: hello"), "");
        assert!(with_history.contains("Previous conversation:\nUser: hi"));
        assert!(!with_history.contains("Course material:"));

        let with_both = build_system_prompt(Some("User: hi"), "[Course A]\nchunk text");
        assert!(with_both.contains("Previous conversation:"));
        assert!(with_both.contains("Course material:\n[Course A]\nchunk text"));
    }

    #[tokio::test]
    async fn generate_returns_provider_answer() {
        let generator = AiGenerator::new(
            Arc::new(CannedProvider {
                answer: "The answer.".to_string(),
            }),
            "test-model".to_string(),
            800,
            0.0,
        );

        let answer = generator
            .generate("What is covered in lesson 1?", None, "[C]\ntext")
            .await
            .unwrap();
        assert_eq!(answer, "The answer.");
    }
}
