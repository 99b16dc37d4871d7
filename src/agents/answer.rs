//! Answer Agent
//!
//! Turns one user utterance into a structured answer: a reply text plus
//! follow-up questions. The model sees the system prompt, a canned priming
//! answer and the live question, and must reply with strict JSON.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::agents::prompts::PromptSet;
use crate::config::LLMConfig;
use crate::llm::provider::{LLMProviderConfig, LLM};
use crate::models::GeneratedAnswer;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

/// Number of follow-up questions the prompt asks for
pub const EXPECTED_FOLLOW_UPS: usize = 2;

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, user_input: &str) -> AppResult<GeneratedAnswer>;
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(25),
        }
    }
}

pub struct AnswerAgent {
    /// `None` when no API key is configured; every call then fails with a config error
    llm: Option<LLM>,
    prompts: PromptSet,
    settings: GenerationSettings,
}

impl AnswerAgent {
    pub fn new(llm: Option<LLM>, prompts: PromptSet, settings: GenerationSettings) -> Self {
        Self {
            llm,
            prompts,
            settings,
        }
    }

    pub fn from_config(config: &LLMConfig, prompts: PromptSet) -> AppResult<Self> {
        let llm = match &config.api_key {
            Some(api_key) => Some(LLM::new(LLMProviderConfig {
                name: config.provider.clone(),
                api_key: api_key.clone(),
                api_base: Some(config.api_base.clone()),
            })?),
            None => {
                warn!("GEMINI_API_KEY is not set; jobs will fail until it is configured");
                None
            }
        };

        Ok(Self::new(
            llm,
            prompts,
            GenerationSettings {
                model: config.model.clone(),
                temperature: config.temperature,
                timeout: config.timeout,
            },
        ))
    }

    fn build_request(&self, provider: &str, user_input: &str) -> LLMRequest {
        LLMRequest {
            provider: provider.to_string(),
            model: self.settings.model.clone(),
            messages: vec![
                LLMMessage::user(&self.prompts.system_prompt),
                LLMMessage::assistant(&self.prompts.priming_example),
                LLMMessage::user(user_input),
            ],
            temperature: Some(self.settings.temperature),
            json_output: true,
        }
    }
}

#[async_trait]
impl AnswerGenerator for AnswerAgent {
    async fn generate(&self, user_input: &str) -> AppResult<GeneratedAnswer> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY is not set.".to_string()))?;

        let request = self.build_request(llm.provider_name(), user_input);

        info!(
            input_len = user_input.len(),
            model = %request.model,
            "Generating answer"
        );

        // Dropping the future on expiry cancels the in-flight request
        let response = tokio::time::timeout(self.settings.timeout, llm.create_chat_completion(&request))
            .await
            .map_err(|_| AppError::Timeout(self.settings.timeout))??;

        info!(
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "Model responded"
        );

        parse_answer(&response.content)
    }
}

/// Parse the model's raw text into a [`GeneratedAnswer`].
///
/// A surrounding markdown code fence is tolerated; anything else that is not
/// an object with both keys is a parse error.
pub fn parse_answer(raw: &str) -> AppResult<GeneratedAnswer> {
    let body = strip_code_fence(raw.trim());
    let answer: GeneratedAnswer = serde_json::from_str(body)
        .map_err(|e| AppError::Parse(format!("model output is not a valid answer: {}", e)))?;

    if answer.follow_up_questions.len() != EXPECTED_FOLLOW_UPS {
        warn!(
            count = answer.follow_up_questions.len(),
            "Model returned an unexpected number of follow-up questions"
        );
    }

    Ok(answer)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMAdapter;
    use crate::types::{LLMResponse, TokenUsage};
    use std::sync::{Arc, Mutex};

    struct StubAdapter {
        reply: String,
        delay: Duration,
        seen: Arc<Mutex<Vec<LLMRequest>>>,
    }

    #[async_trait]
    impl LLMAdapter for StubAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.seen.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            Ok(LLMResponse {
                content: self.reply.clone(),
                finish_reason: "STOP".into(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn agent(reply: &str, delay: Duration, timeout: Duration) -> (AnswerAgent, Arc<Mutex<Vec<LLMRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let adapter = StubAdapter {
            reply: reply.to_string(),
            delay,
            seen: seen.clone(),
        };
        let settings = GenerationSettings {
            timeout,
            ..GenerationSettings::default()
        };
        let agent = AnswerAgent::new(
            Some(LLM::with_adapter("stub", Box::new(adapter))),
            PromptSet::builtin(),
            settings,
        );
        (agent, seen)
    }

    #[test]
    fn test_parse_answer() {
        let answer =
            parse_answer(r#"{"response_text":"X","follow_up_questions":["Q1","Q2"]}"#).unwrap();
        assert_eq!(answer.response_text, "X");
        assert_eq!(answer.follow_up_questions, vec!["Q1", "Q2"]);
    }

    #[test]
    fn test_parse_answer_strips_code_fence() {
        let raw = "```json\n{\"response_text\":\"X\",\"follow_up_questions\":[\"Q1\",\"Q2\"]}\n```";
        assert_eq!(parse_answer(raw).unwrap().response_text, "X");
    }

    #[test]
    fn test_parse_answer_rejects_missing_key() {
        assert!(matches!(
            parse_answer(r#"{"response_text":"X"}"#),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_answer_rejects_prose() {
        assert!(matches!(
            parse_answer("Sure! Here is your answer."),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_answer_accepts_other_question_counts() {
        let answer = parse_answer(r#"{"response_text":"X","follow_up_questions":[]}"#).unwrap();
        assert!(answer.follow_up_questions.is_empty());
    }

    #[tokio::test]
    async fn test_generate_sends_primed_conversation() {
        let (agent, seen) = agent(
            r#"{"response_text":"X","follow_up_questions":["Q1","Q2"]}"#,
            Duration::ZERO,
            Duration::from_secs(5),
        );

        let answer = agent.generate("아기가 열이 나요").await.unwrap();
        assert_eq!(answer.response_text, "X");

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        let prompts = PromptSet::builtin();
        assert_eq!(
            request.messages,
            vec![
                LLMMessage::user(prompts.system_prompt),
                LLMMessage::assistant(prompts.priming_example),
                LLMMessage::user("아기가 열이 나요"),
            ]
        );
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.json_output);
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let (agent, _) = agent(
            r#"{"response_text":"X","follow_up_questions":["Q1","Q2"]}"#,
            Duration::from_secs(5),
            Duration::from_millis(50),
        );

        let result = agent.generate("question").await;
        assert!(matches!(result, Err(AppError::Timeout(d)) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_generate_without_key_is_config_error() {
        let agent = AnswerAgent::new(None, PromptSet::builtin(), GenerationSettings::default());
        assert!(matches!(
            agent.generate("question").await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_reports_malformed_output() {
        let (agent, _) = agent("not json", Duration::ZERO, Duration::from_secs(5));
        assert!(matches!(
            agent.generate("question").await,
            Err(AppError::Parse(_))
        ));
    }
}
