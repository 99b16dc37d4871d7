//! Agent System
//!
//! The answer agent turns a queued question into a structured reply:
//!
//! ```text
//! Job.userInput
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Answer    │  → system prompt + priming answer + question
//! │   Agent     │  → strict-JSON model call, bounded by a deadline
//! └─────────────┘
//!      │
//!      ▼
//! GeneratedAnswer { response_text, follow_up_questions }
//! ```

pub mod answer;
pub mod prompts;

pub use answer::{AnswerAgent, AnswerGenerator, GenerationSettings};
pub use prompts::PromptSet;
