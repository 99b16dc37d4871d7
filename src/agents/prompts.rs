//! Prompt assets for the answer agent
//!
//! The system prompt and the priming example are versioned files under
//! `prompts/`. They are compiled in as defaults and can be replaced at runtime
//! by pointing `PROMPT_DIR` at a directory holding the same two files.

use std::path::Path;

use tracing::info;

use crate::models::GeneratedAnswer;
use crate::types::{AppError, AppResult};

pub const SYSTEM_PROMPT_FILE: &str = "system.md";
pub const PRIMING_EXAMPLE_FILE: &str = "priming.json";

const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../../prompts/system.md");
const DEFAULT_PRIMING_EXAMPLE: &str = include_str!("../../prompts/priming.json");

#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub system_prompt: String,
    /// Canned assistant turn demonstrating the exact output schema
    pub priming_example: String,
}

impl PromptSet {
    pub fn builtin() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.trim().to_string(),
            priming_example: DEFAULT_PRIMING_EXAMPLE.trim().to_string(),
        }
    }

    /// Load prompts from `dir`, or the compiled-in defaults when `dir` is `None`
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        let prompts = match dir {
            None => Self::builtin(),
            Some(dir) => {
                info!(dir = %dir.display(), "Loading prompts from directory");
                Self {
                    system_prompt: read_asset(dir, SYSTEM_PROMPT_FILE)?,
                    priming_example: read_asset(dir, PRIMING_EXAMPLE_FILE)?,
                }
            }
        };
        prompts.validate()?;
        Ok(prompts)
    }

    fn validate(&self) -> AppResult<()> {
        if self.system_prompt.is_empty() {
            return Err(AppError::Config("system prompt is empty".into()));
        }
        serde_json::from_str::<GeneratedAnswer>(&self.priming_example).map_err(|e| {
            AppError::Config(format!(
                "priming example does not match the answer schema: {}",
                e
            ))
        })?;
        Ok(())
    }
}

fn read_asset(dir: &Path, name: &str) -> AppResult<String> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))
}
