//! Pipe-backed case generation and hints.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, info};

use super::{LangbaseClient, Message, PipeRequest};
use crate::config::PipeConfig;
use crate::error::{CollaboratorError, CollaboratorResult, LangbaseError};
use crate::game::{CaseGenerator, ClueId, Difficulty, HintProvider, MysteryCase};
use crate::prompts::{HINT_PROMPT, MYSTERY_CASE_PROMPT};

/// Generates cases and hints by running Langbase pipes.
#[derive(Clone)]
pub struct MysteryOracle {
    langbase: LangbaseClient,
    case_pipe: String,
    hint_pipe: String,
}

impl MysteryOracle {
    /// Create an oracle using the configured pipe names
    pub fn new(langbase: LangbaseClient, pipes: &PipeConfig) -> Self {
        Self {
            langbase,
            case_pipe: pipes.case.clone(),
            hint_pipe: pipes.hint.clone(),
        }
    }

    fn case_request(&self, difficulty: Difficulty) -> PipeRequest {
        PipeRequest::new(
            &self.case_pipe,
            vec![
                Message::system(MYSTERY_CASE_PROMPT),
                Message::user(format!(
                    "Difficulty: {}\nWrite a new mystery case.",
                    difficulty
                )),
            ],
        )
        .with_variable("difficulty", difficulty.as_str())
    }

    fn hint_request(&self, case: &MysteryCase, revealed: &[ClueId]) -> PipeRequest {
        PipeRequest::new(
            &self.hint_pipe,
            vec![
                Message::system(HINT_PROMPT),
                Message::user(hint_context(case, revealed)),
            ],
        )
    }
}

/// Case summary for the hint pipe. Only revealed clues are included.
fn hint_context(case: &MysteryCase, revealed: &[ClueId]) -> String {
    let suspects: Vec<String> = case
        .options
        .iter()
        .map(|s| format!("- {} ({}): {}", s.name, s.id, s.description))
        .collect();

    let clues: Vec<String> = case
        .clues
        .iter()
        .filter(|c| revealed.contains(&c.id))
        .map(|c| format!("- [{}] {}", c.kind, c.text))
        .collect();

    let clues = if clues.is_empty() {
        "(none yet)".to_string()
    } else {
        clues.join("\n")
    };

    format!(
        "Case: {}\n\n{}\n\nSuspects:\n{}\n\nUncovered clues:\n{}",
        case.title,
        case.scenario,
        suspects.join("\n"),
        clues
    )
}

/// Extract JSON from a completion string, handling markdown code blocks.
///
/// Attempts extraction in this order:
/// 1. Raw JSON
/// 2. ```json ... ``` code blocks
/// 3. ``` ... ``` code blocks
fn extract_json(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let fenced = if completion.contains("```json") {
        completion.split("```json").nth(1)
    } else {
        completion.split("```").nth(1)
    };

    fenced
        .and_then(|s| s.split("```").next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            format!(
                "No JSON found in response. First 100 chars: '{}'",
                completion.chars().take(100).collect::<String>()
            )
        })
}

/// Parse and validate a case from a pipe completion.
pub fn parse_case(completion: &str) -> Result<MysteryCase, LangbaseError> {
    let json = extract_json(completion).map_err(|message| LangbaseError::InvalidResponse {
        message,
    })?;

    let case: MysteryCase =
        serde_json::from_str(json).map_err(|e| LangbaseError::InvalidResponse {
            message: format!("Case JSON did not match the expected shape: {}", e),
        })?;

    case.validate()
        .map_err(|e| LangbaseError::InvalidResponse {
            message: e.to_string(),
        })?;

    Ok(case)
}

#[async_trait]
impl CaseGenerator for MysteryOracle {
    async fn generate_case(&self, difficulty: Difficulty) -> CollaboratorResult<MysteryCase> {
        let start = Instant::now();
        let response = self.langbase.call_pipe(self.case_request(difficulty)).await?;
        let case = parse_case(&response.completion)?;

        info!(
            title = %case.title,
            difficulty = %difficulty,
            clues = case.clues.len(),
            suspects = case.options.len(),
            latency_ms = start.elapsed().as_millis(),
            "Case generated"
        );
        Ok(case)
    }
}

#[async_trait]
impl HintProvider for MysteryOracle {
    async fn get_hint(
        &self,
        case: &MysteryCase,
        revealed: &[ClueId],
    ) -> CollaboratorResult<String> {
        debug!(title = %case.title, revealed = revealed.len(), "Requesting hint");
        let response = self
            .langbase
            .call_pipe(self.hint_request(case, revealed))
            .await?;

        let hint = response.completion.trim();
        if hint.is_empty() {
            return Err(CollaboratorError::Unavailable {
                message: "hint pipe returned an empty completion".to_string(),
            });
        }
        Ok(hint.to_string())
    }
}
