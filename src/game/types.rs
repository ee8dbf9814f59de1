use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{GameError, GameResult};

/// Identifier of a clue, unique within its case.
pub type ClueId = u32;

/// Case difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Few clues, few suspects.
    Easy,
    /// The default.
    #[default]
    Medium,
    /// More clues, more red herrings, more locks.
    Hard,
}

impl Difficulty {
    /// Get the difficulty name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Unknown difficulty: {}", s)),
        }
    }
}

/// What kind of evidence a clue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueType {
    /// Something the detective noticed at the scene.
    Observation,
    /// A witness statement.
    Testimony,
    /// A physical item.
    PhysicalObject,
    /// Background information.
    Context,
}

impl ClueType {
    /// Whether clues of this type may be locked behind a puzzle.
    pub fn is_lockable(&self) -> bool {
        matches!(self, ClueType::PhysicalObject | ClueType::Testimony)
    }

    /// Get the clue type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClueType::Observation => "observation",
            ClueType::Testimony => "testimony",
            ClueType::PhysicalObject => "physical_object",
            ClueType::Context => "context",
        }
    }
}

impl std::fmt::Display for ClueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single piece of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// Identifier, unique within the case.
    pub id: ClueId,
    /// What the player reads once the clue is revealed.
    pub text: String,
    /// Evidence kind; decides whether the clue can be locked.
    #[serde(rename = "type")]
    pub kind: ClueType,
    /// Narrative flavor only. Never consulted by game logic.
    #[serde(default)]
    pub is_red_herring: bool,
}

/// A suspect the player can accuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspect {
    /// Identifier compared against `MysteryCase::correct_option_id`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
}

/// One generated mystery. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryCase {
    /// Case title.
    pub title: String,
    /// Narrative shown at the top of the board.
    pub scenario: String,
    /// Difficulty the case was generated for.
    pub difficulty: Difficulty,
    /// Ordered evidence.
    pub clues: Vec<Clue>,
    /// Suspects.
    pub options: Vec<Suspect>,
    /// Id of the culprit among `options`.
    pub correct_option_id: String,
    /// Revealed on the success screen.
    pub explanation: String,
}

impl MysteryCase {
    /// Check the structural invariants of a generated case.
    ///
    /// Clue ids must be unique, there must be at least one clue and two
    /// suspects, suspect ids must be unique and exactly one of them must be
    /// the correct answer.
    pub fn validate(&self) -> GameResult<()> {
        if self.clues.is_empty() {
            return Err(invalid("case has no clues"));
        }
        if self.options.len() < 2 {
            return Err(invalid("case needs at least two suspects"));
        }

        let mut clue_ids = HashSet::new();
        for clue in &self.clues {
            if !clue_ids.insert(clue.id) {
                return Err(invalid(format!("duplicate clue id {}", clue.id)));
            }
        }

        let mut option_ids = HashSet::new();
        for option in &self.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(invalid(format!("duplicate suspect id {}", option.id)));
            }
        }

        if !option_ids.contains(self.correct_option_id.as_str()) {
            return Err(invalid(format!(
                "correct_option_id {} matches no suspect",
                self.correct_option_id
            )));
        }

        Ok(())
    }

    /// Look up a clue by id
    pub fn clue(&self, id: ClueId) -> Option<&Clue> {
        self.clues.iter().find(|c| c.id == id)
    }

    /// Look up a suspect by id
    pub fn suspect(&self, id: &str) -> Option<&Suspect> {
        self.options.iter().find(|o| o.id == id)
    }

    /// The culprit
    pub fn culprit(&self) -> Option<&Suspect> {
        self.suspect(&self.correct_option_id)
    }
}

fn invalid(message: impl Into<String>) -> GameError {
    GameError::InvalidCase {
        message: message.into(),
    }
}

/// Top-level phase of a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No authenticated player.
    Auth,
    /// Dashboard, waiting for a case to be started.
    Idle,
    /// Waiting for the case generator.
    Loading,
    /// Investigating the board.
    Playing,
    /// Choosing a suspect.
    Solving,
    /// Case closed.
    Success,
    /// Wrong accusation.
    Failure,
    /// Unrecoverable configuration problem.
    Error,
}

impl SessionPhase {
    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Auth => "auth",
            SessionPhase::Idle => "idle",
            SessionPhase::Loading => "loading",
            SessionPhase::Playing => "playing",
            SessionPhase::Solving => "solving",
            SessionPhase::Success => "success",
            SessionPhase::Failure => "failure",
            SessionPhase::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of comparing the accusation with the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The selected suspect is the culprit.
    Correct,
    /// Anyone else.
    Incorrect,
}
