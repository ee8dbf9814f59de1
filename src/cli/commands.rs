//! Parsing of interactive player commands.

use std::fmt;
use std::str::FromStr;

use crate::game::{ClueId, Difficulty};

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Log in as the given player
    Login(String),
    /// Start a case at a difficulty
    Start(Difficulty),
    /// Reveal a clue, opening its puzzle when locked
    Reveal(ClueId),
    /// Enter a code for the open puzzle
    Unlock(String),
    /// Close the open puzzle
    GiveUp,
    /// Ask for a hint
    Hint,
    /// Open the suspect list
    Solve,
    /// Pick a suspect
    Select(String),
    /// Confirm the accusation
    Confirm,
    /// Close the suspect list
    Back,
    /// Return to the board after a wrong accusation
    Retry,
    /// Show the solution after a wrong accusation
    Answer,
    /// Start another case at the same difficulty
    Next,
    /// Return to the dashboard
    Dashboard,
    /// Dismiss the error screen or banner
    Dismiss,
    /// Redraw the current screen
    Status,
    /// End the session
    Logout,
    /// Leave the game
    Quit,
    /// List commands
    Help,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseCommandError {}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> Result<&'a str, ParseCommandError> {
    arg.filter(|a| !a.is_empty())
        .ok_or_else(|| ParseCommandError(format!("usage: {}", usage)))
}

impl FromStr for PlayerCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, Some(rest.trim())),
            None => (line, None),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "login" => PlayerCommand::Login(required(arg, "login <name>")?.to_string()),
            "start" => {
                let difficulty = arg.unwrap_or(Difficulty::default().as_str());
                PlayerCommand::Start(
                    difficulty
                        .parse()
                        .map_err(|_| ParseCommandError("usage: start <easy|medium|hard>".into()))?,
                )
            }
            "reveal" | "r" => {
                let id = required(arg, "reveal <clue-id>")?;
                PlayerCommand::Reveal(
                    id.parse()
                        .map_err(|_| ParseCommandError(format!("not a clue id: {}", id)))?,
                )
            }
            "unlock" | "u" => PlayerCommand::Unlock(required(arg, "unlock <code>")?.to_string()),
            "giveup" => PlayerCommand::GiveUp,
            "hint" => PlayerCommand::Hint,
            "solve" => PlayerCommand::Solve,
            "select" => PlayerCommand::Select(required(arg, "select <suspect-id>")?.to_string()),
            "confirm" => PlayerCommand::Confirm,
            "back" => PlayerCommand::Back,
            "retry" => PlayerCommand::Retry,
            "answer" => PlayerCommand::Answer,
            "next" => PlayerCommand::Next,
            "dashboard" => PlayerCommand::Dashboard,
            "dismiss" => PlayerCommand::Dismiss,
            "status" => PlayerCommand::Status,
            "logout" => PlayerCommand::Logout,
            "quit" | "exit" => PlayerCommand::Quit,
            "help" | "?" => PlayerCommand::Help,
            "" => return Err(ParseCommandError("empty command".into())),
            other => {
                return Err(ParseCommandError(format!(
                    "unknown command '{}', type 'help' for a list",
                    other
                )))
            }
        };
        Ok(command)
    }
}

/// Command reference shown by `help`.
pub const HELP: &str = "\
login <name>          log in (creates the profile on first use)
start [difficulty]    start a case: easy, medium or hard
reveal <id>           reveal a clue; locked clues open a code puzzle
unlock <code>         enter the code for the open puzzle
giveup                close the puzzle, the clue stays locked
hint                  ask for a hint
solve                 open the suspect list
select <id>           pick a suspect
confirm               accuse the selected suspect
back                  close the suspect list
retry                 go back to the board after a wrong accusation
answer                show the solution (no XP)
next                  another case at the same difficulty
dashboard             back to the dashboard
dismiss               dismiss an error or message
status                show the current screen
logout                log out
quit                  leave";
