//! Line-oriented game driver.
//!
//! Reads [`PlayerCommand`]s, forwards them to the [`GameStateMachine`] and
//! prints the resulting screen as plain text.

use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use super::commands::{PlayerCommand, HELP};
use crate::error::GameResult;
use crate::game::{GameEvent, GameStateMachine, RevealAction, SessionPhase};

/// Run the game until `quit` or end of input.
pub async fn run<R, W>(machine: &mut GameStateMachine, input: R, mut out: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Err(e) = machine.boot().await {
        debug!(error = %e, "Boot skipped");
    }
    print_events(machine, &mut out)?;
    writeln!(out, "{}", render(machine))?;
    prompt(&mut out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt(&mut out)?;
            continue;
        }

        match line.parse::<PlayerCommand>() {
            Ok(PlayerCommand::Quit) => break,
            Ok(PlayerCommand::Help) => writeln!(out, "{}", HELP)?,
            Ok(command) => {
                debug!(?command, "Player command");
                execute(machine, command, &mut out).await?;
                print_events(machine, &mut out)?;
                writeln!(out, "{}", render(machine))?;
            }
            Err(e) => writeln!(out, "{}", e)?,
        }
        prompt(&mut out)?;
    }

    writeln!(out, "Goodbye, detective.")?;
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

async fn execute(
    machine: &mut GameStateMachine,
    command: PlayerCommand,
    out: &mut impl Write,
) -> io::Result<()> {
    let result: GameResult<()> = match command {
        PlayerCommand::Login(name) => machine.login(&name).await.map(|_| ()),
        PlayerCommand::Start(difficulty) => {
            writeln!(out, "Writing a {} case...", difficulty)?;
            machine.start(difficulty).await
        }
        PlayerCommand::Reveal(id) => match machine.request_reveal(id) {
            Ok(RevealAction::RequiresPuzzle) => {
                writeln!(out, "Clue {} is locked.", id)?;
                Ok(())
            }
            other => other.map(|_| ()),
        },
        PlayerCommand::Unlock(code) => match machine.submit_puzzle(&code) {
            Ok(true) => {
                writeln!(out, "The lock clicks open.")?;
                Ok(())
            }
            Ok(false) => {
                writeln!(out, "Wrong code.")?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        PlayerCommand::GiveUp => machine.abandon_puzzle(),
        PlayerCommand::Hint => match machine.request_hint().await {
            Ok(hint) => {
                writeln!(out, "Hint: {}", hint)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        PlayerCommand::Solve => machine.request_solve(),
        PlayerCommand::Select(id) => machine.select_suspect(&id),
        PlayerCommand::Confirm => machine.confirm_selection().await.map(|_| ()),
        PlayerCommand::Back => machine.cancel_solve(),
        PlayerCommand::Retry => machine.re_examine(),
        PlayerCommand::Answer => machine.reveal_answer().await,
        PlayerCommand::Next => machine.next_case().await,
        PlayerCommand::Dashboard => machine.go_to_dashboard(),
        PlayerCommand::Dismiss => {
            machine.dismiss_banner();
            if machine.phase() == SessionPhase::Error {
                machine.dismiss_error()
            } else {
                Ok(())
            }
        }
        PlayerCommand::Logout => {
            machine.logout().await;
            Ok(())
        }
        PlayerCommand::Status | PlayerCommand::Help | PlayerCommand::Quit => Ok(()),
    };

    if let Err(e) = result {
        writeln!(out, "Can't do that: {}", e)?;
    }
    Ok(())
}

fn print_events(machine: &mut GameStateMachine, out: &mut impl Write) -> io::Result<()> {
    for event in machine.drain_events() {
        match event {
            GameEvent::PhaseChanged {
                from: SessionPhase::Solving,
                to: SessionPhase::Playing,
            } if machine.phase() != SessionPhase::Playing => {
                writeln!(out, "*** Correct! Case closed. ***")?;
            }
            GameEvent::PhaseChanged {
                to: SessionPhase::Failure,
                ..
            } => writeln!(out, "That's not who did it.")?,
            GameEvent::PhaseChanged { from, to } => debug!(%from, %to, "Screen changed"),
            GameEvent::LevelUp { level } => {
                writeln!(out, "*** Level up! You are now level {}. ***", level)?
            }
            GameEvent::Banner { message } => writeln!(out, "! {}", message)?,
        }
    }
    Ok(())
}

/// Plain-text view of the current screen.
pub fn render(machine: &GameStateMachine) -> String {
    let mut screen = String::new();

    if let Some(banner) = machine.banner() {
        screen.push_str(&format!("! {} (dismiss)\n", banner));
    }

    match machine.phase() {
        SessionPhase::Auth => screen.push_str("Log in with: login <name>"),
        SessionPhase::Idle => {
            if let Some(p) = machine.profile() {
                screen.push_str(&format!(
                    "Detective {} | level {} | XP {}/{} | cases solved {}\n",
                    p.username, p.level, p.current_xp, p.xp_to_next_level, p.cases_solved
                ));
            }
            screen.push_str("Start a case: start <easy|medium|hard>");
        }
        SessionPhase::Loading => screen.push_str(&format!(
            "Writing a {} case...",
            machine.last_difficulty()
        )),
        SessionPhase::Playing => render_board(machine, &mut screen),
        SessionPhase::Solving => render_suspects(machine, &mut screen),
        SessionPhase::Success => render_solution(machine, &mut screen),
        SessionPhase::Failure => screen.push_str(
            "Wrong suspect. 'retry' to keep investigating or 'answer' to see the solution.",
        ),
        SessionPhase::Error => screen.push_str(&format!(
            "Error: {}\n'dismiss' to return to the dashboard.",
            machine.error_message().unwrap_or("unknown error")
        )),
    }

    screen
}

fn render_board(machine: &GameStateMachine, screen: &mut String) {
    let Some(session) = machine.session() else {
        return;
    };
    let case = session.case();
    let visibility = session.visibility();

    screen.push_str(&format!(
        "== {} ({}) ==\n{}\n\nClues:\n",
        case.title, case.difficulty, case.scenario
    ));
    for clue in &case.clues {
        let line = if visibility.is_revealed(clue.id) {
            format!("  [{}] ({}) {}\n", clue.id, clue.kind, clue.text)
        } else if visibility.is_locked(clue.id) {
            format!("  [{}] locked\n", clue.id)
        } else {
            format!("  [{}] ?\n", clue.id)
        };
        screen.push_str(&line);
    }

    if let Some(hint) = session.hint() {
        screen.push_str(&format!("Hint: {}\n", hint));
    }
    if let Some(puzzle) = session.puzzle() {
        screen.push_str(&format!(
            "Clue {} is locked. Type the code {} with: unlock <code> (or giveup)",
            puzzle.clue_id(),
            puzzle.code()
        ));
    } else {
        screen.push_str("reveal <id> | hint | solve");
    }
}

fn render_suspects(machine: &GameStateMachine, screen: &mut String) {
    let Some(session) = machine.session() else {
        return;
    };
    screen.push_str("Who did it?\n");
    for suspect in &session.case().options {
        let marker = if session.selected_suspect() == Some(suspect.id.as_str()) {
            '*'
        } else {
            ' '
        };
        screen.push_str(&format!(
            " {} {}: {} - {}\n",
            marker, suspect.id, suspect.name, suspect.description
        ));
    }
    screen.push_str("select <id> | confirm | back");
}

fn render_solution(machine: &GameStateMachine, screen: &mut String) {
    let Some(session) = machine.session() else {
        return;
    };
    let case = session.case();
    if let Some(culprit) = case.culprit() {
        screen.push_str(&format!("The culprit: {}\n", culprit.name));
    }
    screen.push_str(&format!("{}\n", case.explanation));
    match machine.success_reward() {
        Some(xp) => screen.push_str(&format!("+{} XP\n", xp)),
        None => screen.push_str("Answer revealed, no XP.\n"),
    }
    screen.push_str("next | dashboard");
}
