// Line-oriented console front end.
//
// Reads commands from stdin, forwards them to the app loop and prints the
// UiUpdates that come back. Rendering is plain text on stdout; logs go to
// the log file so they never interleave with the prompt.

pub mod input;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::game::session::{SessionSnapshot, SessionState};
use crate::game::Mode;
use crate::protocol::{UiUpdate, UserCommand};
use crate::stats::PlayerRecord;
use input::{InputAction, FORMULAS_TEXT, HELP_TEXT};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// What the console knows about the session, rebuilt from snapshots.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: Mode,
    pub snapshot: Option<SessionSnapshot>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            mode: Mode::Hitting,
            snapshot: None,
        }
    }
}

impl ViewState {
    /// One-line status: mode, current batter, auto-advance.
    pub fn status_line(&self) -> String {
        let Some(snap) = &self.snapshot else {
            return format!("[{}] waiting for session", self.mode);
        };
        let batter = match snap.state {
            SessionState::NoLineup => "no lineup".to_string(),
            SessionState::Ready => format!(
                "batter: {}",
                snap.current_batter.as_deref().unwrap_or("-")
            ),
        };
        format!(
            "[{}] {} | auto-advance {}",
            self.mode,
            batter,
            if snap.auto_advance { "on" } else { "off" }
        )
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply an update and return the lines to print for it.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) -> Vec<String> {
    match update {
        UiUpdate::Info(msg) => vec![msg],
        UiUpdate::Warning(msg) => vec![format!("warning: {msg}")],
        UiUpdate::Error(msg) => vec![format!("error: {msg}")],
        UiUpdate::Summary(table) => table.lines().map(str::to_string).collect(),
        UiUpdate::Snapshot { snapshot, mode } => {
            state.mode = mode;
            state.snapshot = Some(*snapshot);
            let mut lines = vec![state.status_line()];
            if let Some(snap) = &state.snapshot {
                lines.extend(live_summary(&snap.players, mode));
            }
            lines
        }
    }
}

/// Compact per-player line for the active mode.
pub fn live_summary(players: &[PlayerRecord], mode: Mode) -> Vec<String> {
    players
        .iter()
        .map(|p| {
            let d = p.derived().formatted();
            match mode {
                Mode::Hitting => format!(
                    "  {:<12} {}-for-{}  AVG {}  OBP {}  OPS {}",
                    p.name,
                    p.hits(),
                    p.at_bats,
                    d.avg,
                    d.obp,
                    d.ops
                ),
                Mode::Pitching => format!(
                    "  {:<12} IP {}  K {}  BB {}  ERA {}  WHIP {}",
                    p.name, d.ip, p.strikeouts_pitched, p.walks_allowed, d.era, d.whip
                ),
            }
        })
        .collect()
}

fn print_lines(lines: &[String]) {
    let mut out = std::io::stdout().lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}

fn prompt() {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "> ");
    let _ = out.flush();
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the console until the user quits, stdin closes, or the app loop
/// hangs up.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut view_state = ViewState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_lines(&["Box score console. Type `help` for commands.".to_string()]);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        print_lines(&apply_ui_update(&mut view_state, ui_update));
                        prompt();
                    }
                    None => break,
                }
            }

            line = lines.next_line() => {
                match line? {
                    Some(text) => {
                        match input::parse_line(&text) {
                            Ok(None) => prompt(),
                            Ok(Some(InputAction::Help)) => {
                                print_lines(&[HELP_TEXT.to_string()]);
                                prompt();
                            }
                            Ok(Some(InputAction::Formulas)) => {
                                print_lines(&[FORMULAS_TEXT.to_string()]);
                                prompt();
                            }
                            Ok(Some(InputAction::Command(cmd))) => {
                                debug!("Console command: {:?}", cmd);
                                let quit = cmd == UserCommand::Quit;
                                if cmd_tx.send(cmd).await.is_err() {
                                    warn!("App loop closed the command channel");
                                    break;
                                }
                                if quit {
                                    break;
                                }
                            }
                            Err(e) => {
                                print_lines(&[format!("error: {e}")]);
                                prompt();
                            }
                        }
                    }
                    None => {
                        // stdin closed
                        let _ = cmd_tx.send(UserCommand::Quit).await;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
