// Application state and orchestration logic.
//
// The app loop exclusively owns the game session and applies user commands
// one at a time, so every play or undo is a complete read-modify-write
// before the next command is looked at. Results go back to the front end as
// `UiUpdate`s.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::game::roster::Roster;
use crate::game::{GameSession, Mode, UndoOutcome};
use crate::protocol::{UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub session: GameSession,
    /// Mode used for fast-tap `Play` commands.
    pub mode: Mode,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let session = GameSession::new(config.game.session_options());
        let mode = config.game.start_mode;
        AppState {
            config,
            session,
            mode,
        }
    }

    fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.export.dir)
    }

    fn snapshot_update(&self) -> UiUpdate {
        UiUpdate::Snapshot {
            snapshot: Box::new(self.session.snapshot()),
            mode: self.mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Consume commands until `Quit` or until the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx.send(state.snapshot_update()).await;

    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == UserCommand::Quit {
            info!("Quit requested");
            break;
        }
        handle_user_command(&mut state, cmd, &ui_tx).await;
    }

    info!("Application event loop finished");
    Ok(())
}

/// Apply a single command to the state and report the result.
///
/// Errors are reported to the front end and never end the session.
pub async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let updates = match cmd {
        UserCommand::SaveLineup(names) => match state.session.save_lineup(names) {
            Ok(()) if state.session.lineup().is_empty() => {
                vec![UiUpdate::Warning("Lineup cleared.".into()), state.snapshot_update()]
            }
            Ok(()) => vec![UiUpdate::Info("Lineup saved.".into()), state.snapshot_update()],
            Err(e) => vec![UiUpdate::Error(e.to_string())],
        },
        UserCommand::SelectBatter(name) => match state.session.select_batter(&name) {
            Ok(_) => vec![state.snapshot_update()],
            Err(e) => vec![UiUpdate::Error(e.to_string())],
        },
        UserCommand::SetMode(mode) => {
            state.mode = mode;
            info!("Fast mode switched to {}", mode);
            vec![state.snapshot_update()]
        }
        UserCommand::SetAutoAdvance(on) => {
            state.session.set_auto_advance(on);
            vec![UiUpdate::Info(format!(
                "Auto-advance {}.",
                if on { "on" } else { "off" }
            ))]
        }
        UserCommand::Play(play) => {
            let mode = state.mode;
            match state.session.apply_play_for_current(play, mode) {
                Ok(record) => {
                    let msg = format!("{play} recorded for {}.", record.name);
                    vec![UiUpdate::Info(msg), state.snapshot_update()]
                }
                Err(e) => vec![UiUpdate::Error(e.to_string())],
            }
        }
        UserCommand::PlayFor { player, play, mode } => {
            match state.session.apply_play(&player, play, mode) {
                Ok(record) => {
                    let msg = format!("{play} recorded for {}.", record.name);
                    vec![UiUpdate::Info(msg), state.snapshot_update()]
                }
                Err(e) => vec![UiUpdate::Error(e.to_string())],
            }
        }
        UserCommand::Undo => {
            let outcome = state.session.undo();
            let report = outcome.report();
            match outcome {
                UndoOutcome::Undone { .. } => {
                    vec![UiUpdate::Info(report.message), state.snapshot_update()]
                }
                UndoOutcome::NothingToUndo | UndoOutcome::PlayerVanished { .. } => {
                    vec![UiUpdate::Warning(report.message)]
                }
            }
        }
        UserCommand::ManualEntry(entry) => {
            let name = entry.name.trim().to_string();
            match state.session.submit_entry(entry) {
                Ok(outcome) => vec![
                    UiUpdate::Info(format!("{} stats for {name}.", capitalize(&outcome.to_string()))),
                    state.snapshot_update(),
                ],
                Err(e) => vec![UiUpdate::Error(e.to_string())],
            }
        }
        UserCommand::ShowSummary => {
            vec![UiUpdate::Summary(export::format_summary_table(
                state.session.roster().players(),
            ))]
        }
        UserCommand::Export(format) => export_roster(state, format),
        UserCommand::ImportRoster(path) => match Roster::load(&path) {
            Ok(roster) => {
                let count = roster.len();
                state.session.replace_roster(roster);
                vec![
                    UiUpdate::Info(format!("Imported {count} players from {}.", path.display())),
                    state.snapshot_update(),
                ]
            }
            Err(e) => {
                warn!("Roster import failed: {}", e);
                vec![UiUpdate::Error(e.to_string())]
            }
        },
        UserCommand::ListCandidates => {
            let names = state.session.lineup_candidates();
            vec![UiUpdate::Info(format!("Candidates: {}", names.join(", ")))]
        }
        UserCommand::Quit => Vec::new(),
    };

    for update in updates {
        let _ = ui_tx.send(update).await;
    }
}

fn export_roster(state: &AppState, format: ExportFormat) -> Vec<UiUpdate> {
    if state.session.roster().is_empty() {
        return vec![UiUpdate::Warning("No stats available to export.".into())];
    }
    let names = state.session.export_names();
    match export::write_export(
        &state.export_dir(),
        state.session.roster().players(),
        &names,
        format,
    ) {
        Ok(path) => vec![UiUpdate::Info(format!("Wrote {}", path.display()))],
        Err(e) => {
            warn!("Export failed: {}", e);
            vec![UiUpdate::Error(e.to_string())]
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
