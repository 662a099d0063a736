// Messages exchanged between the console front end and the app loop.

use std::path::PathBuf;

use crate::export::ExportFormat;
use crate::game::session::SessionSnapshot;
use crate::game::{Mode, PlayType};
use crate::stats::PlayerRecord;

/// Commands sent from the front end to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SaveLineup(Vec<String>),
    SelectBatter(String),
    /// Switch the fast-tap mode used by `Play`.
    SetMode(Mode),
    SetAutoAdvance(bool),
    /// Record a play for the current batter in the current mode.
    Play(PlayType),
    /// Record a play for a named player.
    PlayFor {
        player: String,
        play: PlayType,
        mode: Mode,
    },
    Undo,
    /// Manual add/merge of a full stat line.
    ManualEntry(PlayerRecord),
    ShowSummary,
    Export(ExportFormat),
    ImportRoster(PathBuf),
    ListCandidates,
    Quit,
}

/// Updates pushed from the app loop to the front end.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Info(String),
    /// Soft failure: nothing changed, nothing broke (e.g. empty undo).
    Warning(String),
    Error(String),
    /// Pre-rendered summary table.
    Summary(String),
    Snapshot {
        snapshot: Box<SessionSnapshot>,
        mode: Mode,
    },
}
