// Game session: lineup, batter cursor, auto-advance and one-slot undo.
//
// A session owns the roster and is the only path through which fast-tap
// plays mutate it. Each call is a complete state transition; callers that
// share a session across tasks must serialize access (see `app::run`).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::play::{deltas_for, DeltaBundle, Mode, PlayError, PlayType};
use super::roster::{normalize_name, EntryError, MergeOutcome, Roster};
use crate::stats::PlayerRecord;

// ---------------------------------------------------------------------------
// Error / outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no lineup set")]
    NoLineup,

    #[error("'{name}' is not in the lineup")]
    NotInLineup { name: String },

    #[error("lineup entry #{position} is blank")]
    BlankLineupName { position: usize },
}

/// Result of an undo request. Only `Undone` changed any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    Undone {
        player_name: String,
        play: PlayType,
        mode: Mode,
    },
    /// The undo slot was empty.
    NothingToUndo,
    /// The recorded player is no longer in the roster; the slot was cleared.
    PlayerVanished { player_name: String },
}

impl UndoOutcome {
    pub fn report(&self) -> UndoReport {
        match self {
            UndoOutcome::Undone { player_name, play, .. } => UndoReport {
                success: true,
                message: format!("Undid last play ({play}) for {player_name}."),
            },
            UndoOutcome::NothingToUndo => UndoReport {
                success: false,
                message: "No play to undo.".to_string(),
            },
            UndoOutcome::PlayerVanished { player_name } => UndoReport {
                success: false,
                message: format!("'{player_name}' is no longer in the roster; nothing undone."),
            },
        }
    }
}

/// Caller-facing summary of an undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoReport {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The single undo slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlay {
    pub player_name: String,
    pub play: PlayType,
    pub mode: Mode,
    pub deltas: DeltaBundle,
    pub batter_index_before: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    NoLineup,
    Ready,
}

/// Start-up knobs for a session, normally read from config.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Names always offered as lineup candidates.
    pub default_players: Vec<String>,
    pub auto_advance: bool,
    /// Append manually entered players to the lineup (kept sorted).
    pub auto_add_to_lineup: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            default_players: vec!["Jnana".into(), "Nevan".into(), "Theo".into()],
            auto_advance: true,
            auto_add_to_lineup: true,
        }
    }
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub lineup: Vec<String>,
    pub current_batter: Option<String>,
    pub auto_advance: bool,
    pub players: Vec<PlayerRecord>,
    pub last_play: Option<LastPlay>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    roster: Roster,
    lineup: Vec<String>,
    current_batter_index: usize,
    auto_advance: bool,
    last_play: Option<LastPlay>,
    default_players: Vec<String>,
    auto_add_to_lineup: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new(SessionOptions::default())
    }
}

impl GameSession {
    pub fn new(options: SessionOptions) -> Self {
        GameSession {
            roster: Roster::new(),
            lineup: Vec::new(),
            current_batter_index: 0,
            auto_advance: options.auto_advance,
            last_play: None,
            default_players: options.default_players,
            auto_add_to_lineup: options.auto_add_to_lineup,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.lineup.is_empty() {
            SessionState::NoLineup
        } else {
            SessionState::Ready
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn lineup(&self) -> &[String] {
        &self.lineup
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.auto_advance = on;
    }

    pub fn last_play(&self) -> Option<&LastPlay> {
        self.last_play.as_ref()
    }

    /// Cursor position reduced modulo the lineup length. `None` without a
    /// lineup.
    pub fn batter_index(&self) -> Option<usize> {
        if self.lineup.is_empty() {
            None
        } else {
            Some(self.current_batter_index % self.lineup.len())
        }
    }

    pub fn current_batter(&self) -> Option<&str> {
        self.batter_index().map(|i| self.lineup[i].as_str())
    }

    /// Replace the lineup and reset the cursor to the first batter.
    ///
    /// Names are trimmed; a blank name rejects the whole lineup. Duplicates
    /// are kept.
    pub fn save_lineup(&mut self, names: Vec<String>) -> Result<(), SessionError> {
        let mut lineup = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(SessionError::BlankLineupName { position: i + 1 });
            }
            lineup.push(trimmed.to_string());
        }

        let mut seen: Vec<String> = Vec::new();
        for name in &lineup {
            let key = normalize_name(name);
            if seen.contains(&key) {
                warn!("Lineup contains '{}' more than once", name);
            } else {
                seen.push(key);
            }
        }

        info!("Lineup saved: {}", lineup.join(", "));
        self.lineup = lineup;
        self.current_batter_index = 0;
        Ok(())
    }

    /// Point the cursor at `name`. With duplicates the first match wins.
    pub fn select_batter(&mut self, name: &str) -> Result<usize, SessionError> {
        if self.lineup.is_empty() {
            return Err(SessionError::NoLineup);
        }
        let key = normalize_name(name);
        let idx = self
            .lineup
            .iter()
            .position(|n| n == name)
            .or_else(|| self.lineup.iter().position(|n| normalize_name(n) == key))
            .ok_or_else(|| SessionError::NotInLineup {
                name: name.trim().to_string(),
            })?;
        self.current_batter_index = idx;
        debug!("Batter selected: {} (#{})", self.lineup[idx], idx + 1);
        Ok(idx)
    }

    /// Record one fast-tap play for `player_name`.
    ///
    /// The player is created on first reference. Hitting plays advance the
    /// cursor when auto-advance is on and a lineup exists; pitching plays
    /// never move it. The play overwrites the undo slot.
    pub fn apply_play(
        &mut self,
        player_name: &str,
        play: PlayType,
        mode: Mode,
    ) -> Result<&PlayerRecord, PlayError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(PlayError::MissingPlayerName);
        }
        let deltas = match deltas_for(mode, play) {
            Ok(d) => d,
            Err(e) => {
                warn!("Rejected play for '{}': {}", name, e);
                return Err(e);
            }
        };

        let batter_index_before = self.current_batter_index;
        if mode == Mode::Hitting && self.auto_advance && !self.lineup.is_empty() {
            self.current_batter_index = (self.current_batter_index + 1) % self.lineup.len();
        }

        self.last_play = Some(LastPlay {
            player_name: name.to_string(),
            play,
            mode,
            deltas: deltas.clone(),
            batter_index_before,
        });

        let record = self.roster.get_or_insert(name);
        for (counter, amount) in deltas.iter() {
            record.add(counter, amount);
        }
        debug!("Recorded {} ({}) for '{}'", play, mode, record.name);

        Ok(&*record)
    }

    /// Record a play for whoever the cursor points at.
    pub fn apply_play_for_current(
        &mut self,
        play: PlayType,
        mode: Mode,
    ) -> Result<&PlayerRecord, PlayError> {
        let batter = self.current_batter().ok_or(PlayError::NoLineup)?.to_string();
        self.apply_play(&batter, play, mode)
    }

    /// Reverse the play in the undo slot, if any.
    ///
    /// The slot is always empty afterwards, so a second undo is a no-op.
    pub fn undo(&mut self) -> UndoOutcome {
        let Some(last) = self.last_play.take() else {
            warn!("Undo requested with no play recorded");
            return UndoOutcome::NothingToUndo;
        };

        let Some(record) = self.roster.find_by_name_mut(&last.player_name) else {
            warn!(
                "Undo target '{}' is no longer in the roster; clearing undo slot",
                last.player_name
            );
            return UndoOutcome::PlayerVanished {
                player_name: last.player_name,
            };
        };

        for (counter, amount) in last.deltas.iter() {
            record.subtract(counter, amount);
        }

        if last.mode == Mode::Hitting {
            self.current_batter_index = last.batter_index_before;
        }

        info!("Undid {} for '{}'", last.play, last.player_name);
        UndoOutcome::Undone {
            player_name: last.player_name,
            play: last.play,
            mode: last.mode,
        }
    }

    /// Validate and add-or-merge a manual stat entry.
    pub fn submit_entry(&mut self, entry: PlayerRecord) -> Result<MergeOutcome, EntryError> {
        let name = entry.name.trim().to_string();
        let outcome = self.roster.submit_entry(entry)?;

        if self.auto_add_to_lineup {
            let key = normalize_name(&name);
            if !self.lineup.iter().any(|n| normalize_name(n) == key) {
                self.lineup.push(name.clone());
                self.lineup.sort_by_key(|n| normalize_name(n));
                debug!("Added '{}' to lineup", name);
            }
        }

        Ok(outcome)
    }

    /// Swap in a whole roster (e.g. from an import). The lineup, cursor and
    /// undo slot are left as they are.
    pub fn replace_roster(&mut self, roster: Roster) {
        info!("Roster replaced ({} players)", roster.len());
        self.roster = roster;
    }

    /// Sorted, de-duplicated union of the default players and roster names.
    pub fn lineup_candidates(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .default_players
            .iter()
            .cloned()
            .chain(self.roster.names())
            .collect();
        names.sort_by_key(|n| normalize_name(n));
        names.dedup_by(|a, b| normalize_name(a) == normalize_name(b));
        names
    }

    /// Player names in roster order, for building export file names.
    pub fn export_names(&self) -> Vec<String> {
        self.roster.names()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            lineup: self.lineup.clone(),
            current_batter: self.current_batter().map(str::to_string),
            auto_advance: self.auto_advance,
            players: self.roster.players().to_vec(),
            last_play: self.last_play.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ready_session() -> GameSession {
        let mut session = GameSession::default();
        session.save_lineup(lineup(&["A", "B", "C"])).unwrap();
        session
    }

    #[test]
    fn new_session_has_no_lineup() {
        let session = GameSession::default();
        assert_eq!(session.state(), SessionState::NoLineup);
        assert_eq!(session.current_batter(), None);
        assert_eq!(session.batter_index(), None);
        assert!(session.auto_advance());
    }

    #[test]
    fn save_lineup_resets_cursor() {
        let mut session = ready_session();
        session.select_batter("C").unwrap();
        session.save_lineup(lineup(&["X", "Y"])).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.current_batter(), Some("X"));
    }

    #[test]
    fn save_empty_lineup_returns_to_no_lineup() {
        let mut session = ready_session();
        session.save_lineup(Vec::new()).unwrap();
        assert_eq!(session.state(), SessionState::NoLineup);
    }

    #[test]
    fn save_lineup_rejects_blank_names() {
        let mut session = ready_session();
        let err = session.save_lineup(lineup(&["X", "  "])).unwrap_err();
        assert_eq!(err, SessionError::BlankLineupName { position: 2 });
        // Unchanged on error
        assert_eq!(session.lineup(), &["A", "B", "C"]);
    }

    #[test]
    fn select_batter() {
        let mut session = ready_session();
        assert_eq!(session.select_batter("b"), Ok(1));
        assert_eq!(session.current_batter(), Some("B"));
        assert_eq!(
            session.select_batter("Z"),
            Err(SessionError::NotInLineup { name: "Z".into() })
        );
        assert_eq!(session.current_batter(), Some("B"));
    }

    #[test]
    fn select_batter_without_lineup() {
        let mut session = GameSession::default();
        assert_eq!(session.select_batter("A"), Err(SessionError::NoLineup));
    }

    #[test]
    fn select_batter_picks_first_duplicate() {
        let mut session = GameSession::default();
        session.save_lineup(lineup(&["A", "B", "A"])).unwrap();
        session.select_batter("B").unwrap();
        assert_eq!(session.select_batter("A"), Ok(0));
    }

    #[test]
    fn hitting_play_advances_pitching_does_not() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Single, Mode::Hitting).unwrap();
        assert_eq!(session.batter_index(), Some(1));

        let mut session = ready_session();
        session
            .apply_play("A", PlayType::PitchStrikeout, Mode::Pitching)
            .unwrap();
        assert_eq!(session.batter_index(), Some(0));
    }

    #[test]
    fn auto_advance_wraps_around() {
        let mut session = ready_session();
        session.select_batter("C").unwrap();
        session.apply_play("C", PlayType::Out, Mode::Hitting).unwrap();
        assert_eq!(session.current_batter(), Some("A"));
    }

    #[test]
    fn auto_advance_off_keeps_cursor() {
        let mut session = ready_session();
        session.set_auto_advance(false);
        session.apply_play("A", PlayType::Walk, Mode::Hitting).unwrap();
        assert_eq!(session.batter_index(), Some(0));
    }

    #[test]
    fn play_without_lineup_materializes_player() {
        let mut session = GameSession::default();
        let rec = session.apply_play("Theo", PlayType::Double, Mode::Hitting).unwrap();
        assert_eq!(rec.at_bats, 1);
        assert_eq!(rec.doubles, 1);
        assert_eq!(session.roster().len(), 1);
        assert_eq!(session.batter_index(), None);
    }

    #[test]
    fn repeated_play_accumulates() {
        let mut session = GameSession::default();
        session.apply_play("Theo", PlayType::Rbi, Mode::Hitting).unwrap();
        let rec = session.apply_play("theo", PlayType::Rbi, Mode::Hitting).unwrap();
        assert_eq!(rec.rbis, 2);
    }

    #[test]
    fn unknown_play_type_mutates_nothing() {
        let mut session = ready_session();
        let err = session
            .apply_play("A", PlayType::Single, Mode::Pitching)
            .unwrap_err();
        assert!(matches!(err, PlayError::UnknownPlayType { .. }));
        assert!(session.roster().is_empty());
        assert!(session.last_play().is_none());
        assert_eq!(session.batter_index(), Some(0));
    }

    #[test]
    fn blank_player_name_is_rejected() {
        let mut session = GameSession::default();
        assert_eq!(
            session.apply_play("  ", PlayType::Single, Mode::Hitting).unwrap_err(),
            PlayError::MissingPlayerName
        );
    }

    #[test]
    fn play_for_current_batter() {
        let mut session = ready_session();
        session
            .apply_play_for_current(PlayType::HomeRun, Mode::Hitting)
            .unwrap();
        assert_eq!(session.roster().find_by_name("A").unwrap().home_runs, 1);
        assert_eq!(session.current_batter(), Some("B"));

        let mut empty = GameSession::default();
        assert_eq!(
            empty
                .apply_play_for_current(PlayType::Single, Mode::Hitting)
                .unwrap_err(),
            PlayError::NoLineup
        );
    }

    #[test]
    fn undo_restores_counters_and_cursor() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Walk, Mode::Hitting).unwrap();
        let before = session.roster().find_by_name("A").unwrap().clone();
        let cursor_before = session.batter_index();

        session.apply_play("B", PlayType::Single, Mode::Hitting).unwrap();
        let outcome = session.undo();
        assert!(matches!(outcome, UndoOutcome::Undone { .. }));
        assert_eq!(session.roster().find_by_name("A").unwrap(), &before);
        assert_eq!(session.roster().find_by_name("B").unwrap().total(), 0);
        assert_eq!(session.batter_index(), cursor_before);
    }

    #[test]
    fn undo_pitching_play_leaves_cursor() {
        let mut session = ready_session();
        session
            .apply_play("A", PlayType::PitchInningComplete, Mode::Pitching)
            .unwrap();
        session.select_batter("C").unwrap();
        session.undo();
        assert_eq!(session.roster().find_by_name("A").unwrap().pitch_outs, 0);
        assert_eq!(session.current_batter(), Some("C"));
    }

    #[test]
    fn double_undo_is_a_noop() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Triple, Mode::Hitting).unwrap();
        assert!(session.undo().report().success);

        let second = session.undo();
        assert_eq!(second, UndoOutcome::NothingToUndo);
        let report = second.report();
        assert!(!report.success);
        assert_eq!(report.message, "No play to undo.");
        assert_eq!(session.roster().find_by_name("A").unwrap().total(), 0);
        assert_eq!(session.batter_index(), Some(0));
    }

    #[test]
    fn only_the_latest_play_is_undoable() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Single, Mode::Hitting).unwrap();
        session.apply_play("B", PlayType::Double, Mode::Hitting).unwrap();
        session.undo();
        session.undo();
        // A's single survives
        assert_eq!(session.roster().find_by_name("A").unwrap().singles, 1);
        assert_eq!(session.roster().find_by_name("B").unwrap().doubles, 0);
    }

    #[test]
    fn undo_after_player_vanished_clears_slot() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Single, Mode::Hitting).unwrap();
        session.replace_roster(Roster::new());

        let outcome = session.undo();
        assert_eq!(
            outcome,
            UndoOutcome::PlayerVanished {
                player_name: "A".into()
            }
        );
        assert!(session.last_play().is_none());
        assert_eq!(session.undo(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn undo_after_manual_edit_never_goes_negative() {
        let mut session = GameSession::default();
        session.apply_play("A", PlayType::Single, Mode::Hitting).unwrap();
        let mut replacement = Roster::new();
        replacement.add_or_merge(PlayerRecord {
            at_bats: 0,
            singles: 0,
            walks: 1,
            ..PlayerRecord::new("A")
        });
        session.replace_roster(replacement);

        session.undo();
        let a = session.roster().find_by_name("A").unwrap();
        assert_eq!(a.at_bats, 0);
        assert_eq!(a.singles, 0);
        assert_eq!(a.walks, 1);
    }

    #[test]
    fn submit_entry_adds_to_lineup_sorted() {
        let mut session = GameSession::default();
        session.save_lineup(lineup(&["Nevan", "Theo"])).unwrap();
        let entry = PlayerRecord {
            at_bats: 2,
            singles: 1,
            ..PlayerRecord::new("Jnana")
        };
        assert_eq!(session.submit_entry(entry), Ok(MergeOutcome::Added));
        assert_eq!(session.lineup(), &["Jnana", "Nevan", "Theo"]);

        let again = PlayerRecord {
            at_bats: 1,
            ..PlayerRecord::new("jnana")
        };
        assert_eq!(session.submit_entry(again), Ok(MergeOutcome::Merged));
        assert_eq!(session.lineup().len(), 3);
    }

    #[test]
    fn submit_entry_respects_auto_add_option() {
        let mut session = GameSession::new(SessionOptions {
            auto_add_to_lineup: false,
            ..SessionOptions::default()
        });
        let entry = PlayerRecord {
            at_bats: 1,
            ..PlayerRecord::new("Jnana")
        };
        session.submit_entry(entry).unwrap();
        assert!(session.lineup().is_empty());
    }

    #[test]
    fn lineup_candidates_merge_defaults_and_roster() {
        let mut session = GameSession::default();
        session.apply_play("alex", PlayType::Walk, Mode::Hitting).unwrap();
        session.apply_play("theo", PlayType::Walk, Mode::Hitting).unwrap();
        assert_eq!(
            session.lineup_candidates(),
            vec!["alex", "Jnana", "Nevan", "Theo"]
        );
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = ready_session();
        session.apply_play("A", PlayType::Single, Mode::Hitting).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.state, SessionState::Ready);
        assert_eq!(snap.current_batter.as_deref(), Some("B"));
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.last_play.unwrap().batter_index_before, 0);
    }
}
