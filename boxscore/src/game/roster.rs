// Player records keyed by normalized name, with add-or-merge semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::stats::record::{ensure_fields, PartialRecord, PlayerRecord};

/// Manual stat entry rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("please select a player or enter a new player name")]
    MissingName,

    #[error("too many hits for at bats: {hits} hits in {at_bats} AB")]
    TooManyHits { hits: u64, at_bats: u32 },

    #[error("please enter stats for new player '{name}'")]
    EmptyNewPlayer { name: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read roster file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("roster record #{index} has no name")]
    MissingName { index: usize },
}

/// Whether `add_or_merge` created a record or summed into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    Added,
    Merged,
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Added => f.write_str("added"),
            MergeOutcome::Merged => f.write_str("merged"),
        }
    }
}

/// Key used for name comparison: trimmed and case-folded.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// All player records of a session, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<PlayerRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter()
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    /// Player names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.players.iter().position(|p| normalize_name(&p.name) == key)
    }

    /// Look up a player by name, ignoring case and surrounding whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        self.position(name).map(|i| &self.players[i])
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut PlayerRecord> {
        self.position(name).map(move |i| &mut self.players[i])
    }

    /// Fetch a player, creating an all-zero record on first reference.
    pub fn get_or_insert(&mut self, name: &str) -> &mut PlayerRecord {
        let idx = match self.position(name) {
            Some(i) => i,
            None => {
                debug!("Materializing new player record for '{}'", name.trim());
                self.players.push(PlayerRecord::new(name.trim()));
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }

    /// Sum `entry` into the matching record, or insert it as a new one.
    ///
    /// Existing counters are never overwritten, only added to.
    pub fn add_or_merge(&mut self, entry: PlayerRecord) -> MergeOutcome {
        match self.find_by_name_mut(&entry.name) {
            Some(existing) => {
                existing.merge_counters(&entry);
                info!("Merged stats into '{}'", existing.name);
                MergeOutcome::Merged
            }
            None => {
                let mut entry = entry;
                entry.name = entry.name.trim().to_string();
                info!("Added new player '{}'", entry.name);
                self.players.push(entry);
                MergeOutcome::Added
            }
        }
    }

    /// Check a manual stat entry against the current roster.
    ///
    /// Rules: a name is required; hits may not exceed at-bats within the
    /// submitted block; a new player needs at least one non-zero counter.
    pub fn validate_entry(&self, entry: &PlayerRecord) -> Result<(), EntryError> {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(EntryError::MissingName);
        }

        if self.find_by_name(name).is_none() && entry.total() == 0 {
            return Err(EntryError::EmptyNewPlayer {
                name: name.to_string(),
            });
        }

        let hits = entry.hits();
        if hits > u64::from(entry.at_bats) {
            return Err(EntryError::TooManyHits {
                hits,
                at_bats: entry.at_bats,
            });
        }

        Ok(())
    }

    /// Validate then add-or-merge a manual stat entry.
    pub fn submit_entry(&mut self, entry: PlayerRecord) -> Result<MergeOutcome, EntryError> {
        self.validate_entry(&entry)?;
        Ok(self.add_or_merge(entry))
    }

    /// Build a roster from a JSON array of possibly partial records.
    ///
    /// Missing counters are backfilled with 0. Records whose names collide
    /// after normalization are merged.
    pub fn from_json(json: &str) -> Result<Roster, ImportError> {
        let partials: Vec<PartialRecord> = serde_json::from_str(json)?;
        let mut roster = Roster::new();
        for (index, partial) in partials.into_iter().enumerate() {
            if partial.name.trim().is_empty() {
                return Err(ImportError::MissingName { index });
            }
            roster.add_or_merge(ensure_fields(partial));
        }
        Ok(roster)
    }

    /// Read a roster JSON file from disk.
    pub fn load(path: &std::path::Path) -> Result<Roster, ImportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Roster::from_json(&text)
    }
}
