// Play types and the table that turns a play into counter deltas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::Counter;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("unknown play type `{play}` for {mode} mode")]
    UnknownPlayType { mode: Mode, play: String },

    #[error("a player name is required to record a play")]
    MissingPlayerName,

    #[error("no lineup set; save a lineup before recording plays for the current batter")]
    NoLineup,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Whether a play is scored against the player's hitting or pitching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Hitting,
    Pitching,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Hitting => "hitting",
            Mode::Pitching => "pitching",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hitting" | "h" => Ok(Mode::Hitting),
            "pitching" | "p" => Ok(Mode::Pitching),
            other => Err(format!("unknown mode `{other}` (expected hitting or pitching)")),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayType
// ---------------------------------------------------------------------------

/// A single fast-tap play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayType {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    Strikeout,
    Rbi,
    StolenBase,
    Out,
    PitchStrikeout,
    PitchWalk,
    PitchHitAllowed,
    PitchEarnedRun,
    PitchOut,
    PitchInningComplete,
}

impl PlayType {
    pub const HITTING: [PlayType; 9] = [
        PlayType::Single,
        PlayType::Double,
        PlayType::Triple,
        PlayType::HomeRun,
        PlayType::Walk,
        PlayType::Strikeout,
        PlayType::Rbi,
        PlayType::StolenBase,
        PlayType::Out,
    ];

    pub const PITCHING: [PlayType; 6] = [
        PlayType::PitchStrikeout,
        PlayType::PitchWalk,
        PlayType::PitchHitAllowed,
        PlayType::PitchEarnedRun,
        PlayType::PitchOut,
        PlayType::PitchInningComplete,
    ];

    /// Button label for this play, e.g. "Home Run" or "Pitch Walk".
    pub fn label(&self) -> &'static str {
        match self {
            PlayType::Single => "Single",
            PlayType::Double => "Double",
            PlayType::Triple => "Triple",
            PlayType::HomeRun => "Home Run",
            PlayType::Walk => "Walk",
            PlayType::Strikeout => "Strikeout",
            PlayType::Rbi => "RBI",
            PlayType::StolenBase => "Stolen Base",
            PlayType::Out => "Out",
            PlayType::PitchStrikeout => "Pitch Strikeout",
            PlayType::PitchWalk => "Pitch Walk",
            PlayType::PitchHitAllowed => "Pitch Hit Allowed",
            PlayType::PitchEarnedRun => "Pitch Earned Run",
            PlayType::PitchOut => "Pitch Out",
            PlayType::PitchInningComplete => "Pitch Inning Complete",
        }
    }

    /// The only mode this play is valid in.
    pub fn mode(&self) -> Mode {
        if PlayType::PITCHING.contains(self) {
            Mode::Pitching
        } else {
            Mode::Hitting
        }
    }

    /// Parse a play label. Case and inner whitespace are ignored, so
    /// "home run", "HomeRun" and "HOME  RUN" all match.
    pub fn from_label(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        PlayType::HITTING
            .iter()
            .chain(PlayType::PITCHING.iter())
            .copied()
            .find(|p| p.label().replace(' ', "").to_lowercase() == key)
    }

    /// Parse a label, reporting failures as `UnknownPlayType` for `mode`.
    pub fn parse_for(mode: Mode, s: &str) -> Result<Self, PlayError> {
        PlayType::from_label(s).ok_or_else(|| PlayError::UnknownPlayType {
            mode,
            play: s.trim().to_string(),
        })
    }
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Play rules
// ---------------------------------------------------------------------------

/// The counter deltas one play produces. All amounts are positive; undo
/// subtracts the same amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaBundle {
    deltas: Vec<(Counter, u32)>,
}

impl DeltaBundle {
    fn of(deltas: &[(Counter, u32)]) -> Self {
        DeltaBundle {
            deltas: deltas.to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Counter, u32)> + '_ {
        self.deltas.iter().copied()
    }
}

/// Look up the deltas for `play` scored in `mode`.
///
/// A play outside the table for the mode (e.g. a hitting `Single` in
/// pitching mode) is rejected before anything is mutated.
pub fn deltas_for(mode: Mode, play: PlayType) -> Result<DeltaBundle, PlayError> {
    use Counter::*;

    let bundle = match (mode, play) {
        (Mode::Hitting, PlayType::Single) => DeltaBundle::of(&[(AtBats, 1), (Singles, 1)]),
        (Mode::Hitting, PlayType::Double) => DeltaBundle::of(&[(AtBats, 1), (Doubles, 1)]),
        (Mode::Hitting, PlayType::Triple) => DeltaBundle::of(&[(AtBats, 1), (Triples, 1)]),
        (Mode::Hitting, PlayType::HomeRun) => DeltaBundle::of(&[(AtBats, 1), (HomeRuns, 1)]),
        (Mode::Hitting, PlayType::Walk) => DeltaBundle::of(&[(Walks, 1)]),
        (Mode::Hitting, PlayType::Strikeout) => DeltaBundle::of(&[(AtBats, 1), (Strikeouts, 1)]),
        (Mode::Hitting, PlayType::Rbi) => DeltaBundle::of(&[(Rbis, 1)]),
        (Mode::Hitting, PlayType::StolenBase) => DeltaBundle::of(&[(StolenBases, 1)]),
        (Mode::Hitting, PlayType::Out) => DeltaBundle::of(&[(AtBats, 1)]),
        (Mode::Pitching, PlayType::PitchStrikeout) => {
            DeltaBundle::of(&[(PitchOuts, 1), (StrikeoutsPitched, 1)])
        }
        (Mode::Pitching, PlayType::PitchWalk) => DeltaBundle::of(&[(WalksAllowed, 1)]),
        (Mode::Pitching, PlayType::PitchHitAllowed) => DeltaBundle::of(&[(HitsAllowed, 1)]),
        (Mode::Pitching, PlayType::PitchEarnedRun) => DeltaBundle::of(&[(EarnedRuns, 1)]),
        (Mode::Pitching, PlayType::PitchOut) => DeltaBundle::of(&[(PitchOuts, 1)]),
        (Mode::Pitching, PlayType::PitchInningComplete) => DeltaBundle::of(&[(PitchOuts, 3)]),
        (mode, play) => {
            return Err(PlayError::UnknownPlayType {
                mode,
                play: play.label().to_string(),
            })
        }
    };

    Ok(bundle)
}
