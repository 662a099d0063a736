// Per-player counter bag and the derived-stat view over it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::formulas;

/// Every raw counter a player record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Counter {
    // Hitting
    AtBats,
    Singles,
    Doubles,
    Triples,
    HomeRuns,
    StolenBases,
    Rbis,
    Walks,
    Strikeouts,
    // Pitching
    PitchOuts,
    EarnedRuns,
    StrikeoutsPitched,
    WalksAllowed,
    HitsAllowed,
}

impl Counter {
    /// All counters in export order.
    pub const ALL: [Counter; 14] = [
        Counter::AtBats,
        Counter::Singles,
        Counter::Doubles,
        Counter::Triples,
        Counter::HomeRuns,
        Counter::StolenBases,
        Counter::Rbis,
        Counter::Walks,
        Counter::Strikeouts,
        Counter::PitchOuts,
        Counter::EarnedRuns,
        Counter::StrikeoutsPitched,
        Counter::WalksAllowed,
        Counter::HitsAllowed,
    ];

    /// MLB-style abbreviation used in exports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Counter::AtBats => "AB",
            Counter::Singles => "1B",
            Counter::Doubles => "2B",
            Counter::Triples => "3B",
            Counter::HomeRuns => "HR",
            Counter::StolenBases => "SB",
            Counter::Rbis => "RBI",
            Counter::Walks => "BB",
            Counter::Strikeouts => "K",
            Counter::PitchOuts => "Outs(P)",
            Counter::EarnedRuns => "ER(P)",
            Counter::StrikeoutsPitched => "K(P)",
            Counter::WalksAllowed => "BB(P)",
            Counter::HitsAllowed => "H(P)",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A player's accumulated box-score counters.
///
/// The same struct doubles as the full counter bundle submitted by manual
/// stat entry; see `Roster::add_or_merge`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub at_bats: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub stolen_bases: u32,
    pub rbis: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub pitch_outs: u32,
    pub earned_runs: u32,
    pub strikeouts_pitched: u32,
    pub walks_allowed: u32,
    pub hits_allowed: u32,
}

impl PlayerRecord {
    /// A fresh record with every counter at zero.
    pub fn new(name: impl Into<String>) -> Self {
        PlayerRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, counter: Counter) -> u32 {
        match counter {
            Counter::AtBats => self.at_bats,
            Counter::Singles => self.singles,
            Counter::Doubles => self.doubles,
            Counter::Triples => self.triples,
            Counter::HomeRuns => self.home_runs,
            Counter::StolenBases => self.stolen_bases,
            Counter::Rbis => self.rbis,
            Counter::Walks => self.walks,
            Counter::Strikeouts => self.strikeouts,
            Counter::PitchOuts => self.pitch_outs,
            Counter::EarnedRuns => self.earned_runs,
            Counter::StrikeoutsPitched => self.strikeouts_pitched,
            Counter::WalksAllowed => self.walks_allowed,
            Counter::HitsAllowed => self.hits_allowed,
        }
    }

    fn slot_mut(&mut self, counter: Counter) -> &mut u32 {
        match counter {
            Counter::AtBats => &mut self.at_bats,
            Counter::Singles => &mut self.singles,
            Counter::Doubles => &mut self.doubles,
            Counter::Triples => &mut self.triples,
            Counter::HomeRuns => &mut self.home_runs,
            Counter::StolenBases => &mut self.stolen_bases,
            Counter::Rbis => &mut self.rbis,
            Counter::Walks => &mut self.walks,
            Counter::Strikeouts => &mut self.strikeouts,
            Counter::PitchOuts => &mut self.pitch_outs,
            Counter::EarnedRuns => &mut self.earned_runs,
            Counter::StrikeoutsPitched => &mut self.strikeouts_pitched,
            Counter::WalksAllowed => &mut self.walks_allowed,
            Counter::HitsAllowed => &mut self.hits_allowed,
        }
    }

    /// Add `amount` onto a single counter. This is the primitive shared by
    /// fast-tap plays and manual merges.
    pub fn add(&mut self, counter: Counter, amount: u32) {
        let slot = self.slot_mut(counter);
        *slot = slot.saturating_add(amount);
    }

    /// Subtract `amount` from a counter, clamping at zero.
    ///
    /// Returns `false` when the counter held less than `amount` and had to
    /// be clamped.
    pub fn subtract(&mut self, counter: Counter, amount: u32) -> bool {
        let name = self.name.clone();
        let slot = self.slot_mut(counter);
        if *slot < amount {
            warn!(
                "Clamping {} for '{}' at 0 (had {}, subtracting {})",
                counter, name, *slot, amount
            );
            *slot = 0;
            return false;
        }
        *slot -= amount;
        true
    }

    /// Add every counter of `other` onto this record, field by field.
    /// The name is left untouched.
    pub fn merge_counters(&mut self, other: &PlayerRecord) {
        for counter in Counter::ALL {
            self.add(counter, other.get(counter));
        }
    }

    pub fn hits(&self) -> u64 {
        formulas::hits(self.singles, self.doubles, self.triples, self.home_runs)
    }

    /// Sum of every counter; zero means an empty stat line.
    pub fn total(&self) -> u64 {
        Counter::ALL.iter().map(|&c| u64::from(self.get(c))).sum()
    }

    /// Compute the derived rate stats for this record.
    pub fn derived(&self) -> DerivedStats {
        DerivedStats::from_record(self)
    }
}

// ---------------------------------------------------------------------------
// Schema migration
// ---------------------------------------------------------------------------

/// A player record as supplied from outside the engine, where any counter
/// may be missing (e.g. records written before pitching counters existed).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialRecord {
    pub name: String,
    pub at_bats: Option<u32>,
    pub singles: Option<u32>,
    pub doubles: Option<u32>,
    pub triples: Option<u32>,
    pub home_runs: Option<u32>,
    pub stolen_bases: Option<u32>,
    pub rbis: Option<u32>,
    pub walks: Option<u32>,
    pub strikeouts: Option<u32>,
    pub pitch_outs: Option<u32>,
    pub earned_runs: Option<u32>,
    pub strikeouts_pitched: Option<u32>,
    pub walks_allowed: Option<u32>,
    pub hits_allowed: Option<u32>,
}

/// Backfill every absent counter with 0 and produce a complete record.
pub fn ensure_fields(partial: PartialRecord) -> PlayerRecord {
    let fields = [
        partial.at_bats,
        partial.singles,
        partial.doubles,
        partial.triples,
        partial.home_runs,
        partial.stolen_bases,
        partial.rbis,
        partial.walks,
        partial.strikeouts,
        partial.pitch_outs,
        partial.earned_runs,
        partial.strikeouts_pitched,
        partial.walks_allowed,
        partial.hits_allowed,
    ];
    let missing = fields.iter().filter(|f| f.is_none()).count();
    if missing > 0 {
        debug!("Backfilled {} missing counters for '{}'", missing, partial.name);
    }

    PlayerRecord {
        name: partial.name,
        at_bats: partial.at_bats.unwrap_or(0),
        singles: partial.singles.unwrap_or(0),
        doubles: partial.doubles.unwrap_or(0),
        triples: partial.triples.unwrap_or(0),
        home_runs: partial.home_runs.unwrap_or(0),
        stolen_bases: partial.stolen_bases.unwrap_or(0),
        rbis: partial.rbis.unwrap_or(0),
        walks: partial.walks.unwrap_or(0),
        strikeouts: partial.strikeouts.unwrap_or(0),
        pitch_outs: partial.pitch_outs.unwrap_or(0),
        earned_runs: partial.earned_runs.unwrap_or(0),
        strikeouts_pitched: partial.strikeouts_pitched.unwrap_or(0),
        walks_allowed: partial.walks_allowed.unwrap_or(0),
        hits_allowed: partial.hits_allowed.unwrap_or(0),
    }
}

// ---------------------------------------------------------------------------
// Derived stats
// ---------------------------------------------------------------------------

/// Rate stats computed on demand from a record. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedStats {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub ip: f64,
    pub era: f64,
    pub whip: f64,
}

/// Display strings for `DerivedStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStats {
    pub avg: String,
    pub obp: String,
    pub slg: String,
    pub ops: String,
    pub ip: String,
    pub era: String,
    pub whip: String,
}

impl DerivedStats {
    pub fn from_record(r: &PlayerRecord) -> Self {
        let avg = formulas::batting_average(r.singles, r.doubles, r.triples, r.home_runs, r.at_bats);
        let obp = formulas::on_base_percentage(
            r.singles,
            r.doubles,
            r.triples,
            r.home_runs,
            r.walks,
            r.at_bats,
        );
        let slg =
            formulas::slugging_percentage(r.singles, r.doubles, r.triples, r.home_runs, r.at_bats);

        DerivedStats {
            avg,
            obp,
            slg,
            ops: formulas::on_base_plus_slugging(obp, slg),
            ip: formulas::innings_pitched(r.pitch_outs),
            era: formulas::earned_run_average(r.earned_runs, r.pitch_outs),
            whip: formulas::walks_plus_hits_per_inning(r.walks_allowed, r.hits_allowed, r.pitch_outs),
        }
    }

    pub fn formatted(&self) -> FormattedStats {
        FormattedStats {
            avg: formulas::format_three_decimal_rate(self.avg),
            obp: formulas::format_three_decimal_rate(self.obp),
            slg: formulas::format_three_decimal_rate(self.slg),
            ops: formulas::format_three_decimal_rate(self.ops),
            ip: formulas::format_innings(self.ip),
            era: formulas::format_rate(self.era),
            whip: formulas::format_rate(self.whip),
        }
    }
}
