// Console line parsing.
//
// Translates one typed line into either a UserCommand for the app loop or a
// local action (help text) that the console answers itself.

use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportFormat;
use crate::game::{Mode, PlayType};
use crate::protocol::UserCommand;
use crate::stats::{Counter, PlayerRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}` (type `help` for a list)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    InvalidMode(String),

    #[error("unknown stat key `{0}` (expected one of: ab 1b 2b 3b hr sb rbi bb k outs er pk pbb ph)")]
    UnknownStatKey(String),

    #[error("invalid count `{value}` for `{key}`")]
    InvalidCount { key: String, value: String },

    #[error("unknown play `{0}`")]
    UnknownPlay(String),
}

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Command(UserCommand),
    Help,
    Formulas,
}

/// Parse a console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<InputAction>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_lowercase().as_str() {
        "help" | "?" => {
            return Ok(Some(if rest.eq_ignore_ascii_case("formulas") {
                InputAction::Formulas
            } else {
                InputAction::Help
            }));
        }
        "quit" | "exit" | "q" => UserCommand::Quit,
        "undo" | "u" => UserCommand::Undo,
        "show" => UserCommand::ShowSummary,
        "candidates" => UserCommand::ListCandidates,
        "lineup" => UserCommand::SaveLineup(split_names(rest)),
        "batter" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("batter <name>"));
            }
            UserCommand::SelectBatter(rest.to_string())
        }
        "mode" => UserCommand::SetMode(rest.parse::<Mode>().map_err(ParseError::InvalidMode)?),
        "auto" => match rest.to_lowercase().as_str() {
            "on" => UserCommand::SetAutoAdvance(true),
            "off" => UserCommand::SetAutoAdvance(false),
            _ => return Err(ParseError::Usage("auto on|off")),
        },
        "export" => {
            let format = if rest.is_empty() {
                ExportFormat::Txt
            } else {
                rest.parse::<ExportFormat>()
                    .map_err(|_| ParseError::Usage("export txt|csv"))?
            };
            UserCommand::Export(format)
        }
        "import" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("import <path>"));
            }
            UserCommand::ImportRoster(PathBuf::from(rest))
        }
        "play" => parse_play_for(rest)?,
        "add" => UserCommand::ManualEntry(parse_entry(rest)?),
        _ => match PlayType::from_label(line) {
            Some(play) => UserCommand::Play(play),
            None => return Err(ParseError::UnknownCommand(line.to_string())),
        },
    };

    Ok(Some(InputAction::Command(cmd)))
}

fn split_names(s: &str) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',').map(|n| n.trim().to_string()).collect()
}

/// `<name>: <play label>`. The mode follows the play.
fn parse_play_for(rest: &str) -> Result<UserCommand, ParseError> {
    let (player, label) = rest
        .split_once(':')
        .ok_or(ParseError::Usage("play <name>: <play label>"))?;
    let play = PlayType::from_label(label)
        .ok_or_else(|| ParseError::UnknownPlay(label.trim().to_string()))?;
    Ok(UserCommand::PlayFor {
        player: player.trim().to_string(),
        play,
        mode: play.mode(),
    })
}

/// `<name> key=n key=n ...`. The name is every token before the first
/// `key=value` pair, so names may contain spaces.
fn parse_entry(rest: &str) -> Result<PlayerRecord, ParseError> {
    let mut name_parts = Vec::new();
    let mut pairs = Vec::new();
    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some((k, v)) => pairs.push((k, v)),
            None if pairs.is_empty() => name_parts.push(token),
            None => return Err(ParseError::Usage("add <name> ab=3 1b=1 ...")),
        }
    }

    let mut record = PlayerRecord::new(name_parts.join(" "));
    for (key, value) in pairs {
        let counter = stat_key(key).ok_or_else(|| ParseError::UnknownStatKey(key.to_string()))?;
        let amount: u32 = value.parse().map_err(|_| ParseError::InvalidCount {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        record.add(counter, amount);
    }
    Ok(record)
}

fn stat_key(key: &str) -> Option<Counter> {
    let counter = match key.to_lowercase().as_str() {
        "ab" => Counter::AtBats,
        "1b" => Counter::Singles,
        "2b" => Counter::Doubles,
        "3b" => Counter::Triples,
        "hr" => Counter::HomeRuns,
        "sb" => Counter::StolenBases,
        "rbi" => Counter::Rbis,
        "bb" => Counter::Walks,
        "k" => Counter::Strikeouts,
        "outs" => Counter::PitchOuts,
        "er" => Counter::EarnedRuns,
        "pk" => Counter::StrikeoutsPitched,
        "pbb" => Counter::WalksAllowed,
        "ph" => Counter::HitsAllowed,
        _ => return None,
    };
    Some(counter)
}

pub const HELP_TEXT: &str = "\
Commands:
  lineup <name>, <name>, ...   save batting order (empty clears it)
  batter <name>                select the current batter
  mode hitting|pitching        switch fast-tap mode
  auto on|off                  toggle auto-advance after hitting plays
  <play>                       record a play for the current batter
  play <name>: <play>          record a play for a named player
  undo                         undo the last play
  add <name> ab=3 1b=1 ...     add or merge a stat line
                               keys: ab 1b 2b 3b hr sb rbi bb k outs er pk pbb ph
  show                         summary table
  export [txt|csv]             write the summary to the export directory
  import <path>                load a roster from JSON
  candidates                   list lineup candidates
  help [formulas]              this text, or the stat formulas
  quit                         exit

Hitting plays:  Single, Double, Triple, Home Run, Walk, Strikeout, RBI, Stolen Base, Out
Pitching plays: Pitch Strikeout, Pitch Walk, Pitch Hit Allowed, Pitch Earned Run,
                Pitch Out, Pitch Inning Complete
";

pub const FORMULAS_TEXT: &str = "\
AVG  = H / AB                       H = 1B + 2B + 3B + HR
OBP  = H / (AB + BB)
SLG  = (1B + 2*2B + 3*3B + 4*HR) / AB
OPS  = OBP + SLG
IP   = Outs / 3
ERA  = ER * 9 / IP
WHIP = (BB(P) + H(P)) / IP
Any rate with a zero denominator is 0.
";
