// Export of the roster as a text log, a fixed-width summary table and CSV.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::stats::PlayerRecord;

/// Column headers shared by the summary table and the CSV export.
pub const SUMMARY_HEADERS: [&str; 21] = [
    "Player", "AB", "1B", "2B", "3B", "HR", "SB", "RBI", "BB", "K", "AVG", "OBP", "SLG", "OPS",
    "IP", "ER", "K(P)", "BB(P)", "H(P)", "ERA", "WHIP",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format `{other}` (expected txt or csv)")),
        }
    }
}

/// One summary row, in `SUMMARY_HEADERS` order.
pub fn summary_row(p: &PlayerRecord) -> [String; 21] {
    let d = p.derived().formatted();
    [
        p.name.clone(),
        p.at_bats.to_string(),
        p.singles.to_string(),
        p.doubles.to_string(),
        p.triples.to_string(),
        p.home_runs.to_string(),
        p.stolen_bases.to_string(),
        p.rbis.to_string(),
        p.walks.to_string(),
        p.strikeouts.to_string(),
        d.avg,
        d.obp,
        d.slg,
        d.ops,
        d.ip,
        p.earned_runs.to_string(),
        p.strikeouts_pitched.to_string(),
        p.walks_allowed.to_string(),
        p.hits_allowed.to_string(),
        d.era,
        d.whip,
    ]
}

/// Fixed-width, pipe-delimited table. Each column is as wide as its widest
/// cell (header included) and cells are left-justified.
pub fn format_summary_table(players: &[PlayerRecord]) -> String {
    let header: Vec<String> = SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = players.iter().map(|p| summary_row(p).to_vec()).collect();

    let widths: Vec<usize> = (0..SUMMARY_HEADERS.len())
        .map(|col| {
            std::iter::once(&header)
                .chain(rows.iter())
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let fmt_row = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(fmt_row(&header));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(fmt_row(row));
    }
    lines.join("\n")
}

/// Line-oriented dump of every player's raw counters and derived stats,
/// followed by the summary table.
pub fn build_export_text(players: &[PlayerRecord]) -> String {
    let mut lines: Vec<String> = vec!["Baseball Stats Log\n".to_string()];

    for p in players {
        let d = p.derived().formatted();
        lines.push(format!("Player: {}", p.name));
        lines.push(format!("AB: {}", p.at_bats));
        lines.push(format!("1B: {}", p.singles));
        lines.push(format!("2B: {}", p.doubles));
        lines.push(format!("3B: {}", p.triples));
        lines.push(format!("HR: {}", p.home_runs));
        lines.push(format!("SB: {}", p.stolen_bases));
        lines.push(format!("RBI: {}", p.rbis));
        lines.push(format!("BB: {}", p.walks));
        lines.push(format!("K: {}", p.strikeouts));
        lines.push(format!("AVG: {}", d.avg));
        lines.push(format!("OBP: {}", d.obp));
        lines.push(format!("SLG: {}", d.slg));
        lines.push(format!("OPS: {}", d.ops));
        lines.push(format!("IP: {}", d.ip));
        lines.push(format!("ER(P): {}", p.earned_runs));
        lines.push(format!("K(P): {}", p.strikeouts_pitched));
        lines.push(format!("BB(P): {}", p.walks_allowed));
        lines.push(format!("H(P): {}", p.hits_allowed));
        lines.push(format!("ERA: {}", d.era));
        lines.push(format!("WHIP: {}\n", d.whip));
    }

    lines.push("Summary Table:\n".to_string());
    lines.push(format_summary_table(players));
    lines.join("\n")
}

/// CSV with a header row and one row per player.
pub fn build_export_csv(players: &[PlayerRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADERS)?;
    for p in players {
        writer.write_record(summary_row(p))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Longest name part kept in an export filename, in bytes.
const MAX_NAME_PART: usize = 120;

/// Keep alphanumerics and `-`; everything else (spaces, separators, dots)
/// becomes `_`.
fn filename_segment(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// `{names}_stats_{random}_{MM-DD-YY}.{ext}`. Each name is reduced to a
/// single path-safe segment and the joined names are capped at
/// `MAX_NAME_PART` bytes. An empty roster yields `no_players`.
pub fn export_filename(names: &[String], random: u32, date: NaiveDate, format: ExportFormat) -> String {
    let mut name_part = names
        .iter()
        .map(|n| filename_segment(n))
        .filter(|s| s.chars().any(|c| c != '_'))
        .collect::<Vec<_>>()
        .join("_");
    if name_part.len() > MAX_NAME_PART {
        let mut cut = MAX_NAME_PART;
        while !name_part.is_char_boundary(cut) {
            cut -= 1;
        }
        name_part.truncate(cut);
    }
    if name_part.is_empty() {
        name_part = "no_players".to_string();
    }
    format!(
        "{}_stats_{}_{}.{}",
        name_part,
        random,
        date.format("%m-%d-%y"),
        format.extension()
    )
}

/// `export_filename` with a random suffix in 1..=1_000_000 and today's date.
pub fn suggest_filename(names: &[String], format: ExportFormat) -> String {
    let random = rand::thread_rng().gen_range(1..=1_000_000);
    let today = chrono::Local::now().date_naive();
    export_filename(names, random, today, format)
}

/// Render `players` in `format` and write it into `dir`. Returns the path
/// of the written file.
pub fn write_export(
    dir: &Path,
    players: &[PlayerRecord],
    names: &[String],
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let body = match format {
        ExportFormat::Txt => build_export_text(players),
        ExportFormat::Csv => build_export_csv(players)?,
    };

    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let path = dir.join(suggest_filename(names, format));
    std::fs::write(&path, body).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;

    info!("Exported {} players to {}", players.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PlayerRecord> {
        vec![
            PlayerRecord {
                at_bats: 4,
                singles: 1,
                home_runs: 1,
                walks: 1,
                ..PlayerRecord::new("Jnana")
            },
            PlayerRecord {
                pitch_outs: 9,
                earned_runs: 2,
                strikeouts_pitched: 4,
                ..PlayerRecord::new("Mary Ann")
            },
        ]
    }

    #[test]
    fn summary_row_formats_derived_columns() {
        let row = summary_row(&sample()[0]);
        assert_eq!(row[0], "Jnana");
        assert_eq!(row[1], "4");
        assert_eq!(row[10], ".500"); // AVG 2/4
        assert_eq!(row[11], ".400"); // OBP 2/5
        assert_eq!(row[12], ".1250"); // SLG 5/4
        assert_eq!(row[14], "0.0");
        assert_eq!(row[19], "0.00");
    }

    #[test]
    fn summary_table_columns_are_aligned() {
        let table = format_summary_table(&sample());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Player   | AB | 1B"));
        assert!(lines[1].starts_with("---------+----+----"));
        assert!(lines[2].starts_with("Jnana    | 4  | 1 "));
        assert!(lines[3].starts_with("Mary Ann | 0  | 0 "));
        // every row has the same width
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn summary_table_empty_roster_has_header_and_separator() {
        let table = format_summary_table(&[]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(" | ").count(), 21);
        assert_eq!(lines[1].split("-+-").count(), 21);
    }

    #[test]
    fn export_text_contains_each_player_and_table() {
        let text = build_export_text(&sample());
        assert!(text.starts_with("Baseball Stats Log\n\nPlayer: Jnana\nAB: 4\n"));
        assert!(text.contains("Player: Mary Ann\n"));
        assert!(text.contains("IP: 3.0\n"));
        assert!(text.contains("ERA: 6.00\n"));
        assert!(text.contains("Summary Table:\n\nPlayer"));
    }

    #[test]
    fn export_csv_has_header_and_rows() {
        let csv_text = build_export_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SUMMARY_HEADERS.join(","));
        assert!(lines[1].starts_with("Jnana,4,1,0,0,1,0,0,1,0,.500,.400,.1250,.1650,0.0,"));
        assert!(lines[2].starts_with("Mary Ann,0,"));
        assert!(lines[2].ends_with(",3.0,2,4,0,0,6.00,0.00"));
    }

    #[test]
    fn filename_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let names = vec!["Jnana".to_string(), "Mary Ann".to_string()];
        assert_eq!(
            export_filename(&names, 42, date, ExportFormat::Txt),
            "Jnana_Mary_Ann_stats_42_07-04-24.txt"
        );
        assert_eq!(
            export_filename(&[], 7, date, ExportFormat::Csv),
            "no_players_stats_7_07-04-24.csv"
        );
    }

    #[test]
    fn filename_names_cannot_leave_the_directory() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let escaped = export_filename(&["../outside/x".to_string()], 1, date, ExportFormat::Txt);
        assert!(!escaped.contains('/'));
        assert!(!escaped.contains(".."));
        assert!(escaped.ends_with("_stats_1_07-04-24.txt"));

        assert_eq!(
            export_filename(&["A/B".to_string()], 3, date, ExportFormat::Csv),
            "A_B_stats_3_07-04-24.csv"
        );
        assert_eq!(
            export_filename(&["C:\\D".to_string()], 3, date, ExportFormat::Csv),
            "C__D_stats_3_07-04-24.csv"
        );
        // nothing usable left falls back to the empty-roster name
        assert_eq!(
            export_filename(&["..".to_string(), "/".to_string()], 5, date, ExportFormat::Txt),
            "no_players_stats_5_07-04-24.txt"
        );
    }

    #[test]
    fn filename_long_roster_is_capped() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        let names: Vec<String> = (0..60).map(|i| format!("Player Number {i}")).collect();
        let name = export_filename(&names, 1_000_000, date, ExportFormat::Csv);
        assert!(name.len() <= 255);
        assert!(name.starts_with("Player_Number_0_Player_Number_1_"));
        assert!(name.ends_with("_stats_1000000_07-04-24.csv"));

        // multi-byte names are cut on a char boundary
        let wide: Vec<String> = (0..80).map(|_| "Émile".to_string()).collect();
        let name = export_filename(&wide, 1, date, ExportFormat::Txt);
        assert!(name.len() <= 255);
        assert!(name.starts_with("Émile_Émile_"));
    }

    #[test]
    fn suggested_filename_shape() {
        let name = suggest_filename(&["Theo".to_string()], ExportFormat::Csv);
        assert!(name.starts_with("Theo_stats_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn write_export_creates_file() {
        let dir = std::env::temp_dir().join("boxscore_export_test");
        let _ = std::fs::remove_dir_all(&dir);
        let players = sample();
        let names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();

        let path = write_export(&dir, &players, &names, ExportFormat::Txt).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Baseball Stats Log"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_export_stays_inside_dir() {
        let dir = std::env::temp_dir().join("boxscore_export_escape_test");
        let _ = std::fs::remove_dir_all(&dir);
        let players = vec![PlayerRecord::new("../outside/x"), PlayerRecord::new("A/B")];
        let names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();

        let path = write_export(&dir, &players, &names, ExportFormat::Csv).unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert!(path.is_file());
        assert!(!dir.join("..").join("outside").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn parse_format() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("txt".parse::<ExportFormat>(), Ok(ExportFormat::Txt));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
