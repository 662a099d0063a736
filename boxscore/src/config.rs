// Configuration loading and parsing (boxscore.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::roster::normalize_name;
use crate::game::session::SessionOptions;
use crate::game::Mode;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("no config/boxscore.toml and no defaults/boxscore.toml under {}; run from the project root", base_dir.display())]
    NoDefaults { base_dir: PathBuf },

    #[error("failed to copy default config to {path}: {source}")]
    DefaultsCopy {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// boxscore.toml structs
// ---------------------------------------------------------------------------

/// Name of the config file inside `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "boxscore.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Names always offered when picking a lineup.
    #[serde(default)]
    pub default_players: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_advance: bool,
    #[serde(default = "default_mode")]
    pub start_mode: Mode,
    /// After a manual stat entry, add the player to the lineup if missing.
    #[serde(default = "default_true")]
    pub auto_add_to_lineup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            dir: "logs".into(),
            filter: "boxscore=info,warn".into(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mode() -> Mode {
    Mode::Hitting
}

impl GameConfig {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_players: self.default_players.clone(),
            auto_advance: self.auto_advance,
            auto_add_to_lineup: self.auto_add_to_lineup,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/boxscore.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let config = parse_config(&text).map_err(|e| match e {
        ConfigError::ParseError { source, .. } => ConfigError::ParseError {
            path: path.clone(),
            source,
        },
        other => other,
    })?;
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: PathBuf::from(CONFIG_FILE),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Copy `defaults/boxscore.toml` to `config/boxscore.toml` when the latter
/// is missing. Returns the new file's path, or `None` if a config already
/// existed. An existing config is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_path = base_dir.join("defaults").join(CONFIG_FILE);
    let target = base_dir.join("config").join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    let content = std::fs::read(&default_path).map_err(|_| ConfigError::NoDefaults {
        base_dir: base_dir.to_path_buf(),
    })?;

    let copy_err = |source: std::io::Error| ConfigError::DefaultsCopy {
        path: target.clone(),
        source,
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(copy_err)?;
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_err(e)),
    };
    std::io::Write::write_all(&mut dest, &content).map_err(copy_err)?;

    Ok(Some(target))
}

/// Load config relative to the current working directory, copying the
/// default file first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let mut seen: Vec<String> = Vec::new();
    for (i, name) in config.game.default_players.iter().enumerate() {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("game.default_players[{i}]"),
                message: "must not be blank".into(),
            });
        }
        if seen.contains(&key) {
            return Err(ConfigError::ValidationError {
                field: format!("game.default_players[{i}]"),
                message: format!("duplicate player name '{}'", name.trim()),
            });
        }
        seen.push(key);
    }

    if config.export.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "export.dir".into(),
            message: "must not be empty".into(),
        });
    }

    if config.logging.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the boxscore crate root (works whether `cargo test`
    /// runs from the crate root or the workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("boxscore/defaults").exists() {
            cwd.join("boxscore")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), contents).unwrap();
        tmp
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let tmp = std::env::temp_dir().join("boxscore_config_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(
            project_root().join("defaults").join(CONFIG_FILE),
            tmp.join("defaults").join(CONFIG_FILE),
        )
        .unwrap();

        ensure_config_file(&tmp).expect("should copy default configs");
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.game.default_players, vec!["Jnana", "Nevan", "Theo"]);
        assert!(config.game.auto_advance);
        assert_eq!(config.game.start_mode, Mode::Hitting);
        assert!(config.game.auto_add_to_lineup);
        assert_eq!(config.export.dir, "exports");
        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filter, "boxscore=info,warn");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn optional_fields_take_defaults() {
        let config = parse_config("[game]\n\n[export]\ndir = \"out\"\n").unwrap();
        assert!(config.game.default_players.is_empty());
        assert!(config.game.auto_advance);
        assert_eq!(config.game.start_mode, Mode::Hitting);
        assert_eq!(config.logging.filter, "boxscore=info,warn");
    }

    #[test]
    fn start_mode_pitching() {
        let config = parse_config(
            "[game]\nstart_mode = \"pitching\"\nauto_advance = false\n\n[export]\ndir = \"out\"\n",
        )
        .unwrap();
        assert_eq!(config.game.start_mode, Mode::Pitching);
        assert!(!config.game.session_options().auto_advance);
    }

    #[test]
    fn rejects_blank_default_player() {
        let err = parse_config(
            "[game]\ndefault_players = [\"Theo\", \"  \"]\n\n[export]\ndir = \"out\"\n",
        )
        .unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "game.default_players[1]");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_duplicate_default_player() {
        let err = parse_config(
            "[game]\ndefault_players = [\"Theo\", \"theo \"]\n\n[export]\ndir = \"out\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate player name 'theo'"));
    }

    #[test]
    fn rejects_empty_export_dir() {
        let err = parse_config("[game]\n\n[export]\ndir = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "export.dir"));
    }

    #[test]
    fn parse_error_carries_file_path() {
        let tmp = write_config("boxscore_config_bad_toml", "[game\n");
        let err = load_config_from(&tmp).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("config/boxscore.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_reported() {
        let tmp = std::env::temp_dir().join("boxscore_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            load_config_from(&tmp).unwrap_err(),
            ConfigError::FileNotFound { .. }
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_existing_config() {
        let tmp = write_config("boxscore_config_ensure_keeps", "# custom\n");
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), "# default\n").unwrap();

        assert_eq!(ensure_config_file(&tmp).expect("should succeed"), None);
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_copies_only_the_config() {
        let tmp = std::env::temp_dir().join("boxscore_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), "# default\n").unwrap();
        fs::write(tmp.join("defaults/notes.txt"), "unrelated\n").unwrap();

        let copied = ensure_config_file(&tmp).expect("should succeed");
        assert_eq!(copied, Some(tmp.join("config").join(CONFIG_FILE)));
        assert!(!tmp.join("config/notes.txt").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_errors_without_defaults() {
        let tmp = std::env::temp_dir().join("boxscore_config_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_file(&tmp).unwrap_err();
        assert!(matches!(&err, ConfigError::NoDefaults { base_dir } if base_dir == &tmp));
        assert!(err.to_string().contains("no config/boxscore.toml"));

        let _ = fs::remove_dir_all(&tmp);
    }
}
