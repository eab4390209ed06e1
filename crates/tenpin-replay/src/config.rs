use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tenpin_core::model::game::SessionSetup;
use thiserror::Error;
use tracing::Level;

use crate::script::{self, ScriptError};

const DEFAULT_STRIKE_RATE: f64 = 0.35;
const DEFAULT_SPARE_RATE: f64 = 0.5;
const DEFAULT_POCKET_RATE: f64 = 0.55;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root replay configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplayConfig {
    pub run_id: String,
    #[serde(default)]
    pub sessions: Vec<SessionConfig>,
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReplayConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ReplayConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.validate()?;
        validate_sessions(&self.sessions)?;
        if let Some(simulation) = &self.simulation {
            simulation.validate()?;
        }

        let simulated = self.simulation.as_ref().map_or(0, |sim| sim.games);
        if self.sessions.is_empty() && simulated == 0 {
            return Err(ValidationError::InvalidField {
                field: "sessions".to_string(),
                message: "at least one session or a simulation with games > 0 is required"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
            store: resolve_template(&self.run_id, &self.outputs.store),
        }
    }

    pub fn total_games(&self) -> usize {
        self.sessions.len() + self.simulation.as_ref().map_or(0, |sim| sim.games)
    }
}

/// A scripted game: session attributes plus the actions to replay.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub name: String,
    #[serde(default)]
    pub setup: SessionSetup,
    pub script: String,
}

/// Seeded bowler producing additional games.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub games: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_strike_rate")]
    pub strike_rate: f64,
    #[serde(default = "default_spare_rate")]
    pub spare_rate: f64,
    #[serde(default = "default_pocket_rate")]
    pub pocket_rate: f64,
    #[serde(default)]
    pub setup: SessionSetup,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            games: 0,
            seed: None,
            strike_rate: DEFAULT_STRIKE_RATE,
            spare_rate: DEFAULT_SPARE_RATE,
            pocket_rate: DEFAULT_POCKET_RATE,
            setup: SessionSetup::default(),
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("simulation.strike_rate", self.strike_rate),
            ("simulation.spare_rate", self.spare_rate),
            ("simulation.pocket_rate", self.pocket_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: format!("rate {value} must lie within [0, 1]"),
                });
            }
        }
        Ok(())
    }
}

fn default_strike_rate() -> f64 {
    DEFAULT_STRIKE_RATE
}

fn default_spare_rate() -> f64 {
    DEFAULT_SPARE_RATE
}

fn default_pocket_rate() -> f64 {
    DEFAULT_POCKET_RATE
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
    pub store: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
            ("outputs.store", &self.store),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown tracing level '{}'", self.tracing_level),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_sessions(sessions: &[SessionConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for session in sessions {
        if session.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "sessions.name".to_string(),
                message: "session name must not be empty".to_string(),
            });
        }

        if !session.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("sessions[{}].name", session.name),
                message: "session name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(session.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "sessions".to_string(),
                message: format!("session name '{}' defined more than once", session.name),
            });
        }

        script::parse(&session.script).map_err(|source| ValidationError::Script {
            session: session.name.clone(),
            source,
        })?;
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
    pub store: PathBuf,
}

impl ResolvedOutputs {
    /// Directory holding the summary; telemetry files land next to it.
    pub fn report_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("sessions[{session}].script: {source}")]
    Script {
        session: String,
        #[source]
        source: ScriptError,
    },
}
