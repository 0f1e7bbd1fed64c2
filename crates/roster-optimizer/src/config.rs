// Configuration: roster rules, scoring weights and solver limits, optionally
// read from a TOML file. Every key has a default matching the stock league.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

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
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster: RosterRules,
    pub scoring: ScoringConfig,
    pub solver: SolverConfig,
}

/// Budget cap and positional quotas the selection must meet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    /// Maximum summed cost of the selection.
    pub budget_cap: f64,
    /// Exact number of L/C/R players.
    pub forwards: usize,
    /// Exact number of D players.
    pub defensemen: usize,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            budget_cap: 82.0,
            forwards: 13,
            defensemen: 8,
        }
    }
}

/// Inputs to the points-per-game estimate and the objective.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Divisor turning a season point projection into a per-game rate.
    pub games_per_season: f64,
    /// Multiplier applied to `pgp` when no projection is available.
    pub pgp_fallback_factor: f64,
    pub pgp_weight: f64,
    pub ppg_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            games_per_season: 82.0,
            pgp_fallback_factor: 0.9,
            pgp_weight: 0.0,
            ppg_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit for the ILP solve. No limit when unset.
    pub timeout_secs: Option<u64>,
}

impl SolverConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from a TOML file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config = parse_config(&text).map_err(|e| match e {
        ParseFailure::Toml(source) => ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Invalid(err) => err,
    })?;
    Ok(config)
}

/// Load the file at `path` when given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_config_from(p),
        None => Ok(Config::default()),
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

fn parse_config(text: &str) -> Result<Config, ParseFailure> {
    let config: Config = toml::from_str(text).map_err(ParseFailure::Toml)?;
    validate(&config).map_err(ParseFailure::Invalid)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let roster = &config.roster;
    if !roster.budget_cap.is_finite() || roster.budget_cap < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "roster.budget_cap".into(),
            message: format!("must be a finite value >= 0, got {}", roster.budget_cap),
        });
    }

    if roster.forwards + roster.defensemen == 0 {
        return Err(ConfigError::ValidationError {
            field: "roster.forwards".into(),
            message: "forwards + defensemen must be greater than 0".into(),
        });
    }

    let scoring = &config.scoring;
    if !scoring.games_per_season.is_finite() || scoring.games_per_season <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "scoring.games_per_season".into(),
            message: format!("must be > 0, got {}", scoring.games_per_season),
        });
    }

    let finite_fields: &[(&str, f64)] = &[
        ("scoring.pgp_fallback_factor", scoring.pgp_fallback_factor),
        ("scoring.pgp_weight", scoring.pgp_weight),
        ("scoring.ppg_weight", scoring.ppg_weight),
    ];
    for (name, val) in finite_fields {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be finite, got {val}"),
            });
        }
    }

    if config.solver.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "solver.timeout_secs".into(),
            message: "must be > 0 when set".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
