//! Tutor configuration.
//!
//! Defaults come from [`crate::constants`]; a JSON file may override them and
//! command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_RECORD_PATH, DEFAULT_REPLY_DELAY_MS, DEFAULT_STATE_PATH,
    MAX_BOARD_SIZE, MIN_BOARD_SIZE,
};
use crate::error::{Result, TutorError};

/// Settings for one tutoring session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Board size (NxN)
    pub board_size: usize,
    /// Record file (`.sgf` or single-entry `.zip`)
    pub record_path: PathBuf,
    /// Persisted learning statistics
    pub state_path: PathBuf,
    /// Seed for the reply selector; random when absent
    pub seed: Option<u64>,
    /// Pause before showing the automated reply
    pub reply_delay_ms: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            record_path: PathBuf::from(DEFAULT_RECORD_PATH),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            seed: None,
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
        }
    }
}

impl TutorConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| TutorError::io(format!("read config {}", path.display()), source))?;
        let config: TutorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(TutorError::InvalidConfig {
                message: format!(
                    "board_size {} outside {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}",
                    self.board_size
                ),
            });
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(TutorError::InvalidConfig {
                message: "state_path is empty".to_string(),
            });
        }
        Ok(())
    }
}
