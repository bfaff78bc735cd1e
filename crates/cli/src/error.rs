//! CLI failures, each carrying the file or flag it came from.
//!
//! | exit | cause |
//! |---|---|
//! | 2  | clap parse error (before `run`) |
//! | 10 | the tank rejected its config or clip catalog |
//! | 11 | a config/clip file could not be read, or an output could not be written |
//! | 12 | a file was not JSON, or a flag value was out of range |
//! | 13 | frame state could not be serialized |

use aquarium_core::AquariumError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Aquarium(#[from] AquariumError),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid --{flag}: {message}")]
    Flag { flag: &'static str, message: String },

    #[error("cannot serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        CliError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        CliError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Attaches `path` to a failed write; other aquarium errors pass through.
    pub fn writing(path: &Path, err: AquariumError) -> Self {
        match err {
            AquariumError::Io(message) => CliError::Write {
                path: path.to_path_buf(),
                message,
            },
            other => CliError::Aquarium(other),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Aquarium(AquariumError::Io(_)) => 11,
            CliError::Aquarium(_) => 10,
            CliError::Read { .. } | CliError::Write { .. } => 11,
            CliError::Json { .. } | CliError::Flag { .. } => 12,
            CliError::Output(_) => 13,
        }
    }
}
