//! Command-line interface wiring for oracle-prep.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Settings;

pub mod map;
pub mod prepare;
pub mod split;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Corpus preparation for extractive summarisation oracles",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => prepare::run(args, settings).await,
            Commands::Map(args) => map::run(args, settings).await,
            Commands::Split(args) => split::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write title, image and single-oracle label files for a dataset split.
    Prepare(prepare::Args),
    /// Convert corpora between words and word IDs.
    Map(map::Args),
    /// Split a corpus into one word-tokenized file per sentence.
    Split(split::Args),
}

/// Argument combinations rejected before any output is written.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("{flag} {} is not an existing file", .path.display())]
    NotAFile { flag: &'static str, path: PathBuf },
    #[error("{flag} {} is not an existing directory", .path.display())]
    NotADirectory { flag: &'static str, path: PathBuf },
    #[error("{flag} {} does not exist", .path.display())]
    Missing { flag: &'static str, path: PathBuf },
    #[error("--mode {mode} requires {flag}")]
    ModeFlag { mode: &'static str, flag: &'static str },
    #[error("--mode {mode} does not accept {flag}")]
    ModeForbids { mode: &'static str, flag: &'static str },
}

pub(crate) fn require_file(flag: &'static str, path: &Path) -> Result<(), ArgsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArgsError::NotAFile {
            flag,
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn require_dir(flag: &'static str, path: &Path) -> Result<(), ArgsError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ArgsError::NotADirectory {
            flag,
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn require_exists(flag: &'static str, path: &Path) -> Result<(), ArgsError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArgsError::Missing {
            flag,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_paths_are_rejected() {
        let err = require_file("--vocab", Path::new("/definitely/not/here.txt")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--vocab /definitely/not/here.txt is not an existing file"
        );
        assert!(require_dir("--input-dir", Path::new("/definitely/not/here")).is_err());
    }
}
