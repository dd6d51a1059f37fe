//! Runtime configuration utilities for oracle-prep.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::Deserialize;

/// Number of sentences labelled positive per target when nothing overrides it.
pub const DEFAULT_TOP_K: usize = 3;

/// Which sentence embedder backs the oracle pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Feature-hashed bag of words; no model download required.
    Hashed,
    /// Pre-trained model through `fastembed` (needs the `embeddings` feature).
    Fastembed,
}

impl FromStr for EmbedderKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hashed" => Ok(Self::Hashed),
            "fastembed" => Ok(Self::Fastembed),
            other => anyhow::bail!("unknown embedder backend {other:?}"),
        }
    }
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Positive labels emitted per target sentence.
    pub top_k: usize,
    /// Embedding backend.
    pub embedder: EmbedderKind,
    /// Vector width of the hashed embedder.
    pub embed_dims: usize,
    /// Model name handed to the fastembed backend.
    pub embed_model: String,
    /// Prefix of generated title IDs and output file names.
    pub file_prefix: String,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let top_k = env::var("ORACLE_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOP_K);
        let embedder = match env::var("ORACLE_EMBEDDER") {
            Ok(value) => value.parse::<EmbedderKind>().context("parsing ORACLE_EMBEDDER")?,
            Err(_) if cfg!(feature = "embeddings") => EmbedderKind::Fastembed,
            Err(_) => EmbedderKind::Hashed,
        };
        let embed_dims = env::var("ORACLE_EMBED_DIMS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|dims: &usize| *dims > 0)
            .unwrap_or(512);
        let embed_model =
            env::var("ORACLE_EMBED_MODEL").unwrap_or_else(|_| "all-minilm-l6-v2".to_string());
        let file_prefix = env::var("ORACLE_FILE_PREFIX").unwrap_or_else(|_| "usp".to_string());

        Ok(Self {
            top_k,
            embedder,
            embed_dims,
            embed_model,
            file_prefix,
        })
    }

    /// Name of a per-dataset output artefact, e.g. `usp-training.title`.
    pub fn artefact_name(&self, data_type: &str, suffix: &str) -> String {
        format!("{}-{data_type}.{suffix}", self.file_prefix)
    }

    /// Convenience helper for artefact paths under an output directory.
    pub fn join_artefact<P: AsRef<Path>>(&self, dir: P, data_type: &str, suffix: &str) -> PathBuf {
        dir.as_ref().join(self.artefact_name(data_type, suffix))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embedder: EmbedderKind::Hashed,
            embed_dims: 512,
            embed_model: "all-minilm-l6-v2".to_string(),
            file_prefix: "usp".to_string(),
        }
    }
}
