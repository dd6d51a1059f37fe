//! CLI entry-point for title, image and single-oracle generation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{error, info, instrument};

use crate::{
    cli::{require_dir, require_file, ArgsError},
    config::Settings,
    nlp::{load_embedder, load_tokenizer, RankPolicy},
    oracle::{self, OracleOptions, PrepareJob},
};

/// Args for the `prepare` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Source corpus, one document per line.
    #[arg(short, long)]
    pub input: PathBuf,
    /// Target corpus, one title per line, aligned with the input.
    #[arg(short, long)]
    pub target: PathBuf,
    /// Vocabulary file, one token per line.
    #[arg(short, long)]
    pub vocab: PathBuf,
    /// Dataset label used in output names (e.g. training, validation, test).
    #[arg(short, long)]
    pub data_type: String,
    /// Directory for generated files; defaults to the input's directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Resume the oracle from this source line, reusing the existing title file.
    #[arg(short, long, default_value_t = 0)]
    pub line_start: usize,
    /// Override the number of sentences labelled per title.
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
    /// Which end of the cosine distance ordering wins.
    #[arg(long, value_enum, default_value = "nearest")]
    pub policy: RankPolicy,
}

impl Args {
    fn validate(&self) -> Result<(), ArgsError> {
        require_file("--input", &self.input)?;
        require_file("--target", &self.target)?;
        require_file("--vocab", &self.vocab)?;
        if let Some(dir) = &self.output_dir {
            require_dir("--output-dir", dir)?;
        }
        Ok(())
    }

    fn into_job(self, settings: &Settings) -> PrepareJob {
        let output_dir = self.output_dir.unwrap_or_else(|| parent_dir(&self.input));
        PrepareJob {
            input: self.input,
            target: self.target,
            vocab: self.vocab,
            data_type: self.data_type,
            output_dir,
            options: OracleOptions {
                top_k: self.top_k.unwrap_or(settings.top_k),
                policy: self.policy,
                line_start: self.line_start,
            },
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    args.validate()
        .inspect_err(|err| error!(%err, "invalid arguments"))?;
    let job = args.into_job(&settings);
    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let tokenizer = load_tokenizer();
        let mut embedder = load_embedder(&settings)?;
        oracle::prepare(&job, &settings, tokenizer.as_ref(), embedder.as_mut())
    })
    .await
    .context("prepare worker panicked")??;
    info!(?report, "prepare finished");
    Ok(())
}
