//! CLI entry-point for sentence splitting.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{error, info, instrument};

use crate::{
    cli::{require_dir, require_file},
    config::Settings,
    corpus::split,
    nlp::load_tokenizer,
};

/// Args for the `split` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Corpus file to segment.
    #[arg(short, long)]
    pub file: PathBuf,
    /// Directory receiving a sub-directory of sentence files.
    #[arg(short, long)]
    pub output: PathBuf,
}

#[instrument(skip(_settings))]
pub async fn run(args: Args, _settings: Settings) -> Result<()> {
    require_file("--file", &args.file)
        .and_then(|_| require_dir("--output", &args.output))
        .inspect_err(|err| error!(%err, "invalid arguments"))?;
    let dir = tokio::task::spawn_blocking(move || {
        split::split_file(load_tokenizer().as_ref(), &args.file, &args.output)
    })
    .await
    .context("split worker panicked")??;
    info!(dir = %dir.display(), "sentence files written");
    Ok(())
}
