//! CLI entry-point for vocabulary mapping between words and word IDs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, ValueEnum};
use tracing::{error, info, instrument};

use crate::{
    cli::{require_exists, require_file, ArgsError},
    config::Settings,
    corpus::{records, transcode, VocabIndex},
    nlp::load_tokenizer,
};

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MapMode {
    /// Word IDs back to words (model output files).
    Output,
    /// Words to word IDs (corpus files or directories).
    Dir,
}

/// Args for the `map` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Vocabulary file, one token per line.
    #[arg(short, long)]
    pub vocab: PathBuf,
    /// Conversion mode.
    #[arg(short, long, value_enum)]
    pub mode: MapMode,
    /// Word-ID file (or directory of `.txt` files) to turn back into words.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Corpus directory (or single file) to turn into word IDs.
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,
    /// Title file whose IDs are interleaved before each converted line.
    #[arg(short, long)]
    pub titles: Option<PathBuf>,
}

impl Args {
    /// The path the selected mode operates on.
    fn validate(&self) -> Result<PathBuf, ArgsError> {
        require_file("--vocab", &self.vocab)?;
        if let Some(titles) = &self.titles {
            if self.mode == MapMode::Output {
                return Err(ArgsError::ModeForbids {
                    mode: "output",
                    flag: "--titles",
                });
            }
            require_file("--titles", titles)?;
        }
        let (path, mode, flag) = match self.mode {
            MapMode::Output => (self.output.as_ref(), "output", "--output"),
            MapMode::Dir => (self.input_dir.as_ref(), "dir", "--input-dir"),
        };
        let path = path.ok_or(ArgsError::ModeFlag { mode, flag })?;
        require_exists(flag, path)?;
        Ok(path.clone())
    }
}

#[instrument(skip(_settings))]
pub async fn run(args: Args, _settings: Settings) -> Result<()> {
    let target = args
        .validate()
        .inspect_err(|err| error!(%err, "invalid arguments"))?;
    let written = tokio::task::spawn_blocking(move || execute(&args, &target))
        .await
        .context("map worker panicked")??;
    for path in &written {
        info!(path = %path.display(), "wrote converted file");
    }
    Ok(())
}

fn execute(args: &Args, target: &Path) -> Result<Vec<PathBuf>> {
    let vocab = VocabIndex::from_path(&args.vocab)?;
    match args.mode {
        MapMode::Output if target.is_dir() => transcode::decode_directory(&vocab, target),
        MapMode::Output => Ok(vec![transcode::decode_single_file(&vocab, target)?]),
        MapMode::Dir => {
            let tokenizer = load_tokenizer();
            let titles = args
                .titles
                .as_deref()
                .map(records::read_record_ids)
                .transpose()?;
            let titles = titles.as_deref();
            if target.is_dir() {
                transcode::convert_directory(&vocab, tokenizer.as_ref(), target, titles)
            } else {
                Ok(vec![transcode::convert_single_file(
                    &vocab,
                    tokenizer.as_ref(),
                    target,
                    titles,
                )?])
            }
        }
    }
}
