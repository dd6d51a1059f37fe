//! Sentence splitting of a corpus into one file per sentence.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::nlp::Tokenizer;

/// Split every line of `input` into sentences and write each sentence's words
/// to `<output_root>/<stem>/<line>-<sentence>-<file name>`.
///
/// Returns the directory holding the sentence files.
#[instrument(skip(tokenizer))]
pub fn split_file(tokenizer: &dyn Tokenizer, input: &Path, output_root: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no file stem", input.display()))?;
    let base_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no file name", input.display()))?;
    let out_dir = output_root.join(stem);
    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    info!(dir = %out_dir.display(), "splitting corpus into sentence files");

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("open {}", input.display()))?,
    );
    let mut files = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", input.display()))?;
        let sentences = tokenizer.sentences(&line);
        debug!(line = line_no, sentences = sentences.len(), "segmented line");
        for (sentence_no, sentence) in sentences.iter().enumerate() {
            let path = out_dir.join(format!("{line_no}-{sentence_no}-{base_name}"));
            fs::write(&path, tokenizer.words(sentence).join(" "))
                .with_context(|| format!("write {}", path.display()))?;
            files += 1;
        }
    }
    info!(files, "finished splitting corpus");
    Ok(out_dir)
}
