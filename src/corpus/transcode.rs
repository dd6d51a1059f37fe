//! Bulk conversion of corpora between words and word IDs.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, instrument};
use walkdir::WalkDir;

use crate::{corpus::vocab::VocabIndex, nlp::Tokenizer};

/// Sub-directory that receives converted files.
pub const CONVERTED_DIR: &str = "converted";
/// Prefix of words -> IDs output files.
pub const WORD_ID_PREFIX: &str = "word-id-";
/// Output name of single-file IDs -> words decoding.
pub const DECODED_FILE: &str = "vocab-output.txt";

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("line {line}: {token:?} is not a word id")]
    NotAnId { line: usize, token: String },
    #[error("line {line}: word id {id} is outside the vocabulary of {size} entries")]
    OutOfRange { line: usize, id: usize, size: usize },
}

/// Words -> IDs: one `<ids>\n\n` block per input line, each optionally
/// preceded by its title ID.
///
/// With titles supplied, line `i` pairs with title `i` and output stops at the
/// shorter of the two. Returns the number of lines written.
pub fn convert_file_to_word_ids(
    vocab: &VocabIndex,
    tokenizer: &dyn Tokenizer,
    input: &Path,
    output: &Path,
    titles: Option<&[String]>,
) -> Result<usize> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("open {}", input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("create {}", output.display()))?,
    );
    info!(input = %input.display(), output = %output.display(), "converting words to word ids");

    let mut written = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", input.display()))?;
        if let Some(titles) = titles {
            let Some(title) = titles.get(index) else {
                break;
            };
            writeln!(writer, "{title}")?;
        }
        writeln!(writer, "{}", vocab.encode_line(tokenizer, &line))?;
        writeln!(writer)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// IDs -> words: each line of whitespace separated IDs becomes the matching
/// vocabulary tokens joined by spaces. Blank separator lines are dropped.
pub fn process_output_file(vocab: &VocabIndex, input: &Path, output: &Path) -> Result<usize> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("open {}", input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("create {}", output.display()))?,
    );
    info!(input = %input.display(), output = %output.display(), "converting word ids to words");

    let mut written = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", input.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let words = decode_line(vocab, &line, index)
            .with_context(|| format!("decode {}", input.display()))?;
        writeln!(writer, "{}", words.join(" "))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

fn decode_line<'v>(
    vocab: &'v VocabIndex,
    line: &str,
    index: usize,
) -> Result<Vec<&'v str>, TranscodeError> {
    line.split_whitespace()
        .map(|token| {
            let id: usize = token.parse().map_err(|_| TranscodeError::NotAnId {
                line: index,
                token: token.to_string(),
            })?;
            vocab.token(id).ok_or(TranscodeError::OutOfRange {
                line: index,
                id,
                size: vocab.len(),
            })
        })
        .collect()
}

/// Where the words -> IDs rendition of `input` lands: `<dir>/converted/word-id-<name>`.
pub fn converted_path(input: &Path) -> Result<PathBuf> {
    let name = file_name(input)?;
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir
        .join(CONVERTED_DIR)
        .join(format!("{WORD_ID_PREFIX}{name}")))
}

/// Convert a single words file into `converted/word-id-<name>` beside it.
pub fn convert_single_file(
    vocab: &VocabIndex,
    tokenizer: &dyn Tokenizer,
    input: &Path,
    titles: Option<&[String]>,
) -> Result<PathBuf> {
    let output = converted_path(input)?;
    ensure_parent(&output)?;
    convert_file_to_word_ids(vocab, tokenizer, input, &output, titles)?;
    Ok(output)
}

/// Decode a single word-ID file into `vocab-output.txt` beside it.
pub fn decode_single_file(vocab: &VocabIndex, input: &Path) -> Result<PathBuf> {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let output = dir.join(DECODED_FILE);
    process_output_file(vocab, input, &output)?;
    Ok(output)
}

/// Convert every `*.txt` file directly inside `dir` into `dir/converted/`.
#[instrument(skip(vocab, tokenizer, titles))]
pub fn convert_directory(
    vocab: &VocabIndex,
    tokenizer: &dyn Tokenizer,
    dir: &Path,
    titles: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let out_dir = dir.join(CONVERTED_DIR);
    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let mut outputs = Vec::new();
    for input in text_files(dir)? {
        let output = out_dir.join(format!("{WORD_ID_PREFIX}{}", file_name(&input)?));
        convert_file_to_word_ids(vocab, tokenizer, &input, &output, titles)?;
        outputs.push(output);
    }
    info!(files = outputs.len(), "converted directory");
    Ok(outputs)
}

/// Decode every `*.txt` file directly inside `dir` into
/// `dir/converted/vocab-output-<name>`.
#[instrument(skip(vocab))]
pub fn decode_directory(vocab: &VocabIndex, dir: &Path) -> Result<Vec<PathBuf>> {
    let out_dir = dir.join(CONVERTED_DIR);
    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let mut outputs = Vec::new();
    for input in text_files(dir)? {
        let output = out_dir.join(format!("vocab-output-{}", file_name(&input)?));
        process_output_file(vocab, &input, &output)?;
        outputs.push(output);
    }
    info!(files = outputs.len(), "decoded directory");
    Ok(outputs)
}

/// Regular `*.txt` files directly inside `dir`, sorted by name.
fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("txt")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
