//! Title, image and single-oracle files for one dataset split.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    corpus::{records, titles, TitleRecords, VocabIndex},
    nlp::{SentenceEmbedder, Tokenizer},
    oracle::{run_single_oracle, OracleOptions, OracleReport, OracleSink},
};

/// Inputs of one `prepare` run.
#[derive(Debug, Clone)]
pub struct PrepareJob {
    /// Source corpus, one document per line.
    pub input: PathBuf,
    /// Target corpus, one title per line, aligned with `input`.
    pub target: PathBuf,
    pub vocab: PathBuf,
    /// Dataset label used in file names, e.g. `training`.
    pub data_type: String,
    pub output_dir: PathBuf,
    pub options: OracleOptions,
}

/// Paths of the artefacts a job produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artefacts {
    pub title: PathBuf,
    pub image: PathBuf,
    pub label: PathBuf,
    pub log: PathBuf,
}

impl PrepareJob {
    pub fn artefacts(&self, settings: &Settings) -> Artefacts {
        let dir = &self.output_dir;
        let ty = &self.data_type;
        Artefacts {
            title: settings.join_artefact(dir, ty, "title"),
            image: settings.join_artefact(dir, ty, "image"),
            label: settings.join_artefact(dir, ty, "label.singleoracle"),
            log: settings.join_artefact(dir, ty, "log.txt"),
        }
    }

    fn is_resume(&self) -> bool {
        self.options.line_start > 0
    }
}

/// Produce the title and image files (fresh runs only) and the single-oracle
/// label and log files.
///
/// A resumed run (`line_start > 0`) reads the title IDs back from the
/// existing title file so appended label records keep referring to them.
#[instrument(skip(settings, tokenizer, embedder), fields(data_type = %job.data_type))]
pub fn prepare(
    job: &PrepareJob,
    settings: &Settings,
    tokenizer: &dyn Tokenizer,
    embedder: &mut dyn SentenceEmbedder,
) -> Result<OracleReport> {
    let artefacts = job.artefacts(settings);
    let vocab = VocabIndex::from_path(&job.vocab)?;
    let targets = titles::read_targets(&job.target)?;

    let sink = if job.is_resume() {
        if !artefacts.title.is_file() {
            bail!(
                "cannot resume from line {}: title file {} is missing",
                job.options.line_start,
                artefacts.title.display()
            );
        }
        info!(line_start = job.options.line_start, "resuming single oracle");
        OracleSink::append(&artefacts.label, &artefacts.log)?
    } else {
        OracleSink::create(&artefacts.label, &artefacts.log)?
    };

    let title_records = if job.is_resume() {
        let ids = records::read_record_ids(&artefacts.title)?;
        TitleRecords::from_pairs(ids, targets)?
    } else {
        let generated = TitleRecords::generate(targets, &settings.file_prefix);
        generated.write_title_file(&artefacts.title, &vocab, tokenizer)?;
        write_image_file(&vocab, tokenizer, &job.input, &generated, &artefacts.image)?;
        generated
    };

    let source = BufReader::new(
        File::open(&job.input).with_context(|| format!("open {}", job.input.display()))?,
    );
    run_single_oracle(
        source,
        &title_records,
        tokenizer,
        embedder,
        sink,
        &job.options,
    )
}

/// Write the image file: source line `i` encoded to word IDs under title `i`.
///
/// Output stops at the shorter of the two sequences.
pub fn write_image_file(
    vocab: &VocabIndex,
    tokenizer: &dyn Tokenizer,
    source: &Path,
    titles: &TitleRecords,
    output: &Path,
) -> Result<usize> {
    let reader = BufReader::new(
        File::open(source).with_context(|| format!("open {}", source.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("create {}", output.display()))?,
    );
    let mut written = 0;
    for ((title_id, _), line) in titles.iter().zip(reader.lines()) {
        let line = line.with_context(|| format!("read {}", source.display()))?;
        records::write_record(&mut writer, title_id, &vocab.encode_line(tokenizer, &line))?;
        written += 1;
    }
    writer.flush()?;
    if written < titles.len() {
        warn!(
            missing = titles.len() - written,
            "titles without a source line were left out of the image file"
        );
    }
    info!(path = %output.display(), records = written, "wrote image file");
    Ok(written)
}
