//! Single-oracle label generation: rank each source line's sentences against
//! its aligned title and label the best `k`.

pub mod prepare;
pub mod sink;

use std::io::BufRead;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::DEFAULT_TOP_K,
    corpus::TitleRecords,
    nlp::{similarity, RankPolicy, SentenceEmbedder, Tokenizer},
};

pub use prepare::{prepare, PrepareJob};
pub use sink::{OracleSink, COMPLETION_MARKER};

/// Knobs of a single oracle run.
#[derive(Debug, Clone, Copy)]
pub struct OracleOptions {
    /// Sentences labelled positive per line.
    pub top_k: usize,
    pub policy: RankPolicy,
    /// Source lines before this index are skipped without embedding or logging.
    pub line_start: usize,
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            policy: RankPolicy::default(),
            line_start: 0,
        }
    }
}

/// Counters describing what a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleReport {
    /// Source lines read, including skipped ones.
    pub lines: usize,
    /// Label records written.
    pub records: usize,
    /// Lines before `line_start`.
    pub skipped: usize,
    /// Lines past the end of the title records.
    pub unaligned: usize,
}

/// Label one source line: embed `[target] + candidates` in a single batch and
/// rank the candidates against the target vector.
pub fn label_candidates(
    embedder: &mut dyn SentenceEmbedder,
    target: &str,
    candidates: &[String],
    options: &OracleOptions,
) -> Result<Vec<u8>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let mut batch = Vec::with_capacity(candidates.len() + 1);
    batch.push(target.to_string());
    batch.extend_from_slice(candidates);
    let vectors = embedder.embed_checked(&batch)?;
    let labels = similarity::rank(&vectors[0], &vectors[1..], options.top_k, options.policy)?;
    Ok(labels)
}

/// Walk the source corpus line by line, writing one label record per line
/// that has an aligned title.
///
/// Lines beyond the title records are logged as warnings and produce no
/// record. The sink is finished (completion marker appended) on success; on
/// error the guard is dropped, which flushes what was already written.
pub fn run_single_oracle<R: BufRead>(
    source: R,
    titles: &TitleRecords,
    tokenizer: &dyn Tokenizer,
    embedder: &mut dyn SentenceEmbedder,
    mut sink: OracleSink,
    options: &OracleOptions,
) -> Result<OracleReport> {
    let mut report = OracleReport::default();
    for (index, line) in source.lines().enumerate() {
        let line = line.context("read source corpus")?;
        report.lines += 1;
        if index < options.line_start {
            report.skipped += 1;
            continue;
        }

        let Some((title_id, target)) = titles.get(index) else {
            sink.warn(&format!(
                "line {index} is greater than target length {}",
                titles.len() as i64 - 1
            ))?;
            sink.flush()?;
            report.unaligned += 1;
            continue;
        };

        sink.info(&format!("processing line {index}"))?;
        let candidates = tokenizer.sentences(&line);
        sink.info(&format!("number of sentences: {}", candidates.len()))?;

        let labels = label_candidates(embedder, target, &candidates, options)
            .with_context(|| format!("label source line {index}"))?;
        sink.write_label(title_id, &labels)?;
        sink.flush()?;
        report.records += 1;
    }
    sink.finish()?;
    info!(
        lines = report.lines,
        records = report.records,
        skipped = report.skipped,
        unaligned = report.unaligned,
        "finished single oracle"
    );
    Ok(report)
}
