//! Vocabulary index: token <-> word ID, where the ID is the token's line number.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use tracing::info;

use crate::nlp::Tokenizer;

/// ID every out-of-vocabulary token resolves to.
pub const UNKNOWN_ID: u32 = 1;

/// Immutable token/ID mapping built once per run.
#[derive(Debug, Clone, Default)]
pub struct VocabIndex {
    ids: HashMap<String, u32>,
    tokens: Vec<String>,
}

impl VocabIndex {
    /// Build from vocabulary lines; the 0-based position is the ID.
    ///
    /// A token listed twice keeps the ID of its last occurrence.
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = HashMap::new();
        let mut tokens = Vec::new();
        for (position, line) in lines.into_iter().enumerate() {
            let token = strip_line_ending(line.into());
            ids.insert(token.clone(), position as u32);
            tokens.push(token);
        }
        Self { ids, tokens }
    }

    /// Read a UTF-8 vocabulary file with one token per line.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open vocab {}", path.display()))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("read vocab {}", path.display()))?;
        let vocab = Self::build(lines);
        info!(
            path = %path.display(),
            size = vocab.distinct(),
            "built vocabulary index"
        );
        Ok(vocab)
    }

    /// ID of `token`, or [`UNKNOWN_ID`] when absent.
    pub fn lookup(&self, token: &str) -> u32 {
        self.ids.get(token).copied().unwrap_or(UNKNOWN_ID)
    }

    /// Token stored on line `id` of the vocabulary file.
    pub fn token(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// Map a token sequence to IDs.
    pub fn encode<S: AsRef<str>>(&self, words: &[S]) -> Vec<u32> {
        words.iter().map(|w| self.lookup(w.as_ref())).collect()
    }

    /// Word-tokenize `text` and render its IDs joined by single spaces.
    pub fn encode_line(&self, tokenizer: &dyn Tokenizer, text: &str) -> String {
        let ids = self.encode(&tokenizer.words(text));
        join_ids(&ids)
    }

    /// Number of vocabulary lines (the ID range).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of distinct tokens.
    pub fn distinct(&self) -> usize {
        self.ids.len()
    }
}

pub(crate) fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
